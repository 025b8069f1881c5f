//! In-memory backend.
//!
//! Mirrors the observable semantics of the MongoDB backend on plain maps.
//! Used by unit and integration tests throughout the workspace.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::documents::{
    ChannelBinding, ChannelBindingShape, FieldValue, JoinedDate, OrgDocument, ProjectSettingsDoc,
    RateLimitDocument, RequestStamp,
};
use crate::error::{StoreError, StoreResult};
use crate::{OrgStore, RateLimitStore};

/// Map-backed store with the same upsert semantics as [`crate::MongoStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    orgs: RwLock<HashMap<String, OrgDocument>>,
    rate_limits: RwLock<HashMap<String, RateLimitDocument>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct snapshot of an organization document, for test assertions.
    pub async fn org_snapshot(&self, team_id: &str) -> Option<OrgDocument> {
        self.orgs.read().await.get(team_id).cloned()
    }

    /// Seed a raw organization document, bypassing the trait surface. Lets
    /// tests set up legacy shapes the write path no longer produces.
    pub async fn seed_org(&self, org: OrgDocument) {
        self.orgs.write().await.insert(org.team_id.clone(), org);
    }

    fn org_entry<'a>(
        orgs: &'a mut HashMap<String, OrgDocument>,
        team_id: &str,
    ) -> &'a mut OrgDocument {
        orgs.entry(team_id.to_string()).or_insert_with(|| OrgDocument {
            team_id: team_id.to_string(),
            ..OrgDocument::default()
        })
    }
}

#[async_trait]
impl OrgStore for MemoryStore {
    async fn find_org(&self, team_id: &str) -> StoreResult<Option<OrgDocument>> {
        Ok(self.orgs.read().await.get(team_id).cloned())
    }

    async fn ensure_org(&self, team_id: &str, joined_date: &str) -> StoreResult<()> {
        let mut orgs = self.orgs.write().await;
        orgs.entry(team_id.to_string()).or_insert_with(|| OrgDocument {
            team_id: team_id.to_string(),
            joined_date: Some(JoinedDate::Text(joined_date.to_string())),
            channel_projects: Some(HashMap::new()),
            ..OrgDocument::default()
        });
        Ok(())
    }

    async fn heal_org(
        &self,
        team_id: &str,
        set_channel_projects: bool,
        joined_date: Option<&str>,
    ) -> StoreResult<()> {
        let mut orgs = self.orgs.write().await;
        if let Some(org) = orgs.get_mut(team_id) {
            if set_channel_projects {
                org.channel_projects = Some(HashMap::new());
            }
            if let Some(date) = joined_date {
                org.joined_date = Some(JoinedDate::Text(date.to_string()));
            }
        }
        Ok(())
    }

    async fn set_channel_binding(
        &self,
        team_id: &str,
        channel_id: &str,
        binding: &ChannelBinding,
    ) -> StoreResult<()> {
        let mut orgs = self.orgs.write().await;
        let org = Self::org_entry(&mut orgs, team_id);
        org.channel_projects
            .get_or_insert_with(HashMap::new)
            .insert(
                channel_id.to_string(),
                ChannelBindingShape::Record(binding.clone()),
            );
        Ok(())
    }

    async fn set_welcome_shown(
        &self,
        team_id: &str,
        channel_id: &str,
        value: bool,
    ) -> StoreResult<()> {
        let mut orgs = self.orgs.write().await;
        let org = Self::org_entry(&mut orgs, team_id);
        let bindings = org.channel_projects.get_or_insert_with(HashMap::new);
        let mut binding = bindings
            .get(channel_id)
            .map(ChannelBindingShape::canonical)
            .unwrap_or_default();
        binding.welcome_shown = Some(value);
        bindings.insert(channel_id.to_string(), ChannelBindingShape::Record(binding));
        Ok(())
    }

    async fn set_project_settings(
        &self,
        team_id: &str,
        project: &str,
        settings: &ProjectSettingsDoc,
    ) -> StoreResult<()> {
        let mut orgs = self.orgs.write().await;
        let org = Self::org_entry(&mut orgs, team_id);
        org.projects
            .get_or_insert_with(HashMap::new)
            .insert(project.to_string(), settings.clone());
        Ok(())
    }

    async fn set_project_field(
        &self,
        team_id: &str,
        project: &str,
        field: &str,
        value: FieldValue,
    ) -> StoreResult<()> {
        let mut orgs = self.orgs.write().await;
        let org = Self::org_entry(&mut orgs, team_id);
        org.projects
            .get_or_insert_with(HashMap::new)
            .entry(project.to_string())
            .or_default()
            .apply(field, &value);
        Ok(())
    }

    async fn increment_invocations(&self, team_id: &str) -> StoreResult<()> {
        let mut orgs = self.orgs.write().await;
        let org = Self::org_entry(&mut orgs, team_id);
        org.bot_invocations_total = Some(org.bot_invocations_total.unwrap_or(0) + 1);
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn find_limit(&self, key: &str) -> StoreResult<Option<RateLimitDocument>> {
        Ok(self.rate_limits.read().await.get(key).cloned())
    }

    async fn insert_limit(&self, limit: &RateLimitDocument) -> StoreResult<()> {
        let mut limits = self.rate_limits.write().await;
        if limits.contains_key(&limit.rate_limit_key) {
            return Err(StoreError::Operation(format!(
                "duplicate rate limit key: {}",
                limit.rate_limit_key
            )));
        }
        limits.insert(limit.rate_limit_key.clone(), limit.clone());
        Ok(())
    }

    async fn set_limit_requests(
        &self,
        key: &str,
        requests: &[RequestStamp],
        updated_at: bson::DateTime,
    ) -> StoreResult<()> {
        let mut limits = self.rate_limits.write().await;
        if let Some(limit) = limits.get_mut(key) {
            limit.requests = requests.to_vec();
            limit.updated_at = updated_at;
        }
        Ok(())
    }
}
