//! Settings resolution and mutation.
//!
//! All cross-request coordination happens through the store; this service
//! holds no mutable state of its own and is cheap to clone.

use std::collections::HashMap;
use std::sync::Arc;

use bugsmith_store::{ChannelBinding, OrgDocument, OrgStore, format_joined_date};
use chrono::Utc;
use tracing::{debug, warn};

use crate::error::SettingsResult;
use crate::ids::{ChannelId, ProjectName, TeamId};
use crate::settings::{ProjectField, ProjectSettings};

/// Shown when a project-scoped command runs in a channel with no binding.
const PROJECT_REQUIRED_MESSAGE: &str = "❌ No project is set for this channel.\n\
Please set a project first using: `use project <project-name>`\n\
Example: `use project Mobile app`";

/// Resolves effective configuration per (tenant, channel) and routes field
/// writes to the right project scope.
#[derive(Clone)]
pub struct SettingsService {
    store: Arc<dyn OrgStore>,
}

impl SettingsService {
    pub fn new(store: Arc<dyn OrgStore>) -> Self {
        Self { store }
    }

    /// Effective settings for a channel's bound project.
    ///
    /// Lazily creates the organization document, repairs schema drift
    /// (missing `channel_projects`, native-typed `joined_date`) with targeted
    /// writes, and self-heals incomplete project records with at most one
    /// corrective write per call.
    ///
    /// With no channel (direct-message context) or an unbound channel this
    /// returns the defaults record and performs no project-scope writes; a
    /// mutation in those contexts goes to the implicit `default` project via
    /// [`Self::update_field`] instead.
    pub async fn resolve_settings(
        &self,
        team: &TeamId,
        channel: Option<&ChannelId>,
    ) -> SettingsResult<ProjectSettings> {
        let joined_now = format_joined_date(Utc::now());
        self.store.ensure_org(team.as_str(), &joined_now).await?;

        let Some(mut org) = self.store.find_org(team.as_str()).await? else {
            // Unreachable after the upsert above, but degrade rather than fail.
            warn!(team = %team, "organization missing after ensure; returning defaults");
            return Ok(ProjectSettings::default());
        };

        self.heal_org_shape(team, &mut org, &joined_now).await?;

        let Some(channel) = channel else {
            return Ok(ProjectSettings::default());
        };

        let binding = org.channel_binding(channel.as_str());
        let Some(raw_name) = binding.and_then(|b| b.project) else {
            // Reading a binding that does not exist yet: nothing to persist.
            return Ok(ProjectSettings::default());
        };

        let project = match ProjectName::parse(&raw_name) {
            Ok(name) => name,
            Err(err) => {
                // A poisoned binding must not fail every read in the channel.
                warn!(team = %team, channel = %channel, %err,
                    "channel bound to invalid project name; falling back to defaults");
                return Ok(ProjectSettings::default());
            }
        };

        let stored = org.project(project.as_str()).cloned().unwrap_or_default();
        let merged = ProjectSettings::from_doc(&stored);

        if !stored.is_complete() {
            debug!(team = %team, project = %project, "persisting merged project settings");
            self.store
                .set_project_settings(team.as_str(), project.as_str(), &merged.to_doc())
                .await?;
        }

        Ok(merged)
    }

    /// Repair missing `channel_projects` and legacy `joined_date` in place,
    /// touching only the drifted fields. `joined_date`, once text, is never
    /// rewritten.
    async fn heal_org_shape(
        &self,
        team: &TeamId,
        org: &mut OrgDocument,
        joined_now: &str,
    ) -> SettingsResult<()> {
        let missing_bindings = org.channel_projects.is_none();
        let migrated_date = match &org.joined_date {
            None => Some(joined_now.to_string()),
            Some(date) if date.as_text().is_none() => Some(date.to_rfc3339()),
            Some(_) => None,
        };

        if missing_bindings || migrated_date.is_some() {
            self.store
                .heal_org(team.as_str(), missing_bindings, migrated_date.as_deref())
                .await?;
            if missing_bindings {
                org.channel_projects = Some(HashMap::new());
            }
            if let Some(date) = migrated_date {
                org.joined_date = Some(bugsmith_store::JoinedDate::Text(date));
            }
        }

        Ok(())
    }

    /// Bind a channel to a named project, preserving a previously set welcome
    /// flag, then force-create the project's settings record.
    pub async fn bind_channel_project(
        &self,
        team: &TeamId,
        channel: &ChannelId,
        project: &ProjectName,
    ) -> SettingsResult<()> {
        let existing = self
            .store
            .find_org(team.as_str())
            .await?
            .and_then(|org| org.channel_binding(channel.as_str()));

        let binding = ChannelBinding {
            project: Some(project.as_str().to_string()),
            welcome_shown: existing.and_then(|b| b.welcome_shown),
        };
        self.store
            .set_channel_binding(team.as_str(), channel.as_str(), &binding)
            .await?;

        // Applies defaults to the project record if it is new or partial.
        self.resolve_settings(team, Some(channel)).await?;
        Ok(())
    }

    /// All known project names for a tenant, sorted.
    pub async fn list_projects(&self, team: &TeamId) -> SettingsResult<Vec<String>> {
        let org = self.store.find_org(team.as_str()).await?;
        let mut names: Vec<String> = org
            .and_then(|org| org.projects)
            .map(|projects| projects.into_keys().collect())
            .unwrap_or_default();
        names.sort();
        Ok(names)
    }

    /// The raw project name bound to a channel, or `None` if unbound.
    ///
    /// Fails soft: a storage error degrades to `None` so callers can still
    /// answer, at the cost of treating the channel as unbound.
    pub async fn channel_project_name(&self, team: &TeamId, channel: &ChannelId) -> Option<String> {
        match self.store.find_org(team.as_str()).await {
            Ok(org) => org
                .and_then(|org| org.channel_binding(channel.as_str()))
                .and_then(|binding| binding.project),
            Err(err) => {
                warn!(team = %team, channel = %channel, %err,
                    "failed to read channel binding; treating as unbound");
                None
            }
        }
    }

    /// Gate for project-scoped commands: `Some(message)` when the channel is
    /// present but unbound. No channel context (direct messages) permits the
    /// operation.
    pub async fn require_project_bound(
        &self,
        team: &TeamId,
        channel: Option<&ChannelId>,
    ) -> Option<String> {
        let channel = channel?;
        if self.channel_project_name(team, channel).await.is_none() {
            return Some(PROJECT_REQUIRED_MESSAGE.to_string());
        }
        None
    }

    /// Whether the onboarding hint was already shown in a channel. Fails soft
    /// to `false`.
    pub async fn welcome_shown(&self, team: &TeamId, channel: &ChannelId) -> bool {
        match self.store.find_org(team.as_str()).await {
            Ok(org) => org
                .and_then(|org| org.channel_binding(channel.as_str()))
                .and_then(|binding| binding.welcome_shown)
                .unwrap_or(false),
            Err(err) => {
                warn!(team = %team, channel = %channel, %err, "failed to read welcome flag");
                false
            }
        }
    }

    /// Record that the onboarding hint was shown. Fails silent; this is
    /// auxiliary to the reply being sent.
    pub async fn set_welcome_shown(&self, team: &TeamId, channel: &ChannelId, value: bool) {
        if let Err(err) = self
            .store
            .set_welcome_shown(team.as_str(), channel.as_str(), value)
            .await
        {
            warn!(team = %team, channel = %channel, %err, "failed to persist welcome flag");
        }
    }

    /// Write one settings field to the scope implied by the channel binding.
    ///
    /// Bound channel: the write goes to the bound project. A bound name that
    /// no longer passes validation is skipped entirely (logged) instead of
    /// being routed anywhere else. No channel or no binding: the write goes
    /// to the implicit `default` project, creating it if needed.
    pub async fn update_field(
        &self,
        team: &TeamId,
        channel: Option<&ChannelId>,
        field: ProjectField,
    ) -> SettingsResult<()> {
        if let Some(channel) = channel {
            let bound = self
                .store
                .find_org(team.as_str())
                .await?
                .and_then(|org| org.channel_binding(channel.as_str()))
                .and_then(|binding| binding.project);

            if let Some(raw_name) = bound {
                match ProjectName::parse(&raw_name) {
                    Ok(project) => {
                        self.store
                            .set_project_field(
                                team.as_str(),
                                project.as_str(),
                                field.name(),
                                field.into_value(),
                            )
                            .await?;
                    }
                    Err(err) => {
                        warn!(team = %team, channel = %channel, %err,
                            "channel bound to invalid project name; skipping field write");
                    }
                }
                return Ok(());
            }
        }

        self.store
            .set_project_field(
                team.as_str(),
                ProjectName::default_project().as_str(),
                field.name(),
                field.into_value(),
            )
            .await?;
        Ok(())
    }

    /// Bump the tenant's invocation counter. Fails silent.
    pub async fn record_invocation(&self, team: &TeamId) {
        if let Err(err) = self.store.increment_invocations(team.as_str()).await {
            warn!(team = %team, %err, "failed to record invocation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugsmith_store::{
        ChannelBindingShape, JoinedDate, MemoryStore, OrgDocument, ProjectSettingsDoc,
    };
    use std::collections::HashMap;

    fn service(store: &Arc<MemoryStore>) -> SettingsService {
        SettingsService::new(store.clone() as Arc<dyn OrgStore>)
    }

    fn team() -> TeamId {
        TeamId::parse("T1").unwrap()
    }

    fn channel() -> ChannelId {
        ChannelId::parse("C1").unwrap()
    }

    #[tokio::test]
    async fn test_resolve_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let (team, channel) = (team(), channel());

        svc.bind_channel_project(&team, &channel, &ProjectName::parse("web").unwrap())
            .await
            .unwrap();

        let first = svc.resolve_settings(&team, Some(&channel)).await.unwrap();
        let second = svc.resolve_settings(&team, Some(&channel)).await.unwrap();
        assert_eq!(first, second);
        // The heal wrote a complete record, so a second read needs no write.
        let stored = store.org_snapshot("T1").await.unwrap();
        assert!(stored.project("web").unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_unbound_channel_returns_defaults_without_writes() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        let settings = svc.resolve_settings(&team(), Some(&channel())).await.unwrap();
        assert_eq!(settings, ProjectSettings::default());

        let org = store.org_snapshot("T1").await.unwrap();
        assert!(org.projects.is_none());
    }

    #[tokio::test]
    async fn test_no_channel_returns_defaults() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        let settings = svc.resolve_settings(&team(), None).await.unwrap();
        assert_eq!(settings, ProjectSettings::default());
    }

    #[tokio::test]
    async fn test_legacy_string_binding_resolves() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed_org(OrgDocument {
                team_id: "T1".to_string(),
                joined_date: Some(JoinedDate::Text("2024-05-01T00:00:00Z".to_string())),
                channel_projects: Some(HashMap::from([(
                    "C1".to_string(),
                    ChannelBindingShape::Legacy("web".to_string()),
                )])),
                projects: Some(HashMap::from([(
                    "web".to_string(),
                    ProjectSettingsDoc {
                        project_context: Some("legacy docs".to_string()),
                        ..ProjectSettingsDoc::default()
                    },
                )])),
                bot_invocations_total: None,
            })
            .await;
        let svc = service(&store);

        let settings = svc.resolve_settings(&team(), Some(&channel())).await.unwrap();
        assert_eq!(settings.project_context, "legacy docs");
        // Missing keys were filled and healed back to the store.
        let org = store.org_snapshot("T1").await.unwrap();
        assert!(org.project("web").unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_native_joined_date_migrates_once() {
        let native = bson::DateTime::from_chrono(
            chrono::DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc),
        );
        let store = Arc::new(MemoryStore::new());
        store
            .seed_org(OrgDocument {
                team_id: "T1".to_string(),
                joined_date: Some(JoinedDate::Native(native)),
                channel_projects: Some(HashMap::new()),
                projects: None,
                bot_invocations_total: None,
            })
            .await;
        let svc = service(&store);

        svc.resolve_settings(&team(), None).await.unwrap();
        let org = store.org_snapshot("T1").await.unwrap();
        let migrated = org.joined_date.unwrap();
        let text = migrated.as_text().expect("joined_date should be text now");
        assert!(text.starts_with("2024-05-01T12:00:00"));

        // A second resolve does not rewrite it.
        svc.resolve_settings(&team(), None).await.unwrap();
        let again = store.org_snapshot("T1").await.unwrap().joined_date.unwrap();
        assert_eq!(again.as_text(), Some(text));
    }

    #[tokio::test]
    async fn test_rebinding_preserves_welcome_flag() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let (team, channel) = (team(), channel());

        svc.bind_channel_project(&team, &channel, &ProjectName::parse("A").unwrap())
            .await
            .unwrap();
        svc.set_welcome_shown(&team, &channel, true).await;
        svc.bind_channel_project(&team, &channel, &ProjectName::parse("B").unwrap())
            .await
            .unwrap();

        assert!(svc.welcome_shown(&team, &channel).await);
        assert_eq!(
            svc.channel_project_name(&team, &channel).await.as_deref(),
            Some("B")
        );
    }

    #[tokio::test]
    async fn test_update_field_routes_to_bound_project() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let (team, channel) = (team(), channel());

        svc.bind_channel_project(&team, &channel, &ProjectName::parse("web").unwrap())
            .await
            .unwrap();
        svc.update_field(
            &team,
            Some(&channel),
            ProjectField::ProjectContext("docs".to_string()),
        )
        .await
        .unwrap();

        let org = store.org_snapshot("T1").await.unwrap();
        assert_eq!(
            org.project("web").unwrap().project_context.as_deref(),
            Some("docs")
        );
        assert!(org.project("default").is_none());
    }

    #[tokio::test]
    async fn test_update_field_without_binding_uses_default_project() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);

        svc.update_field(&team(), None, ProjectField::UseProjectContext(true))
            .await
            .unwrap();

        let org = store.org_snapshot("T1").await.unwrap();
        assert_eq!(
            org.project("default").unwrap().use_project_context,
            Some(true)
        );
    }

    #[tokio::test]
    async fn test_update_field_skips_invalid_bound_name() {
        let store = Arc::new(MemoryStore::new());
        store
            .seed_org(OrgDocument {
                team_id: "T1".to_string(),
                joined_date: Some(JoinedDate::Text("2024-05-01T00:00:00Z".to_string())),
                channel_projects: Some(HashMap::from([(
                    "C1".to_string(),
                    ChannelBindingShape::Legacy("evil.name".to_string()),
                )])),
                projects: None,
                bot_invocations_total: None,
            })
            .await;
        let svc = service(&store);

        svc.update_field(
            &team(),
            Some(&channel()),
            ProjectField::ProjectContext("x".to_string()),
        )
        .await
        .unwrap();

        // The write was skipped: nothing landed anywhere.
        let org = store.org_snapshot("T1").await.unwrap();
        assert!(org.projects.is_none());
    }

    #[tokio::test]
    async fn test_require_project_bound() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let (team, channel) = (team(), channel());

        // No channel context permits the operation.
        assert!(svc.require_project_bound(&team, None).await.is_none());

        let message = svc
            .require_project_bound(&team, Some(&channel))
            .await
            .expect("unbound channel should be gated");
        assert!(message.contains("use project"));

        svc.bind_channel_project(&team, &channel, &ProjectName::parse("web").unwrap())
            .await
            .unwrap();
        assert!(svc.require_project_bound(&team, Some(&channel)).await.is_none());
    }

    #[tokio::test]
    async fn test_list_projects_sorted() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(&store);
        let team = team();

        assert!(svc.list_projects(&team).await.unwrap().is_empty());

        for (channel, name) in [("C1", "zeta"), ("C2", "alpha")] {
            svc.bind_channel_project(
                &team,
                &ChannelId::parse(channel).unwrap(),
                &ProjectName::parse(name).unwrap(),
            )
            .await
            .unwrap();
        }

        assert_eq!(svc.list_projects(&team).await.unwrap(), ["alpha", "zeta"]);
    }
}
