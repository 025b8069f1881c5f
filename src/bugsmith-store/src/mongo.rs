//! MongoDB backend.

use std::time::Duration;

use async_trait::async_trait;
use bson::doc;
use mongodb::options::{ClientOptions, IndexOptions, UpdateOptions};
use mongodb::{Client, Collection, IndexModel};
use tracing::info;

use crate::documents::{
    ChannelBinding, FieldValue, OrgDocument, ProjectSettingsDoc, RateLimitDocument, RequestStamp,
    ORGANIZATIONS_COLLECTION, RATE_LIMITS_COLLECTION,
};
use crate::error::StoreResult;
use crate::{OrgStore, RateLimitStore};

/// How long to wait for a reachable server before giving up.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// MongoDB-backed store.
#[derive(Debug, Clone)]
pub struct MongoStore {
    orgs: Collection<OrgDocument>,
    rate_limits: Collection<RateLimitDocument>,
}

impl MongoStore {
    /// Connect, ping, and prepare indexes. Fails fast if the server is
    /// unreachable so the process does not start half-alive.
    pub async fn connect(url: &str, database: &str) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(url).await?;
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = Client::with_options(options)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await?;

        let db = client.database(database);
        let store = Self {
            orgs: db.collection(ORGANIZATIONS_COLLECTION),
            rate_limits: db.collection(RATE_LIMITS_COLLECTION),
        };
        store.ensure_indexes().await?;

        info!(database, "connected to MongoDB");
        Ok(store)
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique = IndexOptions::builder().unique(true).build();

        self.orgs
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "team_id": 1 })
                    .options(unique.clone())
                    .build(),
                None,
            )
            .await?;

        self.rate_limits
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "rate_limit_key": 1 })
                    .options(unique)
                    .build(),
                None,
            )
            .await?;

        Ok(())
    }

    fn upsert() -> UpdateOptions {
        UpdateOptions::builder().upsert(true).build()
    }
}

#[async_trait]
impl OrgStore for MongoStore {
    async fn find_org(&self, team_id: &str) -> StoreResult<Option<OrgDocument>> {
        Ok(self.orgs.find_one(doc! { "team_id": team_id }, None).await?)
    }

    async fn ensure_org(&self, team_id: &str, joined_date: &str) -> StoreResult<()> {
        self.orgs
            .update_one(
                doc! { "team_id": team_id },
                doc! {
                    "$setOnInsert": {
                        "team_id": team_id,
                        "channel_projects": {},
                        "joined_date": joined_date,
                    }
                },
                Self::upsert(),
            )
            .await?;
        Ok(())
    }

    async fn heal_org(
        &self,
        team_id: &str,
        set_channel_projects: bool,
        joined_date: Option<&str>,
    ) -> StoreResult<()> {
        let mut set = bson::Document::new();
        if set_channel_projects {
            set.insert("channel_projects", bson::Document::new());
        }
        if let Some(date) = joined_date {
            set.insert("joined_date", date);
        }
        if set.is_empty() {
            return Ok(());
        }

        self.orgs
            .update_one(doc! { "team_id": team_id }, doc! { "$set": set }, None)
            .await?;
        Ok(())
    }

    async fn set_channel_binding(
        &self,
        team_id: &str,
        channel_id: &str,
        binding: &ChannelBinding,
    ) -> StoreResult<()> {
        let path = format!("channel_projects.{channel_id}");
        self.orgs
            .update_one(
                doc! { "team_id": team_id },
                doc! { "$set": { path: bson::to_bson(binding)? } },
                Self::upsert(),
            )
            .await?;
        Ok(())
    }

    async fn set_welcome_shown(
        &self,
        team_id: &str,
        channel_id: &str,
        value: bool,
    ) -> StoreResult<()> {
        let path = format!("channel_projects.{channel_id}.welcome_shown");
        self.orgs
            .update_one(
                doc! { "team_id": team_id },
                doc! { "$set": { path: value } },
                Self::upsert(),
            )
            .await?;
        Ok(())
    }

    async fn set_project_settings(
        &self,
        team_id: &str,
        project: &str,
        settings: &ProjectSettingsDoc,
    ) -> StoreResult<()> {
        let path = format!("projects.{project}");
        self.orgs
            .update_one(
                doc! { "team_id": team_id },
                doc! { "$set": { path: bson::to_bson(settings)? } },
                Self::upsert(),
            )
            .await?;
        Ok(())
    }

    async fn set_project_field(
        &self,
        team_id: &str,
        project: &str,
        field: &str,
        value: FieldValue,
    ) -> StoreResult<()> {
        let path = format!("projects.{project}.{field}");
        self.orgs
            .update_one(
                doc! { "team_id": team_id },
                doc! { "$set": { path: bson::to_bson(&value)? } },
                Self::upsert(),
            )
            .await?;
        Ok(())
    }

    async fn increment_invocations(&self, team_id: &str) -> StoreResult<()> {
        self.orgs
            .update_one(
                doc! { "team_id": team_id },
                doc! { "$inc": { "bot_invocations_total": 1 } },
                Self::upsert(),
            )
            .await?;
        Ok(())
    }
}

#[async_trait]
impl RateLimitStore for MongoStore {
    async fn find_limit(&self, key: &str) -> StoreResult<Option<RateLimitDocument>> {
        Ok(self
            .rate_limits
            .find_one(doc! { "rate_limit_key": key }, None)
            .await?)
    }

    async fn insert_limit(&self, limit: &RateLimitDocument) -> StoreResult<()> {
        self.rate_limits.insert_one(limit, None).await?;
        Ok(())
    }

    async fn set_limit_requests(
        &self,
        key: &str,
        requests: &[RequestStamp],
        updated_at: bson::DateTime,
    ) -> StoreResult<()> {
        self.rate_limits
            .update_one(
                doc! { "rate_limit_key": key },
                doc! {
                    "$set": {
                        "requests": bson::to_bson(requests)?,
                        "updated_at": updated_at,
                    }
                },
                None,
            )
            .await?;
        Ok(())
    }
}
