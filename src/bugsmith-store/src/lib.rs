//! Bugsmith store - document-store adapter.
//!
//! One collection of organization documents and one of rate-limit documents,
//! behind small async traits so the settings engine and the rate limiter can
//! run against MongoDB in production and an in-memory backend in tests.
//!
//! All mutation is expressed as field-scoped upserts, never whole-document
//! replacement, so concurrent writers touching different fields commute.
//!
//! # Identifier contract
//!
//! Trait methods take already-validated identifiers; the MongoDB backend
//! interpolates `team_id`, `channel_id`, and project names into dotted field
//! paths verbatim. Validation lives in `bugsmith-settings` (typed ids), which
//! is the only caller that constructs these values.

use async_trait::async_trait;

pub mod documents;
pub mod error;
pub mod memory;
pub mod mongo;

pub use documents::{
    ChannelBinding, ChannelBindingShape, FieldValue, JoinedDate, OrgDocument, ProjectSettingsDoc,
    RateLimitDocument, RequestStamp, fields, format_joined_date,
};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Organization document operations.
#[async_trait]
pub trait OrgStore: Send + Sync {
    /// Fetch an organization by tenant id.
    async fn find_org(&self, team_id: &str) -> StoreResult<Option<OrgDocument>>;

    /// Create the organization if it does not exist. Insert-only-if-absent:
    /// concurrent first contacts converge to one document and an existing
    /// `joined_date` is never overwritten.
    async fn ensure_org(&self, team_id: &str, joined_date: &str) -> StoreResult<()>;

    /// Targeted repair of a fetched document: add a missing
    /// `channel_projects` map and/or rewrite `joined_date` as text. Only the
    /// named fields are touched.
    async fn heal_org(
        &self,
        team_id: &str,
        set_channel_projects: bool,
        joined_date: Option<&str>,
    ) -> StoreResult<()>;

    /// Upsert the binding record for one channel.
    async fn set_channel_binding(
        &self,
        team_id: &str,
        channel_id: &str,
        binding: &ChannelBinding,
    ) -> StoreResult<()>;

    /// Upsert the welcome flag for one channel, leaving the rest of the
    /// binding untouched.
    async fn set_welcome_shown(
        &self,
        team_id: &str,
        channel_id: &str,
        value: bool,
    ) -> StoreResult<()>;

    /// Upsert the full settings record of one project.
    async fn set_project_settings(
        &self,
        team_id: &str,
        project: &str,
        settings: &ProjectSettingsDoc,
    ) -> StoreResult<()>;

    /// Upsert a single field of one project.
    async fn set_project_field(
        &self,
        team_id: &str,
        project: &str,
        field: &str,
        value: FieldValue,
    ) -> StoreResult<()>;

    /// Atomically bump the per-organization invocation counter.
    async fn increment_invocations(&self, team_id: &str) -> StoreResult<()>;
}

/// Rate-limit document operations.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Fetch a limiter document by its composite key.
    async fn find_limit(&self, key: &str) -> StoreResult<Option<RateLimitDocument>>;

    /// Insert the first document for a key. Fails if the key already exists
    /// (unique index); callers treat that race as a store error and fail open.
    async fn insert_limit(&self, doc: &RateLimitDocument) -> StoreResult<()>;

    /// Persist the pruned-and-appended request list for a key.
    async fn set_limit_requests(
        &self,
        key: &str,
        requests: &[RequestStamp],
        updated_at: bson::DateTime,
    ) -> StoreResult<()>;
}
