//! Bugsmith Jira - issue tracker client.
//!
//! Thin wrapper over the Jira REST API covering what the bot needs: a
//! credential check (`current_user`) and a capped JQL search. Auth failures,
//! permission failures, and bad queries surface as distinct error variants so
//! each can get its own user-facing guidance.

pub mod client;
pub mod error;
pub mod models;

pub use client::JiraClient;
pub use error::{JiraError, JiraResult};
pub use models::Issue;
