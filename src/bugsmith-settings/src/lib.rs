//! Bugsmith settings - multi-tenant configuration resolution.
//!
//! A hierarchical settings store keyed by organization and, optionally, by a
//! named project bound to a channel. Provides:
//!
//! - validated identifier types that make store-path injection unrepresentable
//! - a resolver that merges stored project settings over hard-coded defaults
//!   and self-heals schema drift exactly once per call
//! - a binder for the channel -> project mapping (welcome flag preserved
//!   across rebindings)
//! - a field mutator that routes writes to the bound project or the implicit
//!   `default` project
//!
//! Failure policy is deliberately asymmetric: resolution fails loud to the
//! caller, a poisoned channel binding fails safe (the risky write is skipped,
//! logged, nothing raised), and auxiliary writes (welcome flag, invocation
//! counter) fail silent.

pub mod error;
pub mod ids;
pub mod service;
pub mod settings;

pub use error::{InvalidIdentifier, SettingsError, SettingsResult};
pub use ids::{ChannelId, DEFAULT_PROJECT, ProjectName, TeamId};
pub use service::SettingsService;
pub use settings::{DEFAULT_BUG_REPORT_TEMPLATE, ProjectField, ProjectSettings};
