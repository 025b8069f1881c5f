//! Error types for the settings engine.

use bugsmith_store::StoreError;
use thiserror::Error;

/// A tenant, channel, or project identifier was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid {role}: {reason}")]
pub struct InvalidIdentifier {
    /// Which identifier was being validated (e.g. "team_id").
    pub role: &'static str,
    /// Why it was rejected, suitable for showing to the user.
    pub reason: String,
}

impl InvalidIdentifier {
    pub(crate) fn new(role: &'static str, reason: impl Into<String>) -> Self {
        Self {
            role,
            reason: reason.into(),
        }
    }
}

/// Errors from settings resolution and mutation.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Validation failure; never reaches storage.
    #[error(transparent)]
    InvalidIdentifier(#[from] InvalidIdentifier),

    /// Storage-layer failure, propagated so the command boundary can pick a
    /// user-facing message by category.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for settings operations.
pub type SettingsResult<T> = std::result::Result<T, SettingsError>;
