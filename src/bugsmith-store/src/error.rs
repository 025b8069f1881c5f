//! Error types for the store adapter.

use thiserror::Error;

/// Errors surfaced by store backends.
///
/// Backends collapse their native error types into three categories so the
/// command layer can pick a user-facing message without knowing which backend
/// is in use.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached (connectivity, server selection, I/O).
    #[error("store connection error: {0}")]
    Connection(String),

    /// The store was reached but the operation failed.
    #[error("store operation failed: {0}")]
    Operation(String),

    /// A document could not be converted to or from its stored form.
    #[error("document serialization error: {0}")]
    Serialization(String),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match *err.kind {
            ErrorKind::ServerSelection { .. } | ErrorKind::Io(_) => {
                StoreError::Connection(err.to_string())
            }
            ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
                StoreError::Serialization(err.to_string())
            }
            _ => StoreError::Operation(err.to_string()),
        }
    }
}

impl From<bson::ser::Error> for StoreError {
    fn from(err: bson::ser::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<bson::de::Error> for StoreError {
    fn from(err: bson::de::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}
