//! Translation of storage failures into user-facing messages.
//!
//! Nothing below the command boundary is shown to users directly; errors are
//! logged with full context here and collapsed into one of a small set of
//! generic messages by category.

use bugsmith_settings::SettingsError;
use bugsmith_store::StoreError;
use tracing::error;

/// Map a settings/storage failure to a reply, logging the real cause.
pub fn storage_error_message(err: &SettingsError, operation: &str) -> String {
    error!(%err, operation, "storage failure at command boundary");

    match err {
        SettingsError::InvalidIdentifier(detail) => detail.to_string(),
        SettingsError::Store(StoreError::Connection(_)) => {
            "I'm having trouble reaching the settings database right now. \
             Please try again in a moment."
                .to_string()
        }
        SettingsError::Store(StoreError::Operation(_)) => {
            "Something went wrong while accessing your settings. Please try again.".to_string()
        }
        SettingsError::Store(StoreError::Serialization(_)) => {
            "Your settings could not be read. Please try again, and contact support \
             if this keeps happening."
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_differ_by_category() {
        let connection = storage_error_message(
            &SettingsError::Store(StoreError::Connection("refused".to_string())),
            "test",
        );
        let operation = storage_error_message(
            &SettingsError::Store(StoreError::Operation("failed".to_string())),
            "test",
        );
        assert_ne!(connection, operation);
        // Internal detail never leaks into the reply.
        assert!(!connection.contains("refused"));
        assert!(!operation.contains("failed"));
    }
}
