//! Error types for the issue tracker client.
//!
//! The HTTP statuses that matter to users (401, 403, 400) get their own
//! variants so the command layer can map each to distinct guidance text.

use thiserror::Error;

/// Errors from Jira operations.
#[derive(Debug, Error)]
pub enum JiraError {
    /// 401 - credentials rejected.
    #[error("Jira authentication failed")]
    Unauthorized,

    /// 403 - authenticated but not permitted.
    #[error("Jira access forbidden")]
    Forbidden,

    /// 400 - the request (usually the JQL) was rejected.
    #[error("Jira rejected the request: {0}")]
    BadRequest(String),

    /// Any other non-success response.
    #[error("Jira API error: {0}")]
    Api(String),

    /// The request exceeded the configured timeout.
    #[error("Jira request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("network error talking to Jira: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("unexpected Jira response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for JiraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JiraError::Timeout
        } else if err.is_connect() {
            JiraError::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            JiraError::InvalidResponse(err.to_string())
        } else {
            JiraError::Network(err.to_string())
        }
    }
}

/// Result type for Jira operations.
pub type JiraResult<T> = std::result::Result<T, JiraError>;
