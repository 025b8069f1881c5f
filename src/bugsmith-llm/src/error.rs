//! Error types for the generative backend client.

use thiserror::Error;

/// Errors from completion requests. Timeouts are their own variant because
/// they get a distinct user-facing message.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The request exceeded the configured timeout.
    #[error("AI request timed out")]
    Timeout,

    /// Non-success response from the backend.
    #[error("AI API error: {0}")]
    Api(String),

    /// Connection-level failure.
    #[error("network error talking to the AI backend: {0}")]
    Network(String),

    /// The response body did not have the expected shape.
    #[error("unexpected AI response: {0}")]
    InvalidResponse(String),

    /// The backend returned no usable text.
    #[error("AI returned empty content")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_connect() {
            LlmError::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

/// Result type for completion operations.
pub type LlmResult<T> = std::result::Result<T, LlmError>;
