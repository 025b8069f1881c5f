//! Bugsmith LLM - generative-text backend client.
//!
//! Single-prompt chat completions with explicit model, temperature, and
//! timeout. A timeout is a distinct, user-reportable failure; it is never
//! silently retried because the platform boundary already has its own tight
//! response-time budget.

pub mod client;
pub mod error;
pub mod models;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT, LlmClient, LlmConfig,
};
pub use error::{LlmError, LlmResult};
