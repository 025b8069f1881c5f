//! Slack integration for Bugsmith.
//!
//! This crate provides the platform-facing pieces:
//! - Events API payload types and parsing
//! - Request signature verification
//! - A minimal Web API client for posting replies
//! - Text cleanup helpers (mention stripping, link unwrapping)
//!
//! Command routing and handlers live in `bugsmith-commands`; the HTTP
//! endpoint wiring lives in `bugsmith-server`.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod signature;
pub mod text;

pub use client::SlackClient;
pub use config::SlackConfig;
pub use error::{SlackError, SlackResult};
pub use events::{AppMentionEvent, EventEnvelope, MessageEvent, SlackEvent, parse_event};
pub use signature::verify_signature;
