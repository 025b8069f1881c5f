//! Bugsmith commands - dispatch and handlers.
//!
//! Maps inbound chat text to a command by case-insensitive keyword
//! containment and runs the matching handler. Handlers return user-facing
//! reply text; storage and external-service failures never escape this crate
//! as errors.

pub mod dispatch;
pub mod errors;
pub mod handlers;
pub mod limits;
pub mod router;

pub use dispatch::{Command, contains, match_command, strip_command};
pub use router::CommandRouter;
