//! Bugsmith rate limits - sliding-window request counting.
//!
//! Guards expensive downstream calls (the AI backend) with a per-tenant
//! sliding window persisted in the shared store. The limiter **fails open**:
//! any storage error while checking or updating allows the request, because
//! availability of the primary feature outweighs strict quota enforcement.

pub mod limiter;

pub use limiter::{
    DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECONDS, OPENAI_OPERATION, RateLimitDecision, RateLimiter,
};
