//! Sliding-window limiter.

use std::sync::Arc;

use bugsmith_settings::TeamId;
use bugsmith_store::{RateLimitDocument, RateLimitStore, RequestStamp};
use chrono::{DateTime, Duration, Utc};
use tracing::warn;

/// Default maximum requests per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 100;

/// Default window length: one day.
pub const DEFAULT_WINDOW_SECONDS: u64 = 86_400;

/// Operation name used for the AI-call limiter.
pub const OPENAI_OPERATION: &str = "openai_api";

/// Outcome of a limiter check. Denial is a normal negative result, not an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Denied {
        /// Human-readable retry-after message.
        message: String,
    },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }
}

/// Sliding-window rate limiter over the shared store.
///
/// The read-prune-append cycle is not mutually exclusive across concurrent
/// callers for the same tenant, so under high concurrency the limit can be
/// exceeded by a small margin. Accepted: the limiter already fails open.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    max_requests: u32,
    window: Duration,
    operation: String,
}

impl RateLimiter {
    pub fn new(
        store: Arc<dyn RateLimitStore>,
        max_requests: u32,
        window_seconds: u64,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            store,
            max_requests,
            window: Duration::seconds(window_seconds as i64),
            operation: operation.into(),
        }
    }

    fn key(&self, team: &TeamId) -> String {
        format!("{}:{}", self.operation, team.as_str())
    }

    /// Check whether a request is allowed now.
    pub async fn check(&self, team: &TeamId) -> RateLimitDecision {
        self.check_at(team, Utc::now()).await
    }

    /// Check against an explicit clock. Split out so tests can advance time.
    pub async fn check_at(&self, team: &TeamId, now: DateTime<Utc>) -> RateLimitDecision {
        let key = self.key(team);
        let window_start = now - self.window;

        let existing = match self.store.find_limit(&key).await {
            Ok(doc) => doc,
            Err(err) => {
                warn!(%key, %err, "rate limit lookup failed; allowing request");
                return RateLimitDecision::Allowed;
            }
        };

        let Some(doc) = existing else {
            let stamp = bson::DateTime::from_chrono(now);
            let doc = RateLimitDocument {
                rate_limit_key: key.clone(),
                team_id: team.as_str().to_string(),
                requests: vec![RequestStamp::from(now)],
                created_at: stamp,
                updated_at: stamp,
            };
            if let Err(err) = self.store.insert_limit(&doc).await {
                warn!(%key, %err, "rate limit insert failed; allowing request");
            }
            return RateLimitDecision::Allowed;
        };

        // Prune entries that left the window; unparsable stamps are dropped.
        let mut valid: Vec<DateTime<Utc>> = doc
            .requests
            .iter()
            .filter_map(RequestStamp::to_utc)
            .filter(|at| *at >= window_start)
            .collect();

        if valid.len() >= self.max_requests as usize {
            if let Some(oldest) = valid.iter().min() {
                let wait = *oldest + self.window - now;
                let wait_secs = wait.num_seconds();
                if wait_secs > 0 {
                    return RateLimitDecision::Denied {
                        message: format!(
                            "You've reached the daily limit of {} AI requests. \
                             Please try again in {}. (Limit resets daily)",
                            self.max_requests,
                            format_wait(wait_secs)
                        ),
                    };
                }
                // Non-positive wait: the oldest entry just expired, let it through.
            }
        }

        valid.push(now);
        let stamps: Vec<RequestStamp> = valid.into_iter().map(RequestStamp::from).collect();
        if let Err(err) = self
            .store
            .set_limit_requests(&key, &stamps, bson::DateTime::from_chrono(now))
            .await
        {
            warn!(%key, %err, "rate limit update failed; allowing request");
        }

        RateLimitDecision::Allowed
    }

    /// Requests left in the current window. Fails open to the maximum.
    pub async fn remaining(&self, team: &TeamId) -> u32 {
        self.remaining_at(team, Utc::now()).await
    }

    /// Remaining count against an explicit clock.
    pub async fn remaining_at(&self, team: &TeamId, now: DateTime<Utc>) -> u32 {
        let key = self.key(team);
        let window_start = now - self.window;

        match self.store.find_limit(&key).await {
            Ok(Some(doc)) => {
                let used = doc
                    .requests
                    .iter()
                    .filter_map(RequestStamp::to_utc)
                    .filter(|at| *at >= window_start)
                    .count();
                self.max_requests.saturating_sub(used as u32)
            }
            Ok(None) => self.max_requests,
            Err(err) => {
                warn!(%key, %err, "rate limit lookup failed; reporting full quota");
                self.max_requests
            }
        }
    }
}

/// Render a wait in hours-and-minutes granularity.
fn format_wait(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;

    let plural = |n: i64| if n == 1 { "" } else { "s" };

    if hours > 0 {
        if minutes > 0 {
            format!(
                "{hours} hour{} and {minutes} minute{}",
                plural(hours),
                plural(minutes)
            )
        } else {
            format!("{hours} hour{}", plural(hours))
        }
    } else {
        format!("{minutes} minute{}", plural(minutes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bugsmith_store::{MemoryStore, StoreError, StoreResult};
    use chrono::TimeZone;

    fn team() -> TeamId {
        TeamId::parse("T1").unwrap()
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn test_limit_denied_then_allowed_after_window() {
        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(store, 3, 60, "op");
        let team = team();

        for i in 0..3 {
            assert!(limiter.check_at(&team, at(i)).await.is_allowed());
        }

        match limiter.check_at(&team, at(10)).await {
            RateLimitDecision::Denied { message } => {
                assert!(message.contains("reached the daily limit of 3"));
                assert!(message.contains("try again in"));
            }
            RateLimitDecision::Allowed => panic!("fourth call inside the window must be denied"),
        }

        // All three stamps have left the window now.
        assert!(limiter.check_at(&team, at(70)).await.is_allowed());
    }

    #[tokio::test]
    async fn test_remaining_counts_down_and_resets() {
        let store = Arc::new(MemoryStore::new());
        let limiter = RateLimiter::new(store, 5, 60, "op");
        let team = team();

        assert_eq!(limiter.remaining_at(&team, at(0)).await, 5);
        limiter.check_at(&team, at(0)).await;
        limiter.check_at(&team, at(1)).await;
        assert_eq!(limiter.remaining_at(&team, at(2)).await, 3);
        assert_eq!(limiter.remaining_at(&team, at(120)).await, 5);
    }

    #[tokio::test]
    async fn test_string_timestamps_are_tolerated() {
        let store = Arc::new(MemoryStore::new());
        let key = "op:T1".to_string();
        let doc = RateLimitDocument {
            rate_limit_key: key,
            team_id: "T1".to_string(),
            requests: vec![
                RequestStamp::Text(at(0).to_rfc3339()),
                RequestStamp::Text("garbage".to_string()),
                RequestStamp::from(at(1)),
            ],
            created_at: bson::DateTime::from_chrono(at(0)),
            updated_at: bson::DateTime::from_chrono(at(1)),
        };
        store.insert_limit(&doc).await.unwrap();

        let limiter = RateLimiter::new(store, 2, 60, "op");
        // Two parsable stamps are in the window; the garbage one is dropped,
        // so the limit of 2 is already reached.
        assert!(!limiter.check_at(&team(), at(5)).await.is_allowed());
    }

    #[tokio::test]
    async fn test_wait_message_granularity() {
        assert_eq!(format_wait(3600), "1 hour");
        assert_eq!(format_wait(7800), "2 hours and 10 minutes");
        assert_eq!(format_wait(180), "3 minutes");
        assert_eq!(format_wait(61), "1 minute");
    }

    struct FailingStore;

    #[async_trait]
    impl RateLimitStore for FailingStore {
        async fn find_limit(&self, _key: &str) -> StoreResult<Option<RateLimitDocument>> {
            Err(StoreError::Connection("down".to_string()))
        }

        async fn insert_limit(&self, _doc: &RateLimitDocument) -> StoreResult<()> {
            Err(StoreError::Connection("down".to_string()))
        }

        async fn set_limit_requests(
            &self,
            _key: &str,
            _requests: &[RequestStamp],
            _updated_at: bson::DateTime,
        ) -> StoreResult<()> {
            Err(StoreError::Connection("down".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fails_open_on_store_errors() {
        let limiter = RateLimiter::new(Arc::new(FailingStore), 1, 60, "op");
        let team = team();

        assert!(limiter.check_at(&team, at(0)).await.is_allowed());
        assert!(limiter.check_at(&team, at(1)).await.is_allowed());
        assert_eq!(limiter.remaining_at(&team, at(2)).await, 1);
    }
}
