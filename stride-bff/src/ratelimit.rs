//! Sliding-window rate limiting
//!
//! Each client identity (`ip:user-or-anonymous`) owns an ordered sequence
//! of request timestamps inside the trailing window. On every check the
//! sequence is pruned before counting; a rejected attempt is never
//! recorded, so the sequence length can never exceed the configured
//! maximum. The identity map itself is bounded: when it fills up, the
//! identity whose latest request is oldest is evicted.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Configuration for the sliding-window limiter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Trailing window length
    pub window: Duration,

    /// Maximum requests per identity inside the window
    pub max_requests: usize,

    /// Maximum number of tracked identities before eviction
    pub max_keys: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            // 15 minute window, 100 requests, per the mobile client contract
            window: Duration::from_secs(15 * 60),
            max_requests: 100,
            max_keys: 10_000,
        }
    }
}

/// Outcome of a rate-limit check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    /// Request admitted; `remaining` is the budget left in the window
    Allowed { remaining: usize },

    /// Request rejected and not recorded
    Rejected { retry_after_secs: u64 },
}

impl RateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateDecision::Allowed { .. })
    }
}

/// Sliding-window request counter, shared across all in-flight requests
pub struct SlidingWindowLimiter {
    config: RateLimitConfig,
    windows: Arc<RwLock<HashMap<String, VecDeque<DateTime<Utc>>>>>,
}

/// Compose the rate-limit identity for a request
pub fn identity_key(client_ip: &str, user_id: Option<&str>) -> String {
    format!("{}:{}", client_ip, user_id.unwrap_or("anonymous"))
}

impl SlidingWindowLimiter {
    /// Create a new limiter with the given configuration
    pub fn new(config: RateLimitConfig) -> Self {
        info!(
            window_secs = config.window.as_secs(),
            max_requests = config.max_requests,
            max_keys = config.max_keys,
            "initializing sliding-window rate limiter"
        );

        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check and record a request for the given identity
    pub async fn consume(&self, key: &str) -> RateDecision {
        self.consume_at(key, Utc::now()).await
    }

    /// Check and record a request against an explicit clock
    ///
    /// The production path goes through [`consume`](Self::consume); this
    /// entry point exists so window behavior is testable without
    /// sleeping through real time.
    pub async fn consume_at(&self, key: &str, now: DateTime<Utc>) -> RateDecision {
        let window = ChronoDuration::from_std(self.config.window)
            .unwrap_or_else(|_| ChronoDuration::seconds(900));
        let cutoff = now - window;

        let mut windows = self.windows.write().await;

        // Prune expired timestamps before counting.
        if let Some(timestamps) = windows.get_mut(key) {
            while timestamps.front().is_some_and(|t| *t <= cutoff) {
                timestamps.pop_front();
            }
            if timestamps.is_empty() {
                windows.remove(key);
            }
        }

        let count = windows.get(key).map(|t| t.len()).unwrap_or(0);
        if count >= self.config.max_requests {
            let retry_after_secs = self.config.window.as_secs();
            debug!(key, count, retry_after_secs, "rate limit exceeded");
            return RateDecision::Rejected { retry_after_secs };
        }

        if !windows.contains_key(key) && windows.len() >= self.config.max_keys {
            Self::evict_stalest(&mut windows);
        }

        windows.entry(key.to_string()).or_default().push_back(now);

        RateDecision::Allowed {
            remaining: self.config.max_requests - count - 1,
        }
    }

    /// Number of identities currently tracked
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }

    /// Drop all tracked windows (used by tests and graceful resets)
    pub async fn clear(&self) {
        self.windows.write().await.clear();
    }

    /// Evict the identity whose most recent request is oldest
    fn evict_stalest(windows: &mut HashMap<String, VecDeque<DateTime<Utc>>>) {
        let stalest = windows
            .iter()
            .min_by_key(|(_, timestamps)| timestamps.back().copied())
            .map(|(key, _)| key.clone());

        if let Some(key) = stalest {
            warn!(key = %key, "identity map full, evicting stalest window");
            windows.remove(&key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key() {
        assert_eq!(identity_key("10.0.0.1", Some("user-1")), "10.0.0.1:user-1");
        assert_eq!(identity_key("10.0.0.1", None), "10.0.0.1:anonymous");
    }

    #[tokio::test]
    async fn test_boundary_at_max() {
        let limiter = SlidingWindowLimiter::new(RateLimitConfig {
            window: Duration::from_secs(900),
            max_requests: 100,
            max_keys: 100,
        });
        let now = Utc::now();

        for i in 0..100 {
            let decision = limiter.consume_at("10.0.0.1:anonymous", now).await;
            assert!(decision.is_allowed(), "request {} should be allowed", i);
        }

        let decision = limiter.consume_at("10.0.0.1:anonymous", now).await;
        assert_eq!(
            decision,
            RateDecision::Rejected {
                retry_after_secs: 900
            }
        );
    }

    #[tokio::test]
    async fn test_rejection_not_recorded() {
        let limiter = SlidingWindowLimiter::new(RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 2,
            max_keys: 100,
        });
        let now = Utc::now();

        limiter.consume_at("k", now).await;
        limiter.consume_at("k", now).await;

        // Repeated rejections must not grow the sequence; capacity frees
        // up the moment the window slides past the recorded requests.
        for _ in 0..10 {
            assert!(!limiter.consume_at("k", now).await.is_allowed());
        }

        let later = now + ChronoDuration::seconds(61);
        assert!(limiter.consume_at("k", later).await.is_allowed());
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new(RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 1,
            max_keys: 100,
        });
        let now = Utc::now();

        assert!(limiter.consume_at("k", now).await.is_allowed());
        assert!(!limiter
            .consume_at("k", now + ChronoDuration::seconds(30))
            .await
            .is_allowed());
        assert!(limiter
            .consume_at("k", now + ChronoDuration::seconds(61))
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn test_identities_are_independent() {
        let limiter = SlidingWindowLimiter::new(RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 1,
            max_keys: 100,
        });
        let now = Utc::now();

        assert!(limiter.consume_at("10.0.0.1:anonymous", now).await.is_allowed());
        assert!(limiter.consume_at("10.0.0.2:anonymous", now).await.is_allowed());
        assert!(limiter.consume_at("10.0.0.1:user-1", now).await.is_allowed());
        assert!(!limiter.consume_at("10.0.0.1:anonymous", now).await.is_allowed());
    }

    #[tokio::test]
    async fn test_remaining_budget() {
        let limiter = SlidingWindowLimiter::new(RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 3,
            max_keys: 100,
        });
        let now = Utc::now();

        assert_eq!(
            limiter.consume_at("k", now).await,
            RateDecision::Allowed { remaining: 2 }
        );
        assert_eq!(
            limiter.consume_at("k", now).await,
            RateDecision::Allowed { remaining: 1 }
        );
        assert_eq!(
            limiter.consume_at("k", now).await,
            RateDecision::Allowed { remaining: 0 }
        );
    }

    #[tokio::test]
    async fn test_key_map_bounded() {
        let limiter = SlidingWindowLimiter::new(RateLimitConfig {
            window: Duration::from_secs(60),
            max_requests: 10,
            max_keys: 3,
        });
        let now = Utc::now();

        limiter.consume_at("a", now).await;
        limiter.consume_at("b", now + ChronoDuration::seconds(1)).await;
        limiter.consume_at("c", now + ChronoDuration::seconds(2)).await;
        limiter.consume_at("d", now + ChronoDuration::seconds(3)).await;

        assert_eq!(limiter.tracked_keys().await, 3);
        // "a" had the stalest latest request, so it was the one evicted;
        // its budget is fresh again.
        assert_eq!(
            limiter.consume_at("a", now + ChronoDuration::seconds(4)).await,
            RateDecision::Allowed { remaining: 9 }
        );
    }
}
