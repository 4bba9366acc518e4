//! Pipeline configuration
//!
//! Sourced from the `MOBILE_*` environment variables carried over from
//! the original deployment contract, with code-level defaults when the
//! environment leaves them unset.

use crate::cache::CacheConfig;
use crate::ratelimit::RateLimitConfig;
use std::time::Duration;

/// Top-level configuration for the mobile BFF pipeline
#[derive(Debug, Clone)]
pub struct BffConfig {
    /// Response cache configuration
    pub cache: CacheConfig,

    /// Sliding-window rate limiter configuration
    pub rate_limit: RateLimitConfig,

    /// Deadline applied at the downstream handler invocation
    pub handler_timeout: Duration,

    /// Whether error envelopes carry original messages (disabled in
    /// production so internals never leak)
    pub detailed_errors: bool,
}

impl Default for BffConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            rate_limit: RateLimitConfig::default(),
            handler_timeout: Duration::from_secs(30),
            detailed_errors: true,
        }
    }
}

impl BffConfig {
    /// Build a configuration from the environment, falling back to
    /// defaults field by field
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cache = CacheConfig::builder()
            .default_ttl(Duration::from_secs(
                env_u64("MOBILE_CACHE_TTL").unwrap_or(defaults.cache.default_ttl.as_secs()),
            ))
            .max_entries(
                env_u64("MOBILE_CACHE_MAX_ITEMS")
                    .map(|v| v as usize)
                    .unwrap_or(defaults.cache.max_entries),
            )
            .build();

        let rate_limit = RateLimitConfig {
            window: Duration::from_millis(
                env_u64("MOBILE_RATE_LIMIT_WINDOW")
                    .unwrap_or(defaults.rate_limit.window.as_millis() as u64),
            ),
            max_requests: env_u64("MOBILE_RATE_LIMIT_MAX")
                .map(|v| v as usize)
                .unwrap_or(defaults.rate_limit.max_requests),
            max_keys: env_u64("MOBILE_RATE_LIMIT_MAX_KEYS")
                .map(|v| v as usize)
                .unwrap_or(defaults.rate_limit.max_keys),
        };

        Self {
            cache,
            rate_limit,
            handler_timeout: Duration::from_secs(
                env_u64("MOBILE_HANDLER_TIMEOUT").unwrap_or(defaults.handler_timeout.as_secs()),
            ),
            detailed_errors: std::env::var("NODE_ENV")
                .or_else(|_| std::env::var("STRIDE_ENV"))
                .map(|v| v != "production")
                .unwrap_or(defaults.detailed_errors),
        }
    }
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
