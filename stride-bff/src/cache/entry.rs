//! Cache entry with absolute expiry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A cached response envelope with its expiry and access metadata
///
/// Recency ordering lives in the store's LRU queue, not here; the entry
/// only tracks how often it was served.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored response envelope, returned verbatim on a hit
    pub value: Value,

    /// Absolute expiry; the entry is stale once `now >= expires_at`
    pub expires_at: DateTime<Utc>,

    /// Number of cache hits served from this entry
    pub access_count: u64,
}

impl CacheEntry {
    /// Create an entry expiring `ttl` from now
    pub fn new(value: Value, ttl: Duration) -> Self {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(300));

        Self {
            value,
            expires_at,
            access_count: 0,
        }
    }

    /// Create an entry with an explicit expiry timestamp
    pub fn with_expiration(value: Value, expires_at: DateTime<Utc>) -> Self {
        Self {
            value,
            expires_at,
            access_count: 0,
        }
    }

    /// Whether the entry is stale
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the entry is stale relative to an explicit clock
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Record a cache hit
    pub fn mark_accessed(&mut self) {
        self.access_count += 1;
    }
}
