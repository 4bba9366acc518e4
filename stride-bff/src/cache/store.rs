//! Response cache store with TTL expiry and LRU eviction

use crate::cache::{config::CacheConfig, entry::CacheEntry};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Counters for cache behavior, exposed for observability and tests
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheStats {
    /// Total number of cache hits
    pub hits: u64,

    /// Total number of cache misses
    pub misses: u64,

    /// Number of entries currently in cache
    pub entries: usize,

    /// Evictions caused by the entry-count limit
    pub evictions_lru: u64,

    /// Evictions caused by TTL expiry
    pub evictions_ttl: u64,
}

impl CacheStats {
    /// Cache hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, entries: {}, evictions: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.entries,
            self.evictions_lru + self.evictions_ttl
        )
    }
}

/// TTL-keyed response cache with LRU eviction
///
/// Process-wide singleton shared by every concurrently executing request.
/// All read-modify-write sequences (expiry check + evict, LRU touch,
/// eviction on insert) run under one `RwLock` write guard, so the entry
/// count cannot be corrupted and exactly one writer performs any given
/// eviction. No operation can fail a request; a miss is the worst
/// outcome.
pub struct ResponseCache {
    config: CacheConfig,
    inner: Arc<RwLock<StoreInner>>,
}

struct StoreInner {
    /// Main storage: key -> entry
    entries: HashMap<String, CacheEntry>,

    /// LRU tracking: least recently used at the front
    lru_queue: VecDeque<String>,

    stats: CacheStats,
}

impl ResponseCache {
    /// Create a new cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        info!(
            max_entries = config.max_entries,
            default_ttl_secs = config.default_ttl.as_secs(),
            rules = config.rules.len(),
            "initializing response cache"
        );

        Self {
            config,
            inner: Arc::new(RwLock::new(StoreInner {
                entries: HashMap::new(),
                lru_queue: VecDeque::new(),
                stats: CacheStats::default(),
            })),
        }
    }

    /// Resolve the TTL policy for a request path
    pub fn resolve_ttl(&self, path: &str) -> Duration {
        self.config.resolve_ttl(path)
    }

    /// Look up a cached envelope
    ///
    /// Returns `None` on absence or expiry; a stale entry is evicted as a
    /// side effect of the lookup.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut inner = self.inner.write().await;

        let expired = inner.entries.get(key).map(|entry| entry.is_expired());
        match expired {
            Some(true) => {
                debug!(key, "cache entry expired");
                inner.stats.misses += 1;
                inner.stats.evictions_ttl += 1;
                Self::remove_entry(&mut inner, key);
                None
            }
            Some(false) => {
                let value = inner.entries.get_mut(key).map(|entry| {
                    entry.mark_accessed();
                    entry.value.clone()
                });
                inner.stats.hits += 1;

                // Move to the back of the LRU queue (most recently used).
                inner.lru_queue.retain(|k| k != key);
                inner.lru_queue.push_back(key.to_string());

                debug!(key, "cache hit");
                value
            }
            None => {
                debug!(key, "cache miss");
                inner.stats.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite an envelope under the given key
    ///
    /// A zero TTL means "never cache" and the call is a no-op. When the
    /// store is at capacity the least-recently-used entry is evicted
    /// first.
    pub async fn set(&self, key: &str, value: Value, ttl: Duration) {
        if ttl.is_zero() {
            debug!(key, "zero TTL, skipping cache write");
            return;
        }

        let mut inner = self.inner.write().await;

        if inner.entries.contains_key(key) {
            debug!(key, "updating cache entry");
            inner
                .entries
                .insert(key.to_string(), CacheEntry::new(value, ttl));
            inner.lru_queue.retain(|k| k != key);
            inner.lru_queue.push_back(key.to_string());
        } else {
            while inner.entries.len() >= self.config.max_entries {
                match inner.lru_queue.pop_front() {
                    Some(evicted) => {
                        debug!(key = %evicted, "evicting least recently used entry");
                        inner.entries.remove(&evicted);
                        inner.stats.evictions_lru += 1;
                    }
                    None => break,
                }
            }

            debug!(key, ttl_secs = ttl.as_secs(), "inserting cache entry");
            inner
                .entries
                .insert(key.to_string(), CacheEntry::new(value, ttl));
            inner.lru_queue.push_back(key.to_string());
        }

        inner.stats.entries = inner.entries.len();
    }

    /// Clear all entries (used by tests and graceful resets)
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        let count = inner.entries.len();
        inner.entries.clear();
        inner.lru_queue.clear();
        inner.stats.entries = 0;
        info!(count, "cleared response cache");
    }

    /// Current cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats.clone()
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    fn remove_entry(inner: &mut StoreInner, key: &str) {
        if inner.entries.remove(key).is_some() {
            inner.lru_queue.retain(|k| k != key);
            inner.stats.entries = inner.entries.len();
        }
    }
}
