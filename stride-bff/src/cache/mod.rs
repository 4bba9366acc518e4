//! # Response caching layer
//!
//! TTL-keyed in-memory cache for assembled response envelopes, with a
//! route-based policy table and LRU eviction.
//!
//! ## Features
//!
//! - **TTL-based expiration**: entries are read-checked lazily on every
//!   lookup; a TTL of 0 means "never cache"
//! - **Route policies**: ordered prefix rules decide the TTL per path,
//!   longest prefix first, with a configurable default
//! - **LRU eviction**: a bounded entry count with least-recently-used
//!   eviction once the store is full
//! - **Deterministic keys**: keys derived from method, path, caller
//!   identity, and canonicalized query/body, so logically identical
//!   requests always collide
//!
//! Store faults degrade to cache misses; no cache operation can fail a
//! request.

pub mod config;
pub mod entry;
pub mod key;
pub mod store;

pub use config::{CacheConfig, CacheConfigBuilder, CachePolicyRule};
pub use entry::CacheEntry;
pub use key::{canonical_json, derive_key};
pub use store::{CacheStats, ResponseCache};
