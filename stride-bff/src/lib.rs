//! # Stride Mobile BFF
//!
//! Mobile-aware response adaptation pipeline for the Stride fitness
//! backend. The pipeline wraps opaque domain handlers and specializes
//! their responses for the client's battery and network conditions:
//!
//! - **Response caching** with route-specific TTL policies and LRU
//!   eviction
//! - **Sliding-window rate limiting** per client identity
//! - **Strategy selection** from client-reported telemetry, merged
//!   conservatively across battery and network dimensions
//! - **Structural payload transformation** of arbitrary JSON
//! - **Uniform envelopes** for every success and failure
//!
//! ## Example
//!
//! ```rust
//! use serde_json::json;
//! use stride_bff::{BffConfig, MobileBffPipeline, PipelineRequest};
//!
//! # async fn example() {
//! let pipeline = MobileBffPipeline::new(BffConfig::default());
//!
//! let request = PipelineRequest::get("/mobile/exercise/stats");
//! let response = pipeline
//!     .handle(&request, || async { Ok(json!({"totalSessions": 12})) })
//!     .await;
//!
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body["meta"]["version"], json!("1.0"));
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod ratelimit;
pub mod strategy;
pub mod transform;

// Re-export main types for convenience
pub use cache::{CacheConfig, CacheConfigBuilder, CachePolicyRule, CacheStats, ResponseCache};
pub use config::BffConfig;
pub use context::{ClientContext, EffectiveType, NetworkType};
pub use envelope::{ErrorNormalizer, Meta, ENVELOPE_VERSION};
pub use error::{BffError, Result};
pub use pipeline::{
    MobileBffPipeline, PipelineRequest, PipelineResponse, BATTERY_APPLIED_HEADER,
    CACHE_HIT_HEADER, NETWORK_APPLIED_HEADER,
};
pub use ratelimit::{identity_key, RateDecision, RateLimitConfig, SlidingWindowLimiter};
pub use strategy::{AdaptationStrategy, SelectedStrategy, StrategyTier};
pub use transform::transform;
