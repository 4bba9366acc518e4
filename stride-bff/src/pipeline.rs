//! The request pipeline
//!
//! An explicit, ordered chain of stages wrapped around an opaque
//! downstream handler. Per request:
//!
//! 1. Extract the client context from telemetry headers (never fails).
//! 2. Rate-limit check; a rejection short-circuits with a 429 before the
//!    handler runs.
//! 3. Cache lookup; a hit returns the stored envelope verbatim with
//!    `x-cache-hit: true`.
//! 4. Invoke the downstream handler under the configured deadline; the
//!    only stage allowed to block on I/O.
//! 5. Select the adaptation strategy from the context.
//! 6. Transform the handler payload with that strategy.
//! 7. Assemble the success envelope (`meta.timestamp`, `meta.version`,
//!    `meta.cache`).
//! 8. Write the envelope to the cache under the route's TTL policy.
//! 9. Attach the optimization headers and respond.
//!
//! Every failure after stage 2 funnels through the error normalizer
//! exactly once, so clients always see a single uniform envelope shape.
//! Concurrent cold misses on the same key may both invoke the handler;
//! the duplicate work is accepted and the last cache write wins.

use crate::cache::key::ANONYMOUS_IDENTITY;
use crate::cache::{derive_key, ResponseCache};
use crate::config::BffConfig;
use crate::context::ClientContext;
use crate::envelope::{success_envelope, ErrorNormalizer, Meta};
use crate::error::{BffError, Result};
use crate::ratelimit::{identity_key, RateDecision, SlidingWindowLimiter};
use crate::strategy;
use crate::transform::transform;
use http::HeaderMap;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Response header set on cache hits
pub const CACHE_HIT_HEADER: &str = "x-cache-hit";
/// Response header reporting whether the battery dimension optimized
pub const BATTERY_APPLIED_HEADER: &str = "x-battery-optimization-applied";
/// Response header reporting whether the network dimension optimized
pub const NETWORK_APPLIED_HEADER: &str = "x-network-optimization-applied";

/// A request as the pipeline sees it, decoupled from any web framework
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub client_ip: String,
    /// Authenticated user id resolved by the auth collaborator, if any
    pub user_id: Option<String>,
}

impl PipelineRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            client_ip: "127.0.0.1".to_string(),
            user_id: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_client_ip(mut self, ip: impl Into<String>) -> Self {
        self.client_ip = ip.into();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// A finished response: status, extra headers, and the envelope body
#[derive(Debug, Clone)]
pub struct PipelineResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl PipelineResponse {
    /// Look up a response header by name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Orchestrates the fixed stage order around downstream handlers
///
/// Constructed once at startup; the cache and limiter it owns are
/// process-wide singletons shared by every request.
pub struct MobileBffPipeline {
    cache: Arc<ResponseCache>,
    limiter: Arc<SlidingWindowLimiter>,
    normalizer: ErrorNormalizer,
    handler_timeout: Duration,
}

impl MobileBffPipeline {
    /// Create a pipeline from configuration
    pub fn new(config: BffConfig) -> Self {
        Self {
            cache: Arc::new(ResponseCache::new(config.cache)),
            limiter: Arc::new(SlidingWindowLimiter::new(config.rate_limit)),
            normalizer: ErrorNormalizer::new(config.detailed_errors),
            handler_timeout: config.handler_timeout,
        }
    }

    /// The shared response cache (exposed for tests and resets)
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// The shared rate limiter (exposed for tests and resets)
    pub fn limiter(&self) -> &SlidingWindowLimiter {
        &self.limiter
    }

    /// Normalize an error into a finished response
    pub fn error_response(&self, error: &BffError) -> PipelineResponse {
        let (status, body) = self.normalizer.normalize(error);
        PipelineResponse {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Run a request through the pipeline around a downstream handler
    pub async fn handle<F, Fut>(&self, request: &PipelineRequest, handler: F) -> PipelineResponse
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        // Stage 1: telemetry extraction.
        let context = ClientContext::from_headers(&request.headers);

        // Stage 2: rate limiting, keyed on ip:user.
        let rate_key = identity_key(&request.client_ip, request.user_id.as_deref());
        if let RateDecision::Rejected { retry_after_secs } = self.limiter.consume(&rate_key).await {
            warn!(key = %rate_key, path = %request.path, "request rate limited");
            return self.error_response(&BffError::RateLimit { retry_after_secs });
        }

        // Stage 3: cache lookup under the deterministic key.
        let identity = request.user_id.as_deref().unwrap_or(ANONYMOUS_IDENTITY);
        let cache_key = derive_key(
            &request.method,
            &request.path,
            identity,
            &request.query,
            request.body.as_ref(),
        );
        if let Some(envelope) = self.cache.get(&cache_key).await {
            return PipelineResponse {
                status: 200,
                headers: vec![(CACHE_HIT_HEADER.to_string(), "true".to_string())],
                body: envelope,
            };
        }

        // Stage 4: downstream handler under the deadline.
        let result = match timeout(self.handler_timeout, handler()).await {
            Ok(result) => result,
            Err(_) => Err(BffError::Timeout {
                timeout_secs: self.handler_timeout.as_secs(),
                context: request.path.clone(),
            }),
        };
        let data = match result {
            Ok(data) => data,
            Err(error) => {
                debug!(path = %request.path, %error, "downstream handler failed");
                return self.error_response(&error);
            }
        };

        // Stages 5-6: strategy selection and payload shaping.
        let selected = strategy::select(&context);
        let shaped = transform(&data, &selected.strategy);

        // Stages 7-8: envelope assembly and cache write.
        let ttl = self.cache.resolve_ttl(&request.path);
        let envelope = success_envelope(
            shaped,
            Meta::new().with_cache(ttl.as_secs(), cache_key.clone()),
        );
        self.cache.set(&cache_key, envelope.clone(), ttl).await;

        // Stage 9: optimization headers.
        PipelineResponse {
            status: 200,
            headers: vec![
                (
                    BATTERY_APPLIED_HEADER.to_string(),
                    selected.battery_optimization_applied().to_string(),
                ),
                (
                    NETWORK_APPLIED_HEADER.to_string(),
                    selected.network_optimization_applied().to_string(),
                ),
            ],
            body: envelope,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pipeline() -> MobileBffPipeline {
        MobileBffPipeline::new(BffConfig::default())
    }

    #[tokio::test]
    async fn test_success_response_shape() {
        let pipeline = pipeline();
        let request = PipelineRequest::get("/mobile/exercise/stats");

        let response = pipeline
            .handle(&request, || async { Ok(json!({"total": 5})) })
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(response.body["data"]["total"], json!(5));
        assert_eq!(response.body["meta"]["version"], json!("1.0"));
        assert!(response.body["meta"]["cache"]["key"].is_string());
        assert_eq!(response.header(BATTERY_APPLIED_HEADER), Some("false"));
        assert_eq!(response.header(NETWORK_APPLIED_HEADER), Some("false"));
        assert_eq!(response.header(CACHE_HIT_HEADER), None);
    }

    #[tokio::test]
    async fn test_handler_error_normalized() {
        let pipeline = pipeline();
        let request = PipelineRequest::get("/mobile/exercise/sessions/s-404");

        let response = pipeline
            .handle(&request, || async {
                Err(BffError::NotFound("session s-404".into()))
            })
            .await;

        assert_eq!(response.status, 404);
        assert_eq!(response.body["error"]["statusCode"], json!(404));
        assert!(response.body["meta"]["timestamp"].is_i64());
    }

    #[tokio::test]
    async fn test_optimization_headers_reflect_context() {
        let pipeline = pipeline();
        let mut headers = HeaderMap::new();
        headers.insert("x-battery-level", "10".parse().unwrap());
        let request = PipelineRequest::get("/mobile/social/feed").with_headers(headers);

        let response = pipeline.handle(&request, || async { Ok(json!([])) }).await;

        assert_eq!(response.header(BATTERY_APPLIED_HEADER), Some("true"));
        assert_eq!(response.header(NETWORK_APPLIED_HEADER), Some("false"));
    }
}
