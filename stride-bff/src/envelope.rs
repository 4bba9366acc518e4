//! Response envelopes and error normalization
//!
//! Every response leaving the BFF, success or failure, is wrapped in one
//! uniform envelope so mobile clients can rely on a stable shape. The
//! [`ErrorNormalizer`] maps any [`BffError`] into the error variant;
//! rate-limit rejections use the distinct body the mobile client already
//! understands.

use crate::error::BffError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Envelope schema version reported in `meta.version`
pub const ENVELOPE_VERSION: &str = "1.0";

/// Cache provenance attached to cacheable success responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// TTL in seconds the response was stored with (0 = not cached)
    pub ttl: u64,
    /// The derived cache key for this request
    pub key: String,
}

/// Envelope metadata shared by success and error responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Epoch milliseconds at envelope assembly
    pub timestamp: i64,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheMeta>,
}

impl Meta {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now().timestamp_millis(),
            version: ENVELOPE_VERSION.to_string(),
            cache: None,
        }
    }

    pub fn with_cache(mut self, ttl_secs: u64, key: impl Into<String>) -> Self {
        self.cache = Some(CacheMeta {
            ttl: ttl_secs,
            key: key.into(),
        });
        self
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new()
    }
}

/// Error payload inside an error envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Assemble a success envelope around transformed payload data
pub fn success_envelope(data: Value, meta: Meta) -> Value {
    json!({
        "data": data,
        "meta": meta,
    })
}

/// Maps any pipeline failure into a uniform error envelope
#[derive(Debug, Clone)]
pub struct ErrorNormalizer {
    /// When false (production), original error messages are replaced by
    /// generic status phrases so no internal detail leaks to clients
    detailed_errors: bool,
}

impl ErrorNormalizer {
    pub fn new(detailed_errors: bool) -> Self {
        Self { detailed_errors }
    }

    /// Normalize an error into `(status_code, body)`
    ///
    /// Rate-limit rejections keep the dedicated body shape; everything
    /// else becomes the standard error envelope with the same `meta` the
    /// success path produces.
    pub fn normalize(&self, error: &BffError) -> (u16, Value) {
        if let BffError::RateLimit { retry_after_secs } = error {
            return (
                429,
                json!({
                    "success": false,
                    "error": {
                        "code": "RATE_LIMIT_EXCEEDED",
                        "message": "Too many requests",
                        "retryAfter": retry_after_secs,
                    },
                }),
            );
        }

        let status = error.status_code();
        let message = if self.detailed_errors {
            error.to_string()
        } else {
            generic_message(status).to_string()
        };

        let body = json!({
            "error": ErrorBody {
                message,
                status_code: status,
                code: error.code().map(|c| c.to_string()),
            },
            "meta": Meta::new(),
        });

        (status, body)
    }
}

fn generic_message(status: u16) -> &'static str {
    match status {
        400 => "Bad request",
        401 => "Unauthorized",
        404 => "Not found",
        502 => "Bad gateway",
        _ => "Internal server error",
    }
}
