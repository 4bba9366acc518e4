//! Error types for the mobile BFF pipeline
//!
//! This module defines the error taxonomy used across the pipeline. Every
//! failure that can reach a client maps to exactly one variant, and every
//! variant carries a stable HTTP status code so the normalizer can emit a
//! well-formed envelope regardless of where the failure originated.

use thiserror::Error;

/// Main error type for pipeline operations
#[derive(Error, Debug)]
pub enum BffError {
    /// Request validation error - malformed input from the client
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication error - missing, expired, or invalid credentials
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Sliding-window rate limit exceeded for this client identity
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit { retry_after_secs: u64 },

    /// Downstream handler or datastore failure
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Downstream handler exceeded its deadline
    #[error("Upstream timed out after {timeout_secs}s: {context}")]
    Timeout { timeout_secs: u64, context: String },

    /// Defect in the pipeline itself
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, BffError>;

impl BffError {
    /// HTTP status code for this error kind
    pub fn status_code(&self) -> u16 {
        match self {
            BffError::Validation(_) => 400,
            BffError::Auth(_) => 401,
            BffError::NotFound(_) => 404,
            BffError::RateLimit { .. } => 429,
            BffError::Upstream(_) => 502,
            BffError::Timeout { .. } => 502,
            BffError::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code, where one exists
    pub fn code(&self) -> Option<&'static str> {
        match self {
            BffError::RateLimit { .. } => Some("RATE_LIMIT_EXCEEDED"),
            BffError::Timeout { .. } => Some("UPSTREAM_TIMEOUT"),
            _ => None,
        }
    }
}

impl From<String> for BffError {
    fn from(s: String) -> Self {
        BffError::Internal(s)
    }
}

impl From<&str> for BffError {
    fn from(s: &str) -> Self {
        BffError::Internal(s.to_string())
    }
}

impl From<serde_json::Error> for BffError {
    fn from(e: serde_json::Error) -> Self {
        BffError::Internal(format!("JSON error: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = BffError::Validation("missing field".to_string());
        assert_eq!(error.to_string(), "Validation error: missing field");

        let timeout = BffError::Timeout {
            timeout_secs: 30,
            context: "exercise stats".to_string(),
        };
        assert!(timeout.to_string().contains("timed out after 30s"));

        let rate = BffError::RateLimit {
            retry_after_secs: 900,
        };
        assert!(rate.to_string().contains("900"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(BffError::Validation("x".into()).status_code(), 400);
        assert_eq!(BffError::Auth("x".into()).status_code(), 401);
        assert_eq!(BffError::NotFound("x".into()).status_code(), 404);
        assert_eq!(
            BffError::RateLimit {
                retry_after_secs: 1
            }
            .status_code(),
            429
        );
        assert_eq!(BffError::Upstream("x".into()).status_code(), 502);
        assert_eq!(BffError::Internal("x".into()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BffError::RateLimit {
                retry_after_secs: 1
            }
            .code(),
            Some("RATE_LIMIT_EXCEEDED")
        );
        assert_eq!(BffError::Internal("x".into()).code(), None);
    }

    #[test]
    fn test_error_conversion() {
        let error: BffError = "boom".into();
        assert!(matches!(error, BffError::Internal(_)));

        let error: BffError = "boom".to_string().into();
        assert!(matches!(error, BffError::Internal(_)));
    }
}
