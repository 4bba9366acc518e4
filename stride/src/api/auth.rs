//! JWT auth collaborator for the mobile BFF
//!
//! The pipeline never interprets tokens itself; it only needs a caller
//! identity for cache and rate-limit keys. This module owns that
//! concern: HS256 token validation plus bearer extraction, with token
//! issuance kept around for the login route and tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stride_bff::BffError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

/// The authenticated caller identity derived from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

/// Token validation and issuance handler
pub struct TokenAuth {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenAuth {
    /// Create a new handler with a shared secret
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for a user
    pub fn issue_token(&self, user_id: &str, expires_in_hours: i64) -> Result<String, BffError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(expires_in_hours)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| BffError::Internal(format!("failed to issue token: {}", e)))
    }

    /// Validate a token and derive the caller identity
    pub fn validate_token(&self, token: &str) -> Result<Identity, BffError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| BffError::Auth(format!("invalid token: {}", e)))?;

        Ok(Identity {
            user_id: data.claims.sub,
        })
    }

    /// Extract the token from an `Authorization: Bearer ...` header value
    pub fn extract_bearer_token(auth_header: &str) -> Result<String, BffError> {
        if !auth_header.starts_with("Bearer ") {
            return Err(BffError::Auth(
                "invalid authorization header format".to_string(),
            ));
        }

        let token = auth_header.trim_start_matches("Bearer ").trim();
        if token.is_empty() {
            return Err(BffError::Auth("empty token".to_string()));
        }

        Ok(token.to_string())
    }
}
