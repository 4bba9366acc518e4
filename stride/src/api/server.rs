//! API server for Stride

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

use stride_bff::{BffConfig, CacheConfig, MobileBffPipeline};

use super::auth::TokenAuth;
use super::routes::{
    competition_leaderboard, create_session, exercise_stats, exercise_templates, login,
    mobile_health, social_feed, AppState,
};
use crate::fixtures::FixtureStore;

/// Configuration for the API server
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub bff: BffConfig,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        let mut bff = BffConfig::from_env();
        bff.cache = route_cache_config(bff.cache);

        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            jwt_secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "default_secret_change_in_production".to_string()),
            bff,
        }
    }
}

/// Attach the per-route TTL policy to a base cache config
///
/// Reads are cached with TTLs matched to their volatility; auth routes
/// are never cached.
fn route_cache_config(base: CacheConfig) -> CacheConfig {
    CacheConfig::builder()
        .default_ttl(base.default_ttl)
        .max_entries(base.max_entries)
        .rule("/mobile/exercise/templates", Duration::from_secs(3600))
        .rule("/mobile/exercise", Duration::from_secs(300))
        .rule("/mobile/competition", Duration::from_secs(120))
        .rule("/mobile/social/feed", Duration::from_secs(60))
        .rule("/mobile/auth", Duration::from_secs(0))
        .build()
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
}

impl ApiServer {
    /// Create a new API server with configuration
    pub fn new(config: ApiServerConfig) -> Self {
        Self { config }
    }

    /// Create a new API server with default configuration
    pub fn with_defaults() -> Self {
        Self {
            config: ApiServerConfig::default(),
        }
    }

    /// Start the API server
    pub async fn start(self) -> Result<()> {
        let pipeline = MobileBffPipeline::new(self.config.bff);

        // Create application state
        let app_state = Arc::new(AppState {
            pipeline,
            auth: TokenAuth::new(&self.config.jwt_secret),
            fixtures: FixtureStore,
        });

        // Build router
        let app = Router::new()
            .route("/mobile/health", get(mobile_health))
            .route("/mobile/auth/login", post(login))
            .route("/mobile/exercise/stats", get(exercise_stats))
            .route("/mobile/exercise/templates", get(exercise_templates))
            .route("/mobile/exercise/sessions", post(create_session))
            .route("/mobile/competition/leaderboard", get(competition_leaderboard))
            .route("/mobile/social/feed", get(social_feed))
            .with_state(app_state)
            // Add CORS layer
            .layer(CorsLayer::permissive());

        // Start server
        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("Starting API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_cache_config_policy() {
        let config = route_cache_config(CacheConfig::default());

        assert_eq!(
            config.resolve_ttl("/mobile/exercise/templates"),
            Duration::from_secs(3600)
        );
        // Longer prefixes win over shorter ones on the same subtree.
        assert_eq!(
            config.resolve_ttl("/mobile/exercise/stats"),
            Duration::from_secs(300)
        );
        assert_eq!(
            config.resolve_ttl("/mobile/auth/login"),
            Duration::from_secs(0)
        );
        assert_eq!(
            config.resolve_ttl("/mobile/unknown"),
            config.default_ttl
        );
    }
}
