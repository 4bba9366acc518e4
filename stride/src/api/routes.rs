//! Mobile API routes
//!
//! Every domain route funnels through the BFF pipeline: the axum handler
//! resolves the caller identity and client IP, builds a
//! [`PipelineRequest`], and hands the fixture-backed domain handler to
//! the pipeline as the downstream stage.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use stride_bff::{BffError, MobileBffPipeline, PipelineRequest, PipelineResponse};

use super::auth::TokenAuth;
use crate::fixtures::FixtureStore;

/// Application state shared across requests
pub struct AppState {
    pub pipeline: MobileBffPipeline,
    pub auth: TokenAuth,
    pub fixtures: FixtureStore,
}

/// Health check endpoint (not wrapped by the pipeline)
pub async fn mobile_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp_millis(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Login endpoint issuing a mobile session token
pub async fn login(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let request = base_request(&state, "POST", "/mobile/auth/login", &headers)
        .map(|r| r.with_body(body.clone()));
    let request = match request {
        Ok(request) => request,
        Err(error) => return into_response(state.pipeline.error_response(&error)),
    };

    let auth = &state.auth;
    let response = state
        .pipeline
        .handle(&request, || async move {
            let email = body.get("email").and_then(Value::as_str).unwrap_or("");
            let password = body.get("password").and_then(Value::as_str).unwrap_or("");
            if email.is_empty() || password.is_empty() {
                return Err(BffError::Validation(
                    "email and password are required".to_string(),
                ));
            }

            // Fixture auth: any non-empty credentials resolve to a
            // deterministic demo user.
            let user_id = format!("user-{}", email.split('@').next().unwrap_or("demo"));
            let token = auth.issue_token(&user_id, 24)?;

            Ok(json!({
                "accessToken": token,
                "userId": user_id,
                "expiresInHours": 24,
            }))
        })
        .await;

    into_response(response)
}

/// Aggregated exercise statistics
pub async fn exercise_stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let request = match base_request(&state, "GET", "/mobile/exercise/stats", &headers) {
        Ok(request) => request.with_query(query),
        Err(error) => return into_response(state.pipeline.error_response(&error)),
    };

    let fixtures = state.fixtures.clone();
    let user_id = request.user_id.clone();
    let response = state
        .pipeline
        .handle(&request, || async move {
            Ok(fixtures.exercise_stats(user_id.as_deref()))
        })
        .await;

    into_response(response)
}

/// Exercise template catalog
pub async fn exercise_templates(
    State(state): State<Arc<AppState>>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let request = match base_request(&state, "GET", "/mobile/exercise/templates", &headers) {
        Ok(request) => request.with_query(query),
        Err(error) => return into_response(state.pipeline.error_response(&error)),
    };

    let fixtures = state.fixtures.clone();
    let category = request
        .query
        .iter()
        .find(|(name, _)| name == "category")
        .map(|(_, value)| value.clone());
    let response = state
        .pipeline
        .handle(&request, || async move {
            Ok(fixtures.exercise_templates(category.as_deref()))
        })
        .await;

    into_response(response)
}

/// Record an exercise session
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let request = match base_request(&state, "POST", "/mobile/exercise/sessions", &headers) {
        Ok(request) => request.with_body(body.clone()),
        Err(error) => return into_response(state.pipeline.error_response(&error)),
    };

    // Session writes need an authenticated caller.
    let user_id = match request.user_id.clone() {
        Some(user_id) => user_id,
        None => {
            return into_response(
                state
                    .pipeline
                    .error_response(&BffError::Auth("authentication required".to_string())),
            )
        }
    };

    let fixtures = state.fixtures.clone();
    let response = state
        .pipeline
        .handle(&request, || async move {
            fixtures.create_session(&user_id, &body)
        })
        .await;

    into_response(response)
}

/// Competition leaderboard
pub async fn competition_leaderboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let request = match base_request(&state, "GET", "/mobile/competition/leaderboard", &headers) {
        Ok(request) => request,
        Err(error) => return into_response(state.pipeline.error_response(&error)),
    };

    let fixtures = state.fixtures.clone();
    let response = state
        .pipeline
        .handle(&request, || async move {
            Ok(fixtures.competition_leaderboard())
        })
        .await;

    into_response(response)
}

/// Friend activity feed
pub async fn social_feed(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let request = match base_request(&state, "GET", "/mobile/social/feed", &headers) {
        Ok(request) => request,
        Err(error) => return into_response(state.pipeline.error_response(&error)),
    };

    let fixtures = state.fixtures.clone();
    let response = state
        .pipeline
        .handle(&request, || async move { Ok(fixtures.social_feed()) })
        .await;

    into_response(response)
}

/// Build the pipeline request shared by every route
///
/// A missing `Authorization` header means an anonymous caller; a present
/// but invalid one is an auth error before the pipeline runs.
fn base_request(
    state: &AppState,
    method: &str,
    path: &str,
    headers: &HeaderMap,
) -> Result<PipelineRequest, BffError> {
    let mut request = PipelineRequest::new(method, path)
        .with_headers(headers.clone())
        .with_client_ip(client_ip(headers));

    if let Some(auth_header) = headers.get("authorization").and_then(|v| v.to_str().ok()) {
        let token = TokenAuth::extract_bearer_token(auth_header)?;
        let identity = state.auth.validate_token(&token)?;
        request = request.with_user(identity.user_id);
    }

    Ok(request)
}

/// First hop of `x-forwarded-for`, falling back to loopback
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "127.0.0.1".to_string())
}

/// Convert a finished pipeline response into an axum response
fn into_response(response: PipelineResponse) -> Response {
    let PipelineResponse {
        status,
        headers,
        body,
    } = response;

    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut out = (status, Json(body)).into_response();

    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            out.headers_mut().insert(name, value);
        }
    }

    out
}
