//! Integration tests for the mobile API server
//!
//! Each test spawns the server on its own port and drives it with a
//! real HTTP client, asserting on the envelope shape and the mobile
//! optimization headers.

use reqwest::{Client, StatusCode};
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

use stride::api::server::{ApiServer, ApiServerConfig};

/// Test helper to start the API server in the background
async fn start_test_server(port: u16) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let config = ApiServerConfig {
            host: "127.0.0.1".to_string(),
            port,
            jwt_secret: "test_secret_key_12345".to_string(),
            ..ApiServerConfig::default()
        };

        let server = ApiServer::new(config);
        let _ = server.start().await;
    })
}

#[tokio::test]
async fn test_health_check() {
    let port = 8091;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/mobile/health", port))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn test_login_issues_token() {
    let port = 8092;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    let client = Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{}/mobile/auth/login", port))
        .json(&json!({
            "email": "runner@example.com",
            "password": "testpass"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    // Success envelope with data and meta
    assert!(body["data"]["accessToken"].is_string());
    assert_eq!(body["data"]["userId"], "user-runner");
    assert_eq!(body["meta"]["version"], "1.0");
    assert!(body["meta"]["timestamp"].is_i64());
}

#[tokio::test]
async fn test_login_empty_credentials_rejected() {
    let port = 8093;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    let client = Client::new();
    let response = client
        .post(format!("http://127.0.0.1:{}/mobile/auth/login", port))
        .json(&json!({"email": "", "password": ""}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["statusCode"], 400);
    assert!(body["error"]["message"].is_string());
    assert_eq!(body["meta"]["version"], "1.0");
}

#[tokio::test]
async fn test_stats_envelope_and_optimization_headers() {
    let port = 8094;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/mobile/exercise/stats", port))
        .header("x-battery-level", "10")
        .header("x-network-type", "wifi")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-battery-optimization-applied")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    assert_eq!(
        response
            .headers()
            .get("x-network-optimization-applied")
            .and_then(|v| v.to_str().ok()),
        Some("false")
    );

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["meta"]["version"], "1.0");
    // Internal fields never cross the BFF boundary
    assert!(body["data"].get("internalId").is_none());
    assert!(body["data"].get("rawData").is_none());
    // Date strings arrive as epoch milliseconds
    assert!(body["data"]["lastSessionAt"].is_i64());
}

#[tokio::test]
async fn test_second_identical_request_is_cache_hit() {
    let port = 8095;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    let client = Client::new();
    let url = format!(
        "http://127.0.0.1:{}/mobile/exercise/templates?category=strength",
        port
    );

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert!(first.headers().get("x-cache-hit").is_none());
    let first_body: serde_json::Value = first.json().await.unwrap();

    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        second
            .headers()
            .get("x-cache-hit")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    // The cached envelope is returned verbatim, timestamp included.
    let second_body: serde_json::Value = second.json().await.unwrap();
    assert_eq!(first_body, second_body);
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let port = 8096;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/mobile/exercise/stats", port))
        .header("authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["statusCode"], 401);
}

#[tokio::test]
async fn test_session_create_requires_auth() {
    let port = 8097;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    let client = Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    // Anonymous write is rejected
    let response = client
        .post(format!("{}/mobile/exercise/sessions", base))
        .json(&json!({"templateId": "tpl-1", "durationMinutes": 30}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Log in, then the same write succeeds
    let login: serde_json::Value = client
        .post(format!("{}/mobile/auth/login", base))
        .json(&json!({"email": "runner@example.com", "password": "pw"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = login["data"]["accessToken"].as_str().unwrap();

    let response = client
        .post(format!("{}/mobile/exercise/sessions", base))
        .header("authorization", format!("Bearer {}", token))
        .json(&json!({"templateId": "tpl-1", "durationMinutes": 30}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["userId"], "user-runner");
    assert!(body["data"]["id"].is_string());
}

#[tokio::test]
async fn test_low_battery_slow_cellular_feed_fully_optimized() {
    let port = 8098;
    let _server_handle = start_test_server(port).await;
    sleep(Duration::from_secs(1)).await;

    // Low battery on a slow cellular link: both dimensions go
    // aggressive, so animation and polling overrides apply on top of
    // the network-side pagination and null omission.
    let client = Client::new();
    let response = client
        .get(format!("http://127.0.0.1:{}/mobile/social/feed", port))
        .header("x-battery-level", "10")
        .header("x-network-type", "cellular")
        .header("x-network-effective-type", "slow-2g")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-battery-optimization-applied")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
    assert_eq!(
        response
            .headers()
            .get("x-network-optimization-applied")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    let body: serde_json::Value = response.json().await.unwrap();
    let items = body["data"].as_array().unwrap();
    assert!(items.len() <= 10);

    for item in items {
        assert_eq!(item["animations"], json!(false));
        assert!(item["pollingInterval"].as_i64().unwrap() >= 5000);
        // Null fields are omitted entirely.
        assert!(item.get("comment").map_or(true, |c| !c.is_null()));
    }
}
