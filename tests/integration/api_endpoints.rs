//! HTTP read surface over a live server

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Utc;
use messenger_status::api::{ApiConfig, ApiState, StatusResponse, spawn_api_server};
use messenger_status::monitors::health::{HealthState, ServerStatus};
use messenger_status::tokens::{AuthTokenService, PASSWORD_RESET, PASSWORD_RESET_LIFETIME};
use messenger_status::{SnapshotState, StatsSnapshot};
use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

struct TestApi {
    base: String,
    snapshots: Arc<SnapshotState>,
    tokens: Arc<AuthTokenService>,
    cancel: CancellationToken,
}

impl Drop for TestApi {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn start(auth_token: Option<&str>) -> TestApi {
    let snapshots = Arc::new(SnapshotState::new());
    let tokens = Arc::new(AuthTokenService::new());
    let cancel = CancellationToken::new();
    let config = ApiConfig {
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        auth_token: auth_token.map(str::to_string),
        enable_cors: true,
    };

    let addr = spawn_api_server(config, ApiState::new(snapshots.clone(), tokens.clone()), cancel.clone())
        .await
        .unwrap();

    TestApi {
        base: format!("http://{addr}/api/v1"),
        snapshots,
        tokens,
        cancel,
    }
}

#[tokio::test]
async fn test_health() {
    let api = start(None).await;

    let response = reqwest::get(format!("{}/health", api.base)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_status_unknown_until_published() {
    let api = start(None).await;

    let body: StatusResponse = reqwest::get(format!("{}/status", api.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.state, HealthState::Unknown);
    assert!(body.last_updated.is_none());

    api.snapshots
        .publish_status(ServerStatus::new(HealthState::Ok, Utc::now()));

    let body: StatusResponse = reqwest::get(format!("{}/status", api.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.state, HealthState::Ok);
    assert!(body.last_updated.is_some());
}

#[tokio::test]
async fn test_stats_unavailable_until_published() {
    let api = start(None).await;

    let response = reqwest::get(format!("{}/stats", api.base)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let snapshot = StatsSnapshot {
        logged_in_count: 5,
        by_hour: vec![],
        generated_at: Utc::now(),
    };
    api.snapshots.publish_stats(snapshot.clone());

    let response = reqwest::get(format!("{}/stats", api.base)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: StatsSnapshot = response.json().await.unwrap();
    assert_eq!(body, snapshot);
}

#[tokio::test]
async fn test_auth_token_required_when_configured() {
    let api = start(Some("secret")).await;
    let client = reqwest::Client::new();
    let url = format!("{}/status", api.base);

    let missing = client.get(&url).send().await.unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let malformed = client
        .get(&url)
        .header("Authorization", "Token secret")
        .send()
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::UNAUTHORIZED);

    let wrong = client.get(&url).bearer_auth("nope").send().await.unwrap();
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let ok = client.get(&url).bearer_auth("secret").send().await.unwrap();
    assert_eq!(ok.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_link_check_uses_shared_registry() {
    let api = start(None).await;
    let token = api
        .tokens
        .create_token(PASSWORD_RESET, "a@example.com", PASSWORD_RESET_LIFETIME);

    let response = reqwest::get(format!("{}/password-reset/{token}", api.base))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["valid"], true);
    assert!(body.get("subject").is_none());

    // Checking does not consume the token
    assert!(api.tokens.get_token(PASSWORD_RESET, &token).is_some());

    api.tokens.pop_token(PASSWORD_RESET, &token);
    let response = reqwest::get(format!("{}/password-reset/{token}", api.base))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_link_check_rejects_other_purposes() {
    let api = start(None).await;
    let token = api
        .tokens
        .create_token("verify", "a@example.com", PASSWORD_RESET_LIFETIME);

    let response = reqwest::get(format!("{}/password-reset/{token}", api.base))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
