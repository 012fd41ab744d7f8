//! Probe, index and metrics endpoints.

mod common;

use axum::http::StatusCode;
use cloudrun_service::config::CloudrunConfig;
use cloudrun_service::services::providers::ProviderError;
use cloudrun_service::startup::Application;
use common::TestApp;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn health_check_reports_ok() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "cloudrun-service");
}

#[tokio::test]
async fn readiness_check_returns_ok() {
    let app = TestApp::spawn();

    let (status, _, _) = app.get_raw("/ready").await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn index_page_is_html() {
    let app = TestApp::spawn();

    let (status, content_type, body) = app.get_raw("/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/html"));
    assert!(body.contains("/api/count"));
    assert!(body.contains(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn metrics_expose_request_counters() {
    let app = TestApp::spawn();
    app.post_json("/api/count", json!({"action": "inc"})).await;

    let (status, _, body) = app.get_raw("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("http_requests_total"));
    assert!(body.contains("counter_operations_total"));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn();

    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        axum::http::Request::builder()
            .uri("/api/count")
            .header("x-request-id", "req-123")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    assert_eq!(response.headers()["x-request-id"], "req-123");
}

#[tokio::test]
async fn application_serves_over_tcp() {
    let app = Application::build(CloudrunConfig::in_memory())
        .await
        .expect("Failed to build application");
    let port = app.http_port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/api/count", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn readiness_fails_when_provider_is_down() {
    let app = TestApp::failing(ProviderError::NetworkError("unreachable".to_string()));

    let (status, _, _) = app.get_raw("/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Liveness only depends on the counter store.
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
}
