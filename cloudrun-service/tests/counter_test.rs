mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn fresh_counter_reads_zero() {
    let app = TestApp::spawn();

    let (status, body) = app.get("/api/count").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"], 0);
    assert_eq!(body["errorMsg"], "");
    assert!(!app.store.exists().await);
}

#[tokio::test]
async fn increments_are_sequential() {
    let app = TestApp::spawn();

    for expected in 1..=3 {
        let (_, body) = app.post_json("/api/count", json!({"action": "inc"})).await;
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"], expected);
    }

    let (_, body) = app.get("/api/count").await;
    assert_eq!(body["data"], 3);
}

#[tokio::test]
async fn clear_resets_and_next_increment_starts_at_one() {
    let app = TestApp::spawn();
    app.post_json("/api/count", json!({"action": "inc"})).await;
    app.post_json("/api/count", json!({"action": "inc"})).await;

    let (_, body) = app.post_json("/api/count", json!({"action": "clear"})).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"], 0);
    assert!(!app.store.exists().await);

    let (_, body) = app.get("/api/count").await;
    assert_eq!(body["data"], 0);

    let (_, body) = app.post_json("/api/count", json!({"action": "inc"})).await;
    assert_eq!(body["data"], 1);
}

#[tokio::test]
async fn clear_on_fresh_counter_succeeds() {
    let app = TestApp::spawn();

    let (_, body) = app.post_json("/api/count", json!({"action": "clear"})).await;

    assert_eq!(body["code"], 0);
    assert_eq!(body["data"], 0);
}

#[tokio::test]
async fn missing_action_is_rejected() {
    let app = TestApp::spawn();

    let (status, body) = app.post_json("/api/count", json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], -1);
    assert_eq!(body["errorMsg"], "missing action parameter");
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn unknown_action_is_rejected_without_touching_the_counter() {
    let app = TestApp::spawn();
    app.post_json("/api/count", json!({"action": "inc"})).await;

    for action in [json!("foo"), json!("INC"), json!(1), json!(null)] {
        let (_, body) = app.post_json("/api/count", json!({"action": action})).await;
        assert_eq!(body["code"], -1);
        assert_eq!(body["errorMsg"], "invalid action parameter");
    }

    let (_, body) = app.get("/api/count").await;
    assert_eq!(body["data"], 1);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = TestApp::spawn();

    let (status, body) = app.post("/api/count", "{\"action\": ").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], -1);
    assert_eq!(body["errorMsg"], "malformed JSON body");
}

#[tokio::test]
async fn other_methods_are_invalid() {
    let app = TestApp::spawn();

    for method in [Method::PUT, Method::DELETE, Method::PATCH] {
        let (status, body) = app.request(method, "/api/count", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], -1);
        assert_eq!(body["errorMsg"], "invalid request method");
    }
}

#[tokio::test]
async fn get_ignores_any_body() {
    let app = TestApp::spawn();

    let (_, body) = app
        .request(Method::GET, "/api/count", "{\"action\": \"inc\"}")
        .await;

    assert_eq!(body["data"], 0);
}
