use askama::Template;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::startup::AppState;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub service_version: &'static str,
}

pub async fn index() -> impl IntoResponse {
    IndexTemplate {
        service_version: env!("CARGO_PKG_VERSION"),
    }
}

/// Health check endpoint for liveness probes.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.counter_store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "cloudrun-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": "cloudrun-service",
                "error": e.to_string()
            })),
        ),
    }
}

/// Readiness check endpoint for readiness probes. Unlike liveness it also
/// checks the image provider.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.counter_store.health_check().await.is_err() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }

    match state.image_generator.provider().health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Image provider is not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
