use axum::{http::StatusCode, response::IntoResponse};

pub async fn metrics() -> impl IntoResponse {
    match crate::services::metrics::get_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, String::new())
        }
    }
}
