//! HTTP handlers for cloudrun-service.

pub mod app;
pub mod counter;
pub mod image;
pub mod metrics;

pub use app::{health_check, index, readiness_check};
pub use counter::counter;
pub use image::generate_image;

use axum::response::{IntoResponse, Response};
use service_core::envelope::Envelope;
use service_core::error::AppError;

/// Turn a handler outcome into the envelope response, logging it on the way.
pub(crate) fn respond(result: Result<Envelope, AppError>) -> Response {
    match result {
        Ok(envelope) => {
            if envelope.is_success() {
                tracing::info!(response = %envelope.to_log_string(), "response result");
            } else {
                tracing::warn!(response = %envelope.to_log_string(), "response result");
            }
            envelope.into_response()
        }
        // AppError logs its own detail and the envelope it renders.
        Err(err) => err.into_response(),
    }
}
