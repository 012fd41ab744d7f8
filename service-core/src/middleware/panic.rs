use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::envelope::Envelope;

/// Panic handler for `tower_http::catch_panic::CatchPanicLayer`.
///
/// The panic payload is logged; the caller only sees the generic internal
/// error envelope.
pub fn panic_to_envelope(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "Request handler panicked");

    Envelope::internal_error().into_response()
}
