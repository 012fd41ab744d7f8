use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
    response::Response,
};
use service_core::envelope::Envelope;
use service_core::error::AppError;

use super::respond;
use crate::dtos::{CounterRequest, ValidationError};
use crate::models::CounterAction;
use crate::services::metrics;
use crate::startup::AppState;

pub const INVALID_METHOD_MESSAGE: &str = "invalid request method";

/// `GET` reads the counter, `POST {"action": ...}` increments or clears it.
#[tracing::instrument(skip(state, body))]
pub async fn counter(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let result = match method {
        Method::GET => get_count(&state).await,
        Method::POST => match body {
            Ok(body) => update_count(&state, &body).await,
            Err(rejection) => {
                tracing::warn!(error = %rejection, "Failed to read request body");
                Ok(ValidationError::UnreadableBody.into())
            }
        },
        _ => Ok(Envelope::error(INVALID_METHOD_MESSAGE)),
    };

    respond(result)
}

async fn get_count(state: &AppState) -> Result<Envelope, AppError> {
    let count = state.counter_store.read().await;
    metrics::record_counter_operation("read", count.is_ok());
    Ok(Envelope::ok(count?))
}

async fn update_count(state: &AppState, body: &[u8]) -> Result<Envelope, AppError> {
    tracing::info!(body = %String::from_utf8_lossy(body), "update_count req");

    let request = match CounterRequest::from_body(body) {
        Ok(request) => request,
        Err(err) => return Ok(err.into()),
    };

    match request.action {
        CounterAction::Increment => {
            let count = state.counter_store.increment().await;
            metrics::record_counter_operation(request.action.as_str(), count.is_ok());
            Ok(Envelope::ok(count?))
        }
        CounterAction::Clear => {
            let cleared = state.counter_store.clear().await;
            metrics::record_counter_operation(request.action.as_str(), cleared.is_ok());
            cleared?;
            Ok(Envelope::ok(0))
        }
    }
}
