use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::Method,
    response::{IntoResponse, Response},
};
use service_core::envelope::Envelope;
use service_core::error::AppError;

use super::respond;
use crate::dtos::{GenerateImageRequest, GenerateImageResponse, ValidationError};
use crate::services::{metrics, ImageError};
use crate::startup::AppState;

pub const ONLY_POST_MESSAGE: &str = "only POST requests are supported";
pub const INVALID_IMAGE_MESSAGE: &str = "invalid image data";
pub const SERVICE_ERROR_MESSAGE: &str = "image generation service error";
pub const NO_IMAGE_MESSAGE: &str = "no image generated";

/// Image-to-image generation: `{prompt, image}` in, `{images, count}` out.
#[tracing::instrument(skip(state, body))]
pub async fn generate_image(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    if method != Method::POST {
        return respond(Ok(Envelope::error(ONLY_POST_MESSAGE)));
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(error = %rejection, "Failed to read request body");
            metrics::record_image_outcome("invalid_request");
            return respond(Ok(ValidationError::UnreadableBody.into()));
        }
    };

    let request = match GenerateImageRequest::from_body(&body) {
        Ok(request) => request,
        Err(err) => {
            metrics::record_image_outcome("invalid_request");
            return respond(Ok(err.into()));
        }
    };

    tracing::info!(
        prompt = %request.prompt,
        image_chars = request.image.len(),
        "generate_image req"
    );

    match state
        .image_generator
        .generate(&request.prompt, &request.image)
        .await
    {
        Ok(output) => {
            metrics::record_image_outcome("success");
            let count = output.count();
            match serde_json::to_value(GenerateImageResponse::from(output)) {
                Ok(data) => {
                    // Success payloads are megabytes of base64; log the shape only.
                    tracing::info!(code = 0, count, "response result");
                    Envelope::ok(data).into_response()
                }
                Err(e) => respond(Err(AppError::InternalError(e.into()))),
            }
        }
        Err(err) => {
            metrics::record_image_outcome(err.outcome());
            respond(image_error_envelope(err))
        }
    }
}

fn image_error_envelope(err: ImageError) -> Result<Envelope, AppError> {
    match err {
        ImageError::InvalidImageData(detail) => {
            tracing::warn!(detail = %detail, "Image decoding failed");
            Ok(Envelope::error(INVALID_IMAGE_MESSAGE))
        }
        ImageError::ServiceError(e) => {
            tracing::error!(error = %e, "Image generation service failed");
            Ok(Envelope::error(SERVICE_ERROR_MESSAGE))
        }
        ImageError::NoImageGenerated => Ok(Envelope::error(NO_IMAGE_MESSAGE)),
        ImageError::UnreadableOutput(detail) => Err(AppError::InternalError(anyhow::anyhow!(
            "generated image could not be decoded: {}",
            detail
        ))),
    }
}
