//! Image-to-image generation: decode the client image, call the provider,
//! normalise every returned image to base64 PNG.

use crate::models::{ImageOutput, InputImage, ResponsePart};
use crate::services::metrics;
use crate::services::providers::{ImageProvider, ProviderError};
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    /// The client payload is not base64 or not a readable bitmap.
    #[error("invalid image data: {0}")]
    InvalidImageData(String),

    /// The provider call failed; the message stays in the logs.
    #[error("image generation service error: {0}")]
    ServiceError(#[from] ProviderError),

    /// The provider answered but returned no image parts.
    #[error("no image generated")]
    NoImageGenerated,

    /// The provider returned an image part we could not decode.
    #[error("generated image could not be decoded: {0}")]
    UnreadableOutput(String),
}

impl ImageError {
    /// Metric label for this outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            ImageError::InvalidImageData(_) => "invalid_image",
            ImageError::ServiceError(_) => "service_error",
            ImageError::NoImageGenerated => "no_image",
            ImageError::UnreadableOutput(_) => "unreadable_output",
        }
    }
}

/// Drop a data-URI header (`data:image/png;base64,`) if present.
///
/// Everything up to and including the first comma is discarded.
pub fn strip_data_uri_prefix(raw: &str) -> &str {
    raw.split_once(',').map(|(_, payload)| payload).unwrap_or(raw)
}

/// Decode a client-supplied base64 image and check that it is a bitmap.
pub fn decode_input_image(raw: &str) -> Result<InputImage, ImageError> {
    let payload: String = strip_data_uri_prefix(raw)
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let data = general_purpose::STANDARD
        .decode(payload.as_bytes())
        .map_err(|e| ImageError::InvalidImageData(format!("base64: {}", e)))?;

    let format = image::guess_format(&data)
        .map_err(|e| ImageError::InvalidImageData(format!("unknown format: {}", e)))?;

    image::load_from_memory_with_format(&data, format)
        .map_err(|e| ImageError::InvalidImageData(format!("decode: {}", e)))?;

    Ok(InputImage {
        mime_type: format.to_mime_type().to_string(),
        data,
    })
}

/// Re-encode any supported bitmap as PNG and base64 it.
pub fn encode_png_base64(data: &[u8]) -> Result<String, ImageError> {
    let decoded =
        image::load_from_memory(data).map_err(|e| ImageError::UnreadableOutput(e.to_string()))?;

    let mut buffer = Cursor::new(Vec::new());
    decoded
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| ImageError::UnreadableOutput(e.to_string()))?;

    Ok(general_purpose::STANDARD.encode(buffer.get_ref()))
}

/// Keep the image parts in order, log the text parts.
pub fn collect_images(parts: Vec<ResponsePart>) -> Result<ImageOutput, ImageError> {
    let mut output = ImageOutput::default();

    for part in parts {
        match part {
            ResponsePart::Text(text) => {
                tracing::info!(text = %text, "Model returned text");
            }
            ResponsePart::InlineImage { mime_type, data } => {
                tracing::debug!(mime_type = %mime_type, bytes = data.len(), "Model returned image");
                output.images.push(encode_png_base64(&data)?);
            }
        }
    }

    if output.is_empty() {
        return Err(ImageError::NoImageGenerated);
    }

    Ok(output)
}

#[derive(Clone)]
pub struct ImageGenerator {
    provider: Arc<dyn ImageProvider>,
}

impl ImageGenerator {
    pub fn new(provider: Arc<dyn ImageProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn ImageProvider> {
        &self.provider
    }

    /// Run one generation. The provider is not called when the input image
    /// cannot be decoded.
    #[tracing::instrument(skip_all, fields(model = %self.provider.model(), prompt_len = prompt.len()))]
    pub async fn generate(&self, prompt: &str, image_base64: &str) -> Result<ImageOutput, ImageError> {
        let image = decode_input_image(image_base64)?;

        let start = Instant::now();
        let result = self.provider.generate(prompt, &image).await;
        metrics::observe_provider_latency(start.elapsed());

        let parts = result.map_err(|e| {
            tracing::error!(error = %e, "Image provider call failed");
            ImageError::ServiceError(e)
        })?;

        let output = collect_images(parts)?;
        tracing::info!(count = output.count(), "Images generated");
        Ok(output)
    }
}
