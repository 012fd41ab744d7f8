use super::{JsonBody, ValidationError};
use crate::models::ImageOutput;
use serde::Serialize;

/// Body of `POST /api/generate_image`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// Base64 bitmap, optionally a full data URI.
    pub image: String,
}

impl GenerateImageRequest {
    /// Fields are checked in order: `prompt`, then `image`.
    pub fn from_body(bytes: &[u8]) -> Result<Self, ValidationError> {
        let body = JsonBody::parse(bytes)?;
        let prompt = body.required_str("prompt")?.to_string();
        let image = body.required_str("image")?.to_string();
        Ok(Self { prompt, image })
    }
}

/// `data` of a successful generation envelope.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateImageResponse {
    pub images: Vec<String>,
    pub count: usize,
}

impl From<ImageOutput> for GenerateImageResponse {
    fn from(output: ImageOutput) -> Self {
        let count = output.count();
        Self {
            images: output.images,
            count,
        }
    }
}
