//! Image generation provider abstractions and implementations.
//!
//! Providers take a prompt plus one input image and return the raw response
//! parts in order. Interpreting those parts is the generator's job.

pub mod gemini;
pub mod mock;

use crate::models::{InputImage, ResponsePart};
use async_trait::async_trait;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),
}

/// Trait for image-to-image generation providers (e.g., Gemini).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Model identifier every call is made against.
    fn model(&self) -> &str;

    /// Send `[prompt, image]` to the model and return its response parts.
    async fn generate(
        &self,
        prompt: &str,
        image: &InputImage,
    ) -> Result<Vec<ResponsePart>, ProviderError>;

    /// Health check.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
