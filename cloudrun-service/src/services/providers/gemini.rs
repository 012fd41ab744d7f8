//! Gemini AI provider implementation.
//!
//! Image-to-image generation over the Gemini REST API. One blocking
//! `generateContent` call per request, no retries.

use super::{ImageProvider, ProviderError};
use crate::models::{InputImage, ResponsePart};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini API base URL.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    /// Overrides [`GEMINI_API_BASE`]; used to point at a local stub.
    pub base_url: Option<String>,
}

/// Gemini image provider.
pub struct GeminiImageProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiImageProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.as_deref().unwrap_or(GEMINI_API_BASE)
    }

    /// Build the API URL for the configured model and method.
    fn api_url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.base_url(), self.config.model, method)
    }
}

/// Build the request body: the prompt first, then the image.
fn build_request(prompt: &str, image: &InputImage) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![
                RequestPart::Text {
                    text: prompt.to_string(),
                },
                RequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: general_purpose::STANDARD.encode(&image.data),
                    },
                },
            ],
        }],
    }
}

/// Flatten the first candidate into typed parts, decoding inline payloads.
fn parts_from_response(
    response: GenerateContentResponse,
) -> Result<Vec<ResponsePart>, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.as_deref())
    {
        tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Ok(Vec::new());
    };

    if let Some(reason) = candidate.finish_reason.as_deref() {
        if reason != "STOP" {
            tracing::warn!(finish_reason = %reason, "Gemini finished abnormally");
        }
    }

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let mut out = Vec::with_capacity(parts.len());
    for part in parts {
        if let Some(inline) = part.inline_data {
            let data = general_purpose::STANDARD
                .decode(inline.data.as_bytes())
                .map_err(|e| {
                    ProviderError::ApiError(format!("inline data is not valid base64: {}", e))
                })?;
            out.push(ResponsePart::InlineImage {
                mime_type: inline.mime_type,
                data,
            });
        } else if let Some(text) = part.text {
            out.push(ResponsePart::Text(text));
        }
    }

    Ok(out)
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        prompt: &str,
        image: &InputImage,
    ) -> Result<Vec<ResponsePart>, ProviderError> {
        let request = build_request(prompt, image);
        let url = self.api_url("generateContent");

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            image_bytes = image.data.len(),
            mime_type = %image.mime_type,
            "Sending request to Gemini API"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        parts_from_response(api_response)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.is_empty() {
            return Err(ProviderError::NotConfigured(
                "Gemini API key not configured".to_string(),
            ));
        }

        let url = format!("{}/models/{}", self.base_url(), self.config.model);

        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::ApiError(format!(
                "Health check failed: {}",
                response.status()
            )))
        }
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content<RequestPart>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content<P> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default = "Vec::new")]
    parts: Vec<P>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(alias = "mime_type")]
    mime_type: String,
    data: String,
}

/// Response parts may carry extra fields (e.g. thought signatures), so every
/// field is optional rather than an untagged enum.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePartDto {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "inline_data")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content<ResponsePartDto>>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
