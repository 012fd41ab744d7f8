//! Mock provider implementation for testing and offline development.

use super::{ImageProvider, ProviderError};
use crate::models::{InputImage, ResponsePart};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

enum MockBehavior {
    /// Send the input image back with a short caption.
    Echo,
    /// Return these parts verbatim.
    Parts(Vec<ResponsePart>),
    /// Fail every call.
    Fail(ProviderError),
}

/// Mock image provider that records every call it receives.
pub struct MockImageProvider {
    behavior: MockBehavior,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockImageProvider {
    /// Echoes the input image.
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Echo)
    }

    pub fn with_parts(parts: Vec<ResponsePart>) -> Self {
        Self::with_behavior(MockBehavior::Parts(parts))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_behavior(MockBehavior::Fail(error))
    }

    fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Number of `generate` calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    fn model(&self) -> &str {
        "mock-image-model"
    }

    async fn generate(
        &self,
        prompt: &str,
        image: &InputImage,
    ) -> Result<Vec<ResponsePart>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        match &self.behavior {
            MockBehavior::Echo => Ok(vec![
                ResponsePart::Text(format!("Mock response for: {}", prompt)),
                ResponsePart::InlineImage {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                },
            ]),
            MockBehavior::Parts(parts) => Ok(parts.clone()),
            MockBehavior::Fail(error) => Err(error.clone()),
        }
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        match &self.behavior {
            MockBehavior::Fail(error) => Err(error.clone()),
            _ => Ok(()),
        }
    }
}
