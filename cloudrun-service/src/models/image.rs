//! Request-scoped image payloads. Nothing here is persisted.

/// A decoded client image, ready to be sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputImage {
    /// MIME type detected from the bytes, e.g. `image/png`.
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// One unit of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePart {
    /// Commentary from the model. Logged, never returned.
    Text(String),
    /// Raw image bytes as produced by the model.
    InlineImage { mime_type: String, data: Vec<u8> },
}

/// Generated images, base64-encoded PNGs in provider order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOutput {
    pub images: Vec<String>,
}

impl ImageOutput {
    pub fn count(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
