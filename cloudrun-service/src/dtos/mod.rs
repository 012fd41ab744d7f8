//! Request bodies and their validation.
//!
//! Bodies are parsed from raw bytes so that a syntax error surfaces as an
//! envelope instead of an extractor rejection.

pub mod counter;
pub mod image;

pub use counter::CounterRequest;
pub use image::{GenerateImageRequest, GenerateImageResponse};

use serde_json::{Map, Value};
use service_core::envelope::Envelope;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed JSON body")]
    MalformedJson,

    #[error("request body could not be read")]
    UnreadableBody,

    #[error("missing {0} parameter")]
    MissingField(&'static str),

    #[error("invalid {0} parameter")]
    InvalidField(&'static str),
}

impl From<ValidationError> for Envelope {
    fn from(err: ValidationError) -> Self {
        Envelope::error(err.to_string())
    }
}

/// A request body that is known to be a JSON object.
#[derive(Debug)]
pub struct JsonBody(Map<String, Value>);

impl JsonBody {
    pub fn parse(bytes: &[u8]) -> Result<Self, ValidationError> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) | Err(_) => Err(ValidationError::MalformedJson),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// A field that must be present and hold a string.
    pub fn required_str(&self, name: &'static str) -> Result<&str, ValidationError> {
        match self.field(name) {
            None => Err(ValidationError::MissingField(name)),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ValidationError::InvalidField(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_and_non_objects_are_malformed() {
        assert_eq!(JsonBody::parse(b"{").unwrap_err(), ValidationError::MalformedJson);
        assert_eq!(JsonBody::parse(b"").unwrap_err(), ValidationError::MalformedJson);
        assert_eq!(JsonBody::parse(b"[1,2]").unwrap_err(), ValidationError::MalformedJson);
    }

    #[test]
    fn required_str_distinguishes_missing_from_wrong_type() {
        let body = JsonBody::parse(br#"{"prompt": 3}"#).unwrap();
        assert_eq!(
            body.required_str("prompt").unwrap_err(),
            ValidationError::InvalidField("prompt")
        );
        assert_eq!(
            body.required_str("image").unwrap_err(),
            ValidationError::MissingField("image")
        );
    }

    #[test]
    fn validation_errors_render_client_messages() {
        let envelope: Envelope = ValidationError::MissingField("action").into();
        assert_eq!(envelope.code, -1);
        assert_eq!(envelope.error_msg, "missing action parameter");
    }
}
