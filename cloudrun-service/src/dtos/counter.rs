use super::{JsonBody, ValidationError};
use crate::models::CounterAction;
use serde_json::Value;

/// Body of `POST /api/count`: `{"action": "inc" | "clear"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterRequest {
    pub action: CounterAction,
}

impl CounterRequest {
    pub fn from_body(bytes: &[u8]) -> Result<Self, ValidationError> {
        let body = JsonBody::parse(bytes)?;

        let action = match body.field("action") {
            None => return Err(ValidationError::MissingField("action")),
            Some(Value::String(name)) => CounterAction::from_wire(name),
            Some(_) => None,
        }
        .ok_or(ValidationError::InvalidField("action"))?;

        Ok(Self { action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_actions_parse() {
        assert_eq!(
            CounterRequest::from_body(br#"{"action":"inc"}"#).unwrap().action,
            CounterAction::Increment
        );
        assert_eq!(
            CounterRequest::from_body(br#"{"action":"clear","extra":1}"#)
                .unwrap()
                .action,
            CounterAction::Clear
        );
    }

    #[test]
    fn empty_object_is_missing_action() {
        assert_eq!(
            CounterRequest::from_body(b"{}").unwrap_err(),
            ValidationError::MissingField("action")
        );
    }

    #[test]
    fn unknown_or_non_string_action_is_invalid() {
        for body in [r#"{"action":"foo"}"#, r#"{"action":1}"#, r#"{"action":null}"#] {
            assert_eq!(
                CounterRequest::from_body(body.as_bytes()).unwrap_err(),
                ValidationError::InvalidField("action")
            );
        }
    }
}
