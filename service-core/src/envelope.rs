//! Uniform JSON response envelope.
//!
//! Every endpoint answers with `{code, data, errorMsg}`: `code == 0` carries
//! `data`, `code == -1` carries a human-readable `errorMsg`. The HTTP status is
//! always 200; clients branch on `code`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SUCCESS_CODE: i32 = 0;
pub const ERROR_CODE: i32 = -1;

/// Message returned for any failure whose detail must stay server-side.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(rename = "errorMsg", default)]
    pub error_msg: String,
}

impl Envelope {
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            code: SUCCESS_CODE,
            data: Some(data.into()),
            error_msg: String::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: ERROR_CODE,
            data: None,
            error_msg: message.into(),
        }
    }

    pub fn internal_error() -> Self {
        Self::error(INTERNAL_ERROR_MESSAGE)
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Serialized form used when logging the outcome of a request.
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable envelope: {}>", e))
    }
}

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_serializes_code_and_data() {
        let value = serde_json::to_value(Envelope::ok(3)).unwrap();
        assert_eq!(value, json!({ "code": 0, "data": 3, "errorMsg": "" }));
    }

    #[test]
    fn error_envelope_omits_data() {
        let value = serde_json::to_value(Envelope::error("missing action parameter")).unwrap();
        assert_eq!(
            value,
            json!({ "code": -1, "errorMsg": "missing action parameter" })
        );
    }

    #[test]
    fn envelope_round_trips_from_client_json() {
        let envelope: Envelope = serde_json::from_str(r#"{"code":0,"data":{"count":1}}"#).unwrap();
        assert!(envelope.is_success());
        assert_eq!(envelope.data, Some(json!({ "count": 1 })));
        assert!(envelope.error_msg.is_empty());
    }
}
