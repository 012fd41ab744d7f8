use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::envelope::Envelope;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl AppError {
    /// Envelope shown to the client. The detail is logged, never returned;
    /// client-facing validation messages are built as envelopes directly.
    pub fn to_envelope(&self) -> Envelope {
        match self {
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "Internal error");
                Envelope::internal_error()
            }
            AppError::DatabaseError(err) => {
                tracing::error!(error = %err, "Database error");
                Envelope::internal_error()
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = %err, "Configuration error");
                Envelope::internal_error()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let envelope = self.to_envelope();
        tracing::info!(response = %envelope.to_log_string(), "response result");
        envelope.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::INTERNAL_ERROR_MESSAGE;

    #[test]
    fn config_errors_render_as_internal_error() {
        let envelope = AppError::ConfigError(anyhow::anyhow!("GOOGLE_API_KEY missing")).to_envelope();
        assert_eq!(envelope.code, -1);
        assert_eq!(envelope.error_msg, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn database_detail_is_not_exposed() {
        let envelope =
            AppError::DatabaseError(anyhow::anyhow!("connection refused on 10.0.0.3")).to_envelope();
        assert_eq!(envelope.code, -1);
        assert_eq!(envelope.error_msg, INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn io_errors_map_to_internal() {
        let err: AppError = std::io::Error::other("disk full").into();
        assert!(matches!(err, AppError::InternalError(_)));
        assert_eq!(err.to_envelope().error_msg, INTERNAL_ERROR_MESSAGE);
    }
}
