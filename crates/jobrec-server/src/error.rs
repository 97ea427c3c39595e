//! HTTP error responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level error type.
/// Implements `IntoResponse` so handlers can return `Result<T, AppError>`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request body could not be parsed into the expected shape
    #[error("invalid request: {message}")]
    InvalidRequest { status: StatusCode, message: String },

    /// Classification failed after the request was accepted
    #[error(transparent)]
    Classification(#[from] jobrec_core::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest { status, .. } => *status,
            AppError::Classification(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidRequest { .. } => "invalid_request_error",
            AppError::Classification(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let metric_kind = match &self {
            AppError::InvalidRequest { .. } => "invalid_request",
            AppError::Classification(err) => err.kind(),
        };
        metrics::counter!("jobrec_errors_total", "kind" => metric_kind).increment(1);

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": self.kind(),
            }
        });

        (status, Json(body)).into_response()
    }
}
