//! Error types for the HTTP handlers.
//!
//! Bridges the engine's typed errors to HTTP responses with stable error
//! codes, implementing Axum's `IntoResponse` trait.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portgate_core::{AdmissionError, DeniedReason, EngineError};
use serde::Serialize;

/// Application error type for the HTTP handlers.
///
/// Wraps engine errors into HTTP-friendly responses with a stable `code`
/// clients can branch on.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    code: String,
}

impl ApiError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into(), "NOT_FOUND".to_string())
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL".to_string(),
        )
    }

    /// The HTTP status this error maps to
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

/// JSON body returned for every error response
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = %self.code, message = %self.message, "request failed");
        }
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::CapacityExceeded => Self::new(
                StatusCode::CONFLICT,
                err.to_string(),
                "CAPACITY_EXCEEDED".to_string(),
            ),
            EngineError::InvalidTransition { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                err.to_string(),
                "INVALID_TRANSITION".to_string(),
            ),
            EngineError::NotFound => Self::not_found("booking or slot not found"),
            EngineError::Validation(message) => Self::bad_request(message),
            EngineError::Storage(inner) => Self::internal(inner.to_string()),
        }
    }
}

impl From<AdmissionError> for ApiError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::Denied(reason) => {
                let status = match reason {
                    DeniedReason::NotFound => StatusCode::NOT_FOUND,
                    _ => StatusCode::FORBIDDEN,
                };
                Self::new(
                    status,
                    reason.to_string(),
                    format!("DENIED_{}", reason.code().to_uppercase().replace('-', "_")),
                )
            }
            AdmissionError::Storage(inner) => Self::internal(inner.to_string()),
        }
    }
}
