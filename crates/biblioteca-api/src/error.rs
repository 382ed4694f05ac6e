//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use biblioteca_core::error::{AppError, ErrorKind};

/// Message shown for every backend failure.
const GENERIC_BACKEND_MESSAGE: &str = "An internal error occurred";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Always `false`.
    pub success: bool,
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Handler error. Wraps [`AppError`] so it can become a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// Status and machine code for an error kind.
    pub fn status_and_code(kind: ErrorKind) -> (StatusCode, &'static str) {
        match kind {
            ErrorKind::Validation => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ErrorKind::Authentication => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ErrorKind::Authorization => (StatusCode::FORBIDDEN, "PERMISSION_DENIED"),
            ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ErrorKind::HierarchyViolation => (StatusCode::CONFLICT, "HIERARCHY_VIOLATION"),
            ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),
            ErrorKind::ServiceUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Storage
            | ErrorKind::Configuration
            | ErrorKind::Serialization => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, code) = Self::status_and_code(err.kind);

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(kind = ?err.kind, error = %err, "Internal server error");
            GENERIC_BACKEND_MESSAGE.to_string()
        } else {
            err.message
        };

        let body = ApiErrorResponse {
            success: false,
            error: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
