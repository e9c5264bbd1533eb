//! Application error types with Axum response mapping.
//!
//! Each variant maps to a specific HTTP status + `{"error": ...}` body.
//! Diagnostic detail stays in logs; bodies only carry the fixed message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::calculator::CalcError;
use crate::types::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid JSON")]
    InvalidJson,

    #[error("Request body too large")]
    BodyTooLarge,

    #[error(
        "Invalid parameters. Expected: {{a: number, b: number, operation: \"+\" | \"-\" | \"*\" | \"/\"}}"
    )]
    InvalidParameters,

    #[error("Division by zero is not allowed")]
    DivisionByZero,

    #[error("Result is not a finite number")]
    NonFiniteResult,

    #[error("Authentication token required for this operation")]
    AuthenticationRequired,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson
            | AppError::BodyTooLarge
            | AppError::InvalidParameters
            | AppError::DivisionByZero
            | AppError::NonFiniteResult => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".into(),
            other => other.to_string(),
        }
    }
}

impl From<CalcError> for AppError {
    fn from(err: CalcError) -> Self {
        match err {
            CalcError::DivisionByZero => AppError::DivisionByZero,
            CalcError::NonFinite => AppError::NonFiniteResult,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Internal(detail) = &self {
            tracing::error!(%detail, "internal error while handling request");
        }
        let body = ErrorResponse {
            error: self.public_message(),
        };
        (self.status(), axum::Json(body)).into_response()
    }
}
