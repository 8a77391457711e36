use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::engine::EngineError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct OkBody {
    pub success: bool,
}

impl Default for OkBody {
    fn default() -> Self {
        Self { success: true }
    }
}

/// Application error type
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn internal(message: &str) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownInstrument => Self::not_found("instrument not found"),
            EngineError::NotFound => Self::not_found("not found"),
            EngineError::InsufficientFunds => {
                Self::new(StatusCode::BAD_REQUEST, "INSUFFICIENT_FUNDS", "insufficient funds")
            }
            EngineError::Duplicate => {
                Self::new(StatusCode::BAD_REQUEST, "DUPLICATE", "already exists")
            }
            EngineError::Conflict => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFLICT",
                "operation conflicted, please retry",
            ),
            EngineError::Validation(message) => Self::bad_request(&message),
            EngineError::Internal(message) => {
                tracing::error!("engine invariant violation: {}", message);
                Self::internal("internal error")
            }
            EngineError::Database(err) => {
                tracing::error!("database error: {}", err);
                Self::internal("internal error")
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            &err.to_string(),
        )
    }
}
