//! Error types for the document manager.
//!
//! Uses thiserror for ergonomic error definitions that integrate
//! with axum's response system.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::models::ValidationErrors;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    // Storage errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 404
            Self::NotFound(_) => StatusCode::NOT_FOUND,

            // 400
            Self::Validation(_) | Self::InvalidInput(_) => StatusCode::BAD_REQUEST,

            // 413
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,

            // 500
            Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the storage layer rejected a write on a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => db.is_unique_violation(),
            _ => false,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            // Missing and soft-deleted rows look the same: no body.
            Self::NotFound(message) => {
                tracing::debug!("{}", message);
                status.into_response()
            }
            Self::Validation(errors) => {
                tracing::debug!("Validation failed: {}", errors);
                (status, Json(errors)).into_response()
            }
            other => {
                if status.is_server_error() {
                    tracing::error!("Request failed: {}", other);
                }

                let body = Json(json!({
                    "error": {
                        "code": other.error_code(),
                        "message": other.to_string(),
                    }
                }));

                (status, body).into_response()
            }
        }
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

// Convenience conversions
impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        // A body cut off by the size limit surfaces here as a buffering failure.
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(rejection.body_text())
        } else {
            Self::InvalidInput(rejection.body_text())
        }
    }
}
