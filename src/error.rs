//! Domain error types for the dashboard auth server.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.

use actix_web::{HttpResponse, ResponseError};
use std::fmt;

use crate::oauth::ProviderError;
use crate::store::StoreError;

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Resource not found
    #[error("{0} not found")]
    NotFound(String),

    /// Source exists but cannot hold roles
    #[error("Source {0} does not have role capability")]
    MissingRoleCapability(i64),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource with the same identity already exists
    #[error("{0}")]
    AlreadyExists(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Principal resolution against an OAuth provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status, error_code, response_message) = match self {
            AppError::NotFound(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                self.to_string(),
            ),
            AppError::MissingRoleCapability(_) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NO_ROLE_CAPABILITY",
                self.to_string(),
            ),
            AppError::InvalidInput(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "INVALID_INPUT",
                self.to_string(),
            ),
            AppError::AlreadyExists(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "ALREADY_EXISTS",
                self.to_string(),
            ),
            AppError::Unauthorized(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                self.to_string(),
            ),
            // Details were logged where resolution failed; the client only
            // learns that login was refused.
            AppError::Provider(_) => (
                actix_web::http::StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Authentication failed".to_string(),
            ),
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: error_code.to_string(),
            message: response_message,
        })
    }
}

/// Error response body matching OpenAPI schema.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

// Conversion implementations for common error types

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(name) => AppError::NotFound(format!("Role {}", name)),
            StoreError::AlreadyExists(_) => AppError::AlreadyExists(err.to_string()),
        }
    }
}
