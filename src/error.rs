//! Unified error types for the diagnostics service.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Process-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Metrics recorder could not be installed.
    #[error("metrics error: {0}")]
    Metrics(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Diagnostics registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The identifier is not one of the known servers.
    #[error("unknown server: {0}")]
    NotFound(String),
}

/// Errors surfaced at the HTTP boundary.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Registry lookup failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Host introspection failed.
    #[error("failed to get network specs: {0}")]
    NetworkSpecs(String),

    /// Anything else.
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Registry(RegistryError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::NetworkSpecs(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Registry(RegistryError::NotFound(_)) => json!({ "error": "Server not found" }),
            ApiError::NetworkSpecs(details) => json!({
                "error": "Failed to get network specs",
                "details": details,
            }),
            ApiError::Internal(details) => json!({
                "error": "Internal server error",
                "details": details,
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
