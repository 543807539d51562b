/// Unified error types for the agent store
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for record and blob operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object exists at the requested key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or malformed client input
    #[error("{0}")]
    Validation(String),

    /// Required configuration value is absent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blob storage errors
    #[error("Blob storage error: {0}")]
    BlobStorage(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether this error means the object is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }

    /// Whether this error comes from missing configuration
    pub fn is_configuration(&self) -> bool {
        matches!(self, StoreError::Configuration(_))
    }
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Convert StoreError to HTTP response
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            // Client errors are answered in plain text
            StoreError::Validation(message) => {
                return (StatusCode::BAD_REQUEST, message).into_response();
            }
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            StoreError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "ConfigurationError",
                self.to_string(),
            ),
            StoreError::Serialization(_) | StoreError::BlobStorage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "StorageError",
                "Storage error".to_string(),
            ),
            StoreError::Io(_) | StoreError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak details
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
