//! Error types for the ROI narrative service

use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, RoiError>;

#[derive(Error, Debug)]
pub enum RoiError {

    // =============================
    // Request Errors
    // =============================

    #[error("Invalid request: {0}")]
    InvalidInput(String),

    // =============================
    // Generation Errors
    // =============================

    #[error("OPENAI_API_KEY not configured")]
    MissingApiKey,

    #[error("Generation error: {0}")]
    GenerationError(String),

    // =============================
    // Startup Errors
    // =============================

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RoiError {
    /// HTTP status reported at the request boundary.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RoiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code placed in the `error` field.
    pub fn error_code(&self) -> &'static str {
        match self {
            RoiError::InvalidInput(_) => "invalid_request",
            _ => "generation_failed",
        }
    }
}
