//! Error types for Cropcast
//!
//! Every error surfaces to the caller with a stable machine-readable
//! code plus a human message. Nothing is retried inside the core;
//! callers decide whether to retry the whole request.

use hyper::StatusCode;
use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, CropcastError>;

/// Cropcast error taxonomy
#[derive(Error, Debug)]
pub enum CropcastError {
    /// Missing or invalid identity
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Missing or malformed request field
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entitlement denial for a premium-only feature
    #[error("Premium subscription required: {0}")]
    PremiumRequired(String),

    /// Persistence failure
    #[error("Database error: {0}")]
    Database(String),

    /// Estimator failure (defensive; the estimator is pure and should not fail)
    #[error("Estimation error: {0}")]
    Estimation(String),

    /// Upstream collaborator (billing) failure
    #[error("Upstream error: {0}")]
    Http(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CropcastError {
    /// Stable machine-readable code for HTTP responses
    pub fn code(&self) -> &'static str {
        match self {
            CropcastError::Auth(_) => "AUTH_ERROR",
            CropcastError::Validation(_) => "VALIDATION_ERROR",
            CropcastError::PremiumRequired(_) => "PREMIUM_REQUIRED",
            CropcastError::Database(_) => "DB_ERROR",
            CropcastError::Estimation(_) => "ESTIMATION_ERROR",
            CropcastError::Http(_) => "UPSTREAM_ERROR",
            CropcastError::Config(_) => "CONFIG_ERROR",
            CropcastError::Io(_) => "IO_ERROR",
        }
    }

    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CropcastError::Auth(_) => StatusCode::UNAUTHORIZED,
            CropcastError::Validation(_) => StatusCode::BAD_REQUEST,
            CropcastError::PremiumRequired(_) => StatusCode::PAYMENT_REQUIRED,
            CropcastError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CropcastError::Estimation(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CropcastError::Http(_) => StatusCode::BAD_GATEWAY,
            CropcastError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CropcastError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
