//! Unified error handling for therapy plan forms
//!
//! Remote failures (create/get/update round trips) and local configuration
//! problems are all represented by `AppError`. Field validation is not an
//! error: it is returned as data by the form engine.

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    // ==================== Persistence Errors ====================
    #[error("Request failed with status {status}: {message}")]
    Persistence { status: u16, message: String },

    #[error("Therapy plan not found: {0}")]
    PlanNotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Date rejected: {0}")]
    DateRejected(String),

    // ==================== Internal Errors ====================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AppError {
    /// Returns the error code used by notification and log output
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Persistence { .. } => "persistence_error",
            AppError::PlanNotFound(_) => "plan_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::DateRejected(_) => "date_rejected",
            AppError::Internal(_) => "internal_error",
            AppError::Config(_) => "config_error",
            AppError::Serialization(_) => "serialization_error",
        }
    }
}

// ==================== From implementations ====================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}
