//! Therapy Plans Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! shared by the therapy plan form engine. It includes:
//!
//! - Domain models (TherapyPlan, PaymentType, UserRole)
//! - Collaborator traits for persistence, notifications, navigation and categories
//! - Unified error handling with stable error codes
//! - Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
