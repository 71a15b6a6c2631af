//! Structured error types for the fanbell dispatcher.
//!
//! Delivery failures are deliberately *not* errors: adapters fold every
//! transport or backend problem into a [`crate::outcome::DeliveryOutcome`].
//! The variants here cover contract violations and startup problems only.

use std::path::PathBuf;
use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    // Notification contract violations
    #[error("Notification message must not be empty")]
    EmptyMessage,

    #[error("Unknown notification level: '{value}' (expected info, success, warning or error)")]
    InvalidLevel { value: String },

    #[error("Unknown platform: '{name}'")]
    UnknownPlatform { name: String },

    // Adapter construction errors
    #[error("Failed to build HTTP client for {platform}: {message}")]
    HttpClient {
        platform: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AppError {
    /// Create a configuration error without a source.
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with a source error.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an HTTP client construction error.
    pub fn http_client(
        platform: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::HttpClient {
            platform,
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }
}

/// Convenient result type alias used throughout the library.
pub type AppResult<T> = Result<T, AppError>;
