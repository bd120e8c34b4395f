// src/error.rs

//! Unified error handling for the ETL pipeline.

use std::fmt;

use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// SQLite operation failed
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A record could not be normalized
    #[error("Transform error for record {id}: {message}")]
    Transform { id: u64, message: String },

    /// A git command failed or could not be spawned
    #[error("Git error running '{command}': {message}")]
    Git { command: String, message: String },

    /// Publishing is enabled but no access token is available
    #[error("Access token is not set (expected environment variable {0})")]
    MissingToken(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a transform error for a record.
    pub fn transform(id: u64, message: impl fmt::Display) -> Self {
        Self::Transform {
            id,
            message: message.to_string(),
        }
    }

    /// Create a git error for a command.
    pub fn git(command: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Git {
            command: command.into(),
            message: message.to_string(),
        }
    }
}
