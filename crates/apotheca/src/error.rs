//! Error types for Apotheca
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for the storefront core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for Apotheca
pub type Result<T> = std::result::Result<T, Error>;
