//! Error types for the Quotagate service.

use thiserror::Error;

/// Main error type for Quotagate operations.
#[derive(Error, Debug)]
pub enum GateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Counting store errors (unreachable, timeout, protocol)
    #[error("Counting store error: {0}")]
    Store(#[from] redis::RedisError),

    /// Metrics registry errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// HTTP server errors
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Quotagate operations.
pub type Result<T> = std::result::Result<T, GateError>;
