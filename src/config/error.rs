//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Invalid workflow backend URL: {0}")]
    InvalidBackendUrl(String),

    #[error("Workflow backend must use HTTPS in production")]
    BackendMustBeHttps,

    #[error("Invalid workflow backend timeout")]
    InvalidBackendTimeout,

    #[error("Endpoint path must start with '/': {0}")]
    InvalidPath(String),

    #[error("Message display time must be at most {max_ms}ms")]
    MessageDisplayTooLong { max_ms: u64 },
}
