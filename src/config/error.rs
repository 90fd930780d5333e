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
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("WebSocket path must start with '/'")]
    InvalidPath,

    #[error("Intake capacity must be between 1 and 65536")]
    InvalidIntakeCapacity,

    #[error("Maximum message size must be positive")]
    InvalidMaxMessageSize,

    #[error("Shutdown grace period must be between 1 and 300 seconds")]
    InvalidShutdownGrace,
}
