//! Error types for duckgate
//!
//! This module defines the process-level error type used by configuration
//! loading, engine startup and the HTTP server lifecycle. Per-request HTTP
//! errors live in [`crate::server::response::ApiError`].

use duckgate_engine::EngineError;
use thiserror::Error;

/// Result type alias for duckgate operations
pub type Result<T> = std::result::Result<T, DuckgateError>;

/// Process-level errors
#[derive(Error, Debug)]
pub enum DuckgateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Server error: {0}")]
    Server(String),
}

impl DuckgateError {
    /// Returns `true` when the error comes from engine setup (extension
    /// install/load or startup settings).
    pub fn is_startup_fatal(&self) -> bool {
        matches!(self, DuckgateError::Engine(e) if e.is_startup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_startup_error_is_fatal() {
        let err: DuckgateError = EngineError::startup("LOAD httpfs", "not found").into();
        assert!(err.is_startup_fatal());
        assert_eq!(err.to_string(), "Engine error: LOAD httpfs: not found");
    }

    #[test]
    fn test_config_error_display() {
        let err = DuckgateError::Config("Invalid HTTP address: bad".to_string());
        assert!(!err.is_startup_fatal());
        assert_eq!(err.to_string(), "Configuration error: Invalid HTTP address: bad");
    }
}
