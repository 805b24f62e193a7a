//! Error types for the duckgate engine.
//!
//! Engine failures are passed through to HTTP callers verbatim, so the
//! [`EngineError::Execution`] variant renders as the bare DuckDB message.

/// Errors from the embedded engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A setup statement failed while preparing the session.
    ///
    /// The process cannot serve requests without the remote-storage
    /// extension, so callers treat this as fatal.
    #[error("{statement}: {detail}")]
    Startup {
        /// The statement that failed (e.g. `INSTALL httpfs`).
        statement: String,
        /// The DuckDB diagnostic message.
        detail: String,
    },

    /// DuckDB rejected or failed a statement.
    ///
    /// The inner string is the raw DuckDB message.
    #[error("{0}")]
    Execution(String),

    /// A failure outside DuckDB, e.g. a blocking task that panicked.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Create a `Startup` error for a failed setup statement.
    ///
    /// # Examples
    ///
    /// ```
    /// use duckgate_engine::error::EngineError;
    ///
    /// let err = EngineError::startup("LOAD httpfs", "extension not found");
    /// assert_eq!(err.to_string(), "LOAD httpfs: extension not found");
    /// ```
    pub fn startup(statement: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Startup {
            statement: statement.into(),
            detail: detail.into(),
        }
    }

    /// Wrap a raw DuckDB error string.
    pub fn execution(detail: impl Into<String>) -> Self {
        Self::Execution(detail.into())
    }

    /// The engine's own message, without the statement prefix added for
    /// startup failures.
    pub fn detail(&self) -> &str {
        match self {
            EngineError::Startup { detail, .. } => detail,
            EngineError::Execution(detail) | EngineError::Internal(detail) => detail,
        }
    }

    /// Returns `true` for setup failures that should abort the process.
    pub fn is_startup(&self) -> bool {
        matches!(self, EngineError::Startup { .. })
    }
}

impl From<duckdb::Error> for EngineError {
    fn from(e: duckdb::Error) -> Self {
        EngineError::Execution(e.to_string())
    }
}

/// A specialised `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
