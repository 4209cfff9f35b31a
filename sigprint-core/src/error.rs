//! Structured error types for the Sigprint workspace.

use thiserror::Error;

/// Unified error type for all Sigprint operations.
#[derive(Debug, Error)]
pub enum SigprintError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed mutation-type key, unknown metric or linkage name)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, mismatched shapes, unknown labels)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the Sigprint workspace.
pub type Result<T> = std::result::Result<T, SigprintError>;
