//! Error types for the merging core

use thiserror::Error;

/// Merging core error type
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Two batch arrays that must line up element-for-element do not.
    #[error("Shape mismatch for {what}: expected length {expected}, got {got}")]
    ShapeMismatch {
        /// Name of the offending array.
        what: String,
        /// Required length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Computation error
    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
