//! Error types for delve.
//!
//! These cover API misuse and bad configuration. A layer that cannot be
//! scored in a given epoch is not an error; see [`SkipReason`](crate::SkipReason).

use thiserror::Error;

/// Delve error types.
#[derive(Error, Debug)]
pub enum DelveError {
    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Flat data does not fill the requested shape
    #[error("Shape mismatch: {rows}x{cols} needs {expected} values, got {got}")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
        got: usize,
    },

    /// Rows of a snapshot have different lengths
    #[error("Ragged rows: row {row} has {got} columns, expected {expected}")]
    RaggedRows { row: usize, expected: usize, got: usize },

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Host probe failed to produce a layer output
    #[error("Probe failed for layer '{layer}': {message}")]
    Probe { layer: String, message: String },
}

/// Result type alias for delve operations.
pub type Result<T> = std::result::Result<T, DelveError>;
