//! Error types for note state operations.

use thiserror::Error;

/// Result type for note state operations.
pub type NoteResult<T> = Result<T, NoteError>;

/// Errors that can occur while editing note state or its document.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Node not found in the document.
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A color string could not be parsed.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// A named value (alignment, weight, tool, ...) was not recognised.
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Field being parsed.
        field: &'static str,
        /// Offending input.
        value: String,
    },

    /// Style serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
