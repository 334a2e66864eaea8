//! Error types for deals-bench.

use thiserror::Error;

/// Main error type for all decoding and load-generation operations.
#[derive(Debug, Error)]
pub enum DealsError {
    /// No delimiter inside the header search window, or the header is not
    /// an unsigned decimal integer.
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// A size-table entry is not an unsigned decimal integer, or describes
    /// a range outside the envelope. Entry 0 is the data pointer.
    #[error("Malformed size table at entry {entry}: {reason}")]
    MalformedSizeTable { entry: usize, reason: String },

    /// A single segment failed to inflate or parse. Never fatal to a batch.
    #[error("Segment {index} decode failure: {reason}")]
    SegmentDecode { index: usize, reason: String },

    /// Network-level failure issuing or completing an HTTP request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request kind is not one the service understands.
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// Streamed envelope grew past the configured limit.
    #[error("Envelope size {size} exceeds maximum {max}")]
    EnvelopeTooLarge { size: usize, max: usize },

    /// Rejected harness configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (stdin/stdout).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for DealsError {
    fn from(err: reqwest::Error) -> Self {
        DealsError::Transport(err.to_string())
    }
}

impl DealsError {
    /// Shorthand for a size-table error.
    pub(crate) fn size_table(entry: usize, reason: impl Into<String>) -> Self {
        DealsError::MalformedSizeTable {
            entry,
            reason: reason.into(),
        }
    }

    /// Shorthand for a per-segment error.
    pub(crate) fn segment(index: usize, reason: impl Into<String>) -> Self {
        DealsError::SegmentDecode {
            index,
            reason: reason.into(),
        }
    }
}

/// Result type alias using DealsError.
pub type Result<T> = std::result::Result<T, DealsError>;
