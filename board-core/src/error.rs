//! Error types for board operations.

use thiserror::Error;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors that can occur in board operations.
///
/// Geometry violations never show up here: out-of-range resize requests are
/// clamped, and edits addressed to unknown widgets are ignored.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The board is being exported and rejects edits until it finishes.
    #[error("Board is locked while an export is in progress")]
    ExportInProgress,

    /// The breakpoint table cannot resolve every viewport width.
    #[error("Invalid breakpoint table: {0}")]
    InvalidBreakpoints(String),

    /// A widget identifier could not be parsed.
    #[error("Invalid widget id: {0}")]
    InvalidId(String),

    /// Board serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing a board document failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
