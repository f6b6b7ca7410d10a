use thiserror::Error;

use crate::app::domain::WindowId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Position {position} is out of bounds (length {len})")]
    InvalidPosition { position: usize, len: usize },

    #[error("Edit does not match document content at position {position}")]
    ContentMismatch { position: usize },

    #[error("Malformed edit: {0}")]
    MalformedEdit(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Font size {0} is outside the allowed range 8..=32")]
    OutOfRange(u32),

    #[error("Cannot find '{0}'")]
    NotFound(String),

    #[error("Search text is empty")]
    EmptyQuery,

    #[error("Settings backend unavailable: {0}")]
    PersistenceUnavailable(String),

    #[error("Unknown window {0}")]
    UnknownWindow(WindowId),
}

/// Convenience type alias for Results with AppError
pub type Result<T> = std::result::Result<T, AppError>;
