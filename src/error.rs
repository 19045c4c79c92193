//! Error types for the notesetter engine.

use std::io;
use thiserror::Error;

/// Result type alias for notesetter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while accepting or laying out a document.
///
/// Only [`Error::Validation`] is ever returned by a render call. Font and
/// image problems degrade to fallbacks, and overflowing blocks are placed
/// anyway with a warning.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The document description is malformed.
    #[error("Validation error at {path}: {message}")]
    Validation {
        /// Location of the offending field, e.g. `blocks[2].level`
        path: String,
        /// What is wrong with it
        message: String,
    },

    /// The input could not be parsed as JSON at all.
    #[error("JSON error: {0}")]
    Json(String),

    /// No usable metrics exist for a font face.
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    /// A render did not finish within its time limit.
    #[error("Render timed out after {0} ms")]
    Timeout(u64),

    /// Error while serializing output.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Build a validation error for a field path.
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error is caused by the caller's input.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::Json(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        use serde_json::error::Category;

        match err.classify() {
            Category::Io => Error::Json(err.to_string()),
            Category::Syntax | Category::Eof => Error::Json(err.to_string()),
            Category::Data => Error::validation(
                format!("line {} column {}", err.line(), err.column()),
                err.to_string(),
            ),
        }
    }
}
