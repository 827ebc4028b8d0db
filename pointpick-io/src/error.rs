//! Error types for position asset loading

use thiserror::Error;

/// Errors that can occur while reading a position asset
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error at token {token}: {message}")]
    ParseError { token: usize, message: String },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for pointpick_core::Error {
    fn from(e: IoError) -> Self {
        match e {
            IoError::Io(io) => pointpick_core::Error::Io(io),
            other => pointpick_core::Error::InvalidData(other.to_string()),
        }
    }
}
