//! Error types for pointpick

use thiserror::Error;

/// Main error type for pointpick operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The flat position sequence could not be split into xyz triplets.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A per-point attribute was addressed outside `[0, len)`.
    #[error("Point index {index} out of range for dataset of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for pointpick operations
pub type Result<T> = std::result::Result<T, Error>;
