//! Error types for meshview

use thiserror::Error;

/// Main error type for meshview operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Model has no renderable geometry")]
    EmptyModel,

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for meshview operations
pub type Result<T> = std::result::Result<T, Error>;
