//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur while loading a model
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid file format: {format}")]
    InvalidFormat { format: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("{name} is empty")]
    EmptyInput { name: String },

    #[error("{name} contains no faces")]
    NoGeometry { name: String },

    #[error("Face {face} references vertex {index} but only {count} vertices exist")]
    IndexOutOfRange { face: usize, index: usize, count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for meshview_core::Error {
    fn from(err: IoError) -> Self {
        let message = err.to_string();
        match err {
            IoError::Io(e) => meshview_core::Error::Io(e),
            IoError::FileNotFound { path } => meshview_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path),
            )),
            IoError::InvalidFormat { format } => meshview_core::Error::UnsupportedFormat(format),
            IoError::NoGeometry { .. } => meshview_core::Error::EmptyModel,
            IoError::ParseError { .. } | IoError::EmptyInput { .. } | IoError::IndexOutOfRange { .. } => {
                meshview_core::Error::Parse(message)
            }
        }
    }
}
