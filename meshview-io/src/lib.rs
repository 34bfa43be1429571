//! Model loading for meshview
//!
//! This crate reads mesh files into a [`Model`] scene graph. Files can come
//! from disk or from an in-memory blob (a dropped or picked file whose bytes
//! are already in hand). The format is chosen from the file extension.

pub mod obj;
pub mod error;

pub use error::*;
pub use obj::ObjReader;

use meshview_core::{Model, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Trait for reading models from files
pub trait ModelReader {
    fn read_model<P: AsRef<Path>>(path: P) -> Result<Model>;

    /// Read a model from bytes already in memory; `name` labels the model
    fn read_model_from_bytes(name: &str, data: &[u8]) -> Result<Model>;
}

/// Where a model is loaded from
#[derive(Debug, Clone)]
pub enum ModelSource {
    Path(PathBuf),
    Bytes { name: String, data: Arc<[u8]> },
}

impl ModelSource {
    pub fn bytes(name: impl Into<String>, data: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Short human readable label
    pub fn label(&self) -> String {
        match self {
            Self::Path(path) => display_name(path),
            Self::Bytes { name, .. } => name.clone(),
        }
    }

    /// Read the model this source points at
    pub fn load(&self) -> Result<Model> {
        match self {
            Self::Path(path) => read_model(path),
            Self::Bytes { name, data } => read_model_from_bytes(name, data),
        }
    }
}

impl From<PathBuf> for ModelSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ModelSource {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes { name, data } => write!(f, "{} ({} bytes)", name, data.len()),
        }
    }
}

/// Supported model formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Obj,
}

impl ModelFormat {
    /// Detect the format from a file name or path
    pub fn from_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("obj") => Ok(Self::Obj),
            _ => Err(meshview_core::Error::UnsupportedFormat(format!(
                "Unsupported model format: {:?}",
                extension
            ))),
        }
    }
}

/// Auto-detect format and read a model from disk
pub fn read_model<P: AsRef<Path>>(path: P) -> Result<Model> {
    let path = path.as_ref();
    match ModelFormat::from_name(&path.to_string_lossy())? {
        ModelFormat::Obj => ObjReader::read_model(path),
    }
}

/// Auto-detect format from `name` and read a model from memory
pub fn read_model_from_bytes(name: &str, data: &[u8]) -> Result<Model> {
    match ModelFormat::from_name(name)? {
        ModelFormat::Obj => ObjReader::read_model_from_bytes(name_stem(name), data),
    }
}

/// Model name derived from a path: its file stem
pub(crate) fn display_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn name_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}
