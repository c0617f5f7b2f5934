//! Error types for the PIL firmware tools

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for split and squash operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: invalid format: {message}")]
    Format { path: PathBuf, message: String },

    #[error(
        "{path}: incomplete read: expected {expected} bytes, got {actual} bytes at offset {offset:#x}"
    )]
    TruncatedRead {
        path: PathBuf,
        offset: u64,
        expected: u64,
        actual: u64,
    },

    #[error("{0} is not a .mdt file")]
    Naming(PathBuf),

    #[error("Failed to open required segment file {path}")]
    MissingSegment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_segment(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::MissingSegment {
            path: path.into(),
            source,
        }
    }

    /// Path of the file the error refers to
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::Format { path, .. }
            | Self::TruncatedRead { path, .. }
            | Self::MissingSegment { path, .. } => path,
            Self::Naming(path) => path,
        }
    }
}
