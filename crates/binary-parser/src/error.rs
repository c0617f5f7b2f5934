//! Error types for ELF parsing

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a valid ELF file: expected magic {expected:#010x}, got {actual:#010x}")]
    InvalidMagic { expected: u32, actual: u32 },

    #[error("Unsupported ELF class {0}")]
    UnsupportedClass(u8),

    #[error("Unknown ELF data encoding {0}")]
    UnsupportedEncoding(u8),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Incomplete read: expected {expected} bytes, got {actual} bytes at offset {offset:#x}")]
    TruncatedData { offset: u64, expected: u64, actual: u64 },
}

pub type ParseResult<T> = std::result::Result<T, ParseError>;

impl ParseError {
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    pub fn truncated(offset: u64, expected: u64, actual: u64) -> Self {
        Self::TruncatedData {
            offset,
            expected,
            actual,
        }
    }

    /// Attach the path of the file being parsed
    pub fn into_error(self, path: &Path) -> pil_core::Error {
        match self {
            ParseError::Io(source) => pil_core::Error::io(path, source),
            ParseError::TruncatedData {
                offset,
                expected,
                actual,
            } => pil_core::Error::TruncatedRead {
                path: path.to_path_buf(),
                offset,
                expected,
                actual,
            },
            other => pil_core::Error::format(path, other.to_string()),
        }
    }
}
