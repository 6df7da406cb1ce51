#![forbid(unsafe_code)]

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AcfError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("not a valid ACF archive")]
    UnknownFormat,

    #[error("bad archive: {0}")]
    BadArchive(String),

    #[error("crc32 mismatch: {0}")]
    CrcMismatch(String),

    #[error("not found in archive: {0}")]
    NotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("compression engine: {0}")]
    Compressor(String),

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("path is outside base directory: {0}")]
    Outside(String),
}

pub type AcfResult<T> = Result<T, AcfError>;
