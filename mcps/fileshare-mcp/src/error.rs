//! Error taxonomy for file share operations

use std::io;
use std::path::Path;

use thiserror::Error;

use crate::limits::SizeLimitKind;

#[derive(Error, Debug)]
pub enum FsError {
    /// Sandbox escape attempt or a path under an excluded prefix
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Path is a directory: {0}")]
    TargetIsDirectory(String),

    #[error("Path is not a directory: {0}")]
    NotADirectory(String),

    #[error("File too large to {kind}: {size} bytes (max {limit})")]
    FileTooLarge {
        kind: SizeLimitKind,
        limit: u64,
        size: u64,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Classify an I/O failure that happened while touching `path`.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path.display().to_string()),
            _ if path.is_dir() => FsError::TargetIsDirectory(path.display().to_string()),
            _ => FsError::Io(err),
        }
    }
}

impl From<mcp_common::ThumbnailError> for FsError {
    fn from(err: mcp_common::ThumbnailError) -> Self {
        FsError::UnsupportedFormat(err.to_string())
    }
}

pub type FsResult<T> = Result<T, FsError>;
