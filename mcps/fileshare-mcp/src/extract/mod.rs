//! Text and property extraction from rich document formats
//!
//! PDF and DOCX get structured extraction; every other file is decoded as
//! UTF-8 with invalid sequences replaced.

pub mod docx;
pub mod pdf;

use thiserror::Error;

use crate::error::FsError;
use crate::limits::SizeLimitKind;
use crate::types::extension_of;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// The container could not be parsed at all
    #[error("unreadable {format} content: {reason}")]
    UnreadableFormat {
        format: &'static str,
        reason: String,
    },

    /// A container member expands past the read ceiling
    #[error("{name} expands to more than {limit} bytes")]
    TooLarge {
        name: String,
        limit: u64,
        size: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub fn unreadable(format: &'static str, reason: impl ToString) -> Self {
        ExtractError::UnreadableFormat {
            format,
            reason: reason.to_string(),
        }
    }
}

impl From<ExtractError> for FsError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Io(e) => FsError::Io(e),
            ExtractError::TooLarge { limit, size, .. } => FsError::FileTooLarge {
                kind: SizeLimitKind::Read,
                limit,
                size,
            },
            other => FsError::UnsupportedFormat(other.to_string()),
        }
    }
}

/// Extract readable text from `contents`, dispatching on the extension of `file_name`.
/// Compressed parts may expand to at most `max_expanded` bytes (`0` = no limit).
pub fn extract_text(
    file_name: &str,
    contents: &[u8],
    max_expanded: u64,
) -> Result<String, ExtractError> {
    match extension_of(file_name).as_deref() {
        Some("pdf") => pdf::extract_text(contents),
        Some("docx") => docx::extract_text(contents, max_expanded),
        _ => Ok(String::from_utf8_lossy(contents).into_owned()),
    }
}
