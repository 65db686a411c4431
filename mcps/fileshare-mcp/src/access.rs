//! Guarded reads of file content and metadata
//!
//! Every read checks the exclusion list, then the size ceiling for the
//! requested [`SizeLimitKind`], and only then touches file content.

use std::fs;

use chrono::{DateTime, Utc};

use crate::error::{FsError, FsResult};
use crate::limits::{SizeGuard, SizeLimitKind};
use crate::metadata::MetadataExtractor;
use crate::sandbox::{ResolvedPath, Sandbox};
use crate::scanner::base_name;
use crate::types::{extension_of, FileEntry, FileMetadataResult};

pub struct ContentAccessor<'a> {
    sandbox: &'a Sandbox,
    guard: &'a SizeGuard,
    extractor: &'a dyn MetadataExtractor,
}

impl<'a> ContentAccessor<'a> {
    pub fn new(
        sandbox: &'a Sandbox,
        guard: &'a SizeGuard,
        extractor: &'a dyn MetadataExtractor,
    ) -> Self {
        Self {
            sandbox,
            guard,
            extractor,
        }
    }

    pub fn read_bytes(&self, path: &ResolvedPath, kind: SizeLimitKind) -> FsResult<Vec<u8>> {
        self.sandbox.require_not_excluded(path)?;
        self.guard.check(path.as_path(), kind)?;

        let bytes = fs::read(path).map_err(|e| FsError::from_io(path.as_path(), e))?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path.as_path().display());
        Ok(bytes)
    }

    /// UTF-8 content; invalid sequences become U+FFFD.
    pub fn read_text(&self, path: &ResolvedPath, kind: SizeLimitKind) -> FsResult<String> {
        let bytes = self.read_bytes(path, kind)?;
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }

    /// Entry details plus format metadata for the file the caller named `relative`.
    pub fn read_metadata(&self, path: &ResolvedPath, relative: &str) -> FsResult<FileMetadataResult> {
        self.sandbox.require_not_excluded(path)?;

        let stat = fs::metadata(path).map_err(|e| FsError::from_io(path.as_path(), e))?;
        if stat.is_dir() {
            return Err(FsError::TargetIsDirectory(relative.to_string()));
        }

        let size = stat.len();
        let file = FileEntry {
            name: base_name(relative).to_string(),
            path: relative.to_string(),
            size,
            is_too_large: self.guard.is_too_large(size),
        };
        let modified = stat.modified().ok().map(DateTime::<Utc>::from);
        let metadata = self.extractor.extract(path.as_path())?;

        Ok(FileMetadataResult {
            file,
            modified,
            metadata,
        })
    }
}

/// Image format for a file name, by extension only.
pub fn image_format(name: &str) -> FsResult<&'static str> {
    match extension_of(name).as_deref() {
        Some("png") => Ok("png"),
        Some("jpg" | "jpeg") => Ok("jpg"),
        _ => Err(FsError::UnsupportedFormat(format!(
            "{} is not a png or jpg image",
            name
        ))),
    }
}
