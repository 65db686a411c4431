//! The read-only file share
//!
//! [`FileShare`] ties the sandbox, size guard, scanner and content accessor
//! to one configuration snapshot. Every operation takes a caller path,
//! resolves it inside the root, and only then touches the filesystem.

use std::sync::Arc;

use mcp_common::ThumbnailFormat;

use crate::access::{image_format, ContentAccessor};
use crate::config::{Config, Limits};
use crate::error::FsResult;
use crate::extract;
use crate::limits::{SizeGuard, SizeLimitKind};
use crate::metadata::{ContainerMetadataExtractor, MetadataExtractor};
use crate::sandbox::Sandbox;
use crate::scanner::{DirectoryScanner, IgnoreRules};
use crate::types::{FileMetadataResult, FolderListing};

/// Encoded image bytes ready to hand back
#[derive(Debug, Clone)]
pub struct ImageData {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
}

pub struct FileShare {
    sandbox: Sandbox,
    guard: SizeGuard,
    ignore: IgnoreRules,
    extractor: Arc<dyn MetadataExtractor>,
    limits: Limits,
}

impl FileShare {
    /// Open the share described by `config`, with the built-in metadata extractor.
    pub fn new(config: &Config) -> FsResult<Self> {
        let extractor = ContainerMetadataExtractor::new(config.limits.max_read_file_size);
        Self::with_extractor(config, Arc::new(extractor))
    }

    pub fn with_extractor(config: &Config, extractor: Arc<dyn MetadataExtractor>) -> FsResult<Self> {
        let sandbox = Sandbox::new(config)?;
        let ignore = IgnoreRules::new(&config.ignore)?;
        tracing::info!(
            "File share rooted at {} ({} exclusions)",
            sandbox.root().display(),
            sandbox.exclusions().prefixes().len()
        );
        Ok(Self {
            sandbox,
            guard: SizeGuard::from_limits(&config.limits),
            ignore,
            extractor,
            limits: config.limits.clone(),
        })
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    fn accessor(&self) -> ContentAccessor<'_> {
        ContentAccessor::new(&self.sandbox, &self.guard, self.extractor.as_ref())
    }

    /// Immediate children of `path`, at most `limit` entries (default: the
    /// configured scan cap).
    pub fn list_folder(&self, path: &str, limit: Option<usize>) -> FsResult<FolderListing> {
        let folder = self.sandbox.resolve(path)?;
        let cap = limit.unwrap_or(self.limits.max_scan_items);
        DirectoryScanner::new(&self.sandbox, &self.guard, &self.ignore).scan(&folder, path, cap)
    }

    pub fn metadata(&self, path: &str) -> FsResult<FileMetadataResult> {
        let resolved = self.sandbox.resolve(path)?;
        self.accessor().read_metadata(&resolved, path)
    }

    pub fn read_bytes(&self, path: &str, kind: SizeLimitKind) -> FsResult<Vec<u8>> {
        let resolved = self.sandbox.resolve(path)?;
        self.accessor().read_bytes(&resolved, kind)
    }

    pub fn read_text(&self, path: &str, kind: SizeLimitKind) -> FsResult<String> {
        let resolved = self.sandbox.resolve(path)?;
        self.accessor().read_text(&resolved, kind)
    }

    /// Extracted document text. The source, and every part decompressed from
    /// it, may be up to the read ceiling; the text itself must fit the return
    /// ceiling.
    pub fn extract_text(&self, path: &str) -> FsResult<String> {
        let contents = self.read_bytes(path, SizeLimitKind::Read)?;
        let text = extract::extract_text(path, &contents, self.limits.max_read_file_size)?;
        self.guard.check_len(text.len() as u64, SizeLimitKind::Return)?;
        Ok(text)
    }

    /// Image content, optionally shrunk to fit `thumb_width`. A width of `0`
    /// means no thumbnail.
    ///
    /// Without a thumbnail the file goes back verbatim and must fit the
    /// return ceiling. With one, the source only has to fit the read ceiling
    /// and the encoded thumbnail is checked against the return ceiling.
    pub fn image_content(&self, path: &str, thumb_width: Option<u32>) -> FsResult<ImageData> {
        let format = match image_format(path)? {
            "png" => ThumbnailFormat::Png,
            _ => ThumbnailFormat::Jpeg,
        };

        let Some(width) = thumb_width.filter(|w| *w > 0) else {
            let data = self.read_bytes(path, SizeLimitKind::Return)?;
            return Ok(ImageData {
                data,
                mime_type: format.mime_type(),
            });
        };

        let source = self.read_bytes(path, SizeLimitKind::Read)?;
        let data = mcp_common::thumbnail(&source, width, format)?;
        tracing::debug!(
            "Thumbnail of {} at width {}: {} -> {} bytes",
            path,
            width,
            source.len(),
            data.len()
        );
        self.guard.check_len(data.len() as u64, SizeLimitKind::Return)?;
        Ok(ImageData {
            data,
            mime_type: format.mime_type(),
        })
    }
}
