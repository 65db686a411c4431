//! Size ceilings applied before content is read

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::Limits;
use crate::error::{FsError, FsResult};

/// Which ceiling applies to a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeLimitKind {
    /// Content read as input to a transformation (text extraction, thumbnails)
    Read,
    /// Content handed back to the caller verbatim
    Return,
    /// No size check
    None,
}

impl fmt::Display for SizeLimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeLimitKind::Read => "read",
            SizeLimitKind::Return => "return",
            SizeLimitKind::None => "none",
        };
        f.write_str(s)
    }
}

/// Enforces the read and return ceilings. A ceiling of `0` disables it.
#[derive(Debug, Clone, Copy)]
pub struct SizeGuard {
    max_read: u64,
    max_return: u64,
}

impl SizeGuard {
    pub fn new(max_read: u64, max_return: u64) -> Self {
        Self {
            max_read,
            max_return,
        }
    }

    pub fn from_limits(limits: &Limits) -> Self {
        Self::new(limits.max_read_file_size, limits.max_return_file_size)
    }

    /// Stat `path` and reject it if its on-disk size exceeds the ceiling for `kind`.
    pub fn check(&self, path: &Path, kind: SizeLimitKind) -> FsResult<()> {
        if kind == SizeLimitKind::None {
            return Ok(());
        }
        let metadata = fs::metadata(path).map_err(|e| FsError::from_io(path, e))?;
        self.check_len(metadata.len(), kind)
    }

    /// Check an already known length, e.g. generated output.
    pub fn check_len(&self, size: u64, kind: SizeLimitKind) -> FsResult<()> {
        let limit = match kind {
            SizeLimitKind::Read => self.max_read,
            SizeLimitKind::Return => self.max_return,
            SizeLimitKind::None => return Ok(()),
        };
        if limit != 0 && size > limit {
            return Err(FsError::FileTooLarge { kind, limit, size });
        }
        Ok(())
    }

    /// Preview hint shown on listed entries; always uses the return ceiling.
    pub fn is_too_large(&self, size: u64) -> bool {
        self.max_return != 0 && size > self.max_return
    }

    pub fn max_read(&self) -> u64 {
        self.max_read
    }
}
