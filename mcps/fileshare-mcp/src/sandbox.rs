//! Sandbox module for path resolution and exclusion checks
//!
//! Every caller-supplied path goes through [`Sandbox::resolve`] before the
//! filesystem is touched for I/O. Resolution fails closed: anything that does
//! not provably stay under the canonical root is `AccessDenied`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::config::Config;
use crate::error::{FsError, FsResult};

/// Canonical absolute path known to lie inside the sandbox root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath(PathBuf);

impl ResolvedPath {
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Excluded path prefixes, compared as raw strings against canonical paths.
///
/// The comparison is not segment-bounded: excluding `/data/secret` also
/// hides `/data/secretarchive`.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    prefixes: Vec<String>,
}

impl ExclusionFilter {
    /// Relative entries are taken relative to `root`; existing entries are
    /// canonicalized so they line up with resolved paths.
    pub fn new(root: &Path, entries: &[String]) -> Self {
        let prefixes = entries
            .iter()
            .map(|entry| {
                let path = Path::new(entry);
                let absolute = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    root.join(path)
                };
                let canonical = absolute.canonicalize().unwrap_or(absolute);
                canonical
                    .to_string_lossy()
                    .trim_end_matches(['/', '\\'])
                    .to_string()
            })
            .collect();
        Self { prefixes }
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        self.prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn require_not_excluded(&self, path: &ResolvedPath) -> FsResult<()> {
        if self.is_excluded(path.as_path()) {
            tracing::warn!("Denied access to excluded path {}", path.as_path().display());
            return Err(FsError::AccessDenied(format!(
                "{} is in an excluded folder",
                path.as_path().display()
            )));
        }
        Ok(())
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }
}

/// Sandbox rooted at one canonical directory
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
    exclusions: ExclusionFilter,
}

impl Sandbox {
    /// Create a new sandbox from configuration. The root must exist.
    pub fn new(config: &Config) -> FsResult<Self> {
        let configured = Path::new(&config.file_system_path);
        let root = configured.canonicalize().map_err(|e| {
            FsError::Config(format!("file system path {}: {}", configured.display(), e))
        })?;
        if !root.is_dir() {
            return Err(FsError::Config(format!(
                "file system path {} is not a directory",
                root.display()
            )));
        }

        let exclusions = ExclusionFilter::new(&root, &config.exclude_folders);
        Ok(Self { root, exclusions })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exclusions(&self) -> &ExclusionFilter {
        &self.exclusions
    }

    /// Resolve a caller path (relative to the root, `/`-delimited) to a
    /// canonical path inside the sandbox.
    pub fn resolve(&self, relative: &str) -> FsResult<ResolvedPath> {
        if relative.contains('\0') {
            return Err(FsError::AccessDenied("path contains null byte".to_string()));
        }

        let trimmed = relative.trim_start_matches('/');
        if is_root_alias(relative) || trimmed.is_empty() {
            return Ok(ResolvedPath(self.root.clone()));
        }

        let lexical = normalize_lexically(&self.root.join(trimmed));
        if !lexical.starts_with(&self.root) {
            return Err(self.escape(relative));
        }

        // Symlinks may still point elsewhere
        let canonical = canonicalize_existing(&lexical)?;
        if !canonical.starts_with(&self.root) {
            return Err(self.escape(relative));
        }

        Ok(ResolvedPath(canonical))
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        self.exclusions.is_excluded(path)
    }

    pub fn require_not_excluded(&self, path: &ResolvedPath) -> FsResult<()> {
        self.exclusions.require_not_excluded(path)
    }

    fn escape(&self, relative: &str) -> FsError {
        tracing::warn!("Denied path outside of the share root: {:?}", relative);
        FsError::AccessDenied(format!("{} is outside of the share root", relative))
    }
}

/// Caller spellings that mean the root itself
pub fn is_root_alias(relative: &str) -> bool {
    matches!(relative, "" | "/" | "\\" | ".")
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }
    resolved
}

/// Symlink hops followed through dangling links before giving up
const MAX_LINK_HOPS: usize = 40;

/// Canonicalize the deepest existing ancestor and re-append the missing tail.
/// Dangling symlinks are followed to where they point, like `realpath`.
fn canonicalize_existing(path: &Path) -> FsResult<PathBuf> {
    canonicalize_following(path, 0)
}

fn canonicalize_following(path: &Path, hops: usize) -> FsResult<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();

    loop {
        let mut canonical = match existing.canonicalize() {
            Ok(canonical) => canonical,
            Err(_) => {
                let (Some(name), Some(parent)) = (existing.file_name(), existing.parent()) else {
                    return Err(FsError::NotFound(path.display().to_string()));
                };
                if !is_symlink(existing) {
                    missing.push(name.to_os_string());
                    existing = parent;
                    continue;
                }
                if hops >= MAX_LINK_HOPS {
                    return Err(FsError::AccessDenied(format!(
                        "too many levels of symbolic links: {}",
                        path.display()
                    )));
                }
                let target = fs::read_link(existing).map_err(|e| FsError::from_io(existing, e))?;
                canonicalize_following(&normalize_lexically(&parent.join(target)), hops + 1)?
            }
        };
        for name in missing.iter().rev() {
            canonical.push(name);
        }
        return Ok(canonical);
    }
}

fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}
