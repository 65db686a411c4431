//! Single-level folder scans with exclusion, ignore rules and an entry cap

use std::fs::{self, DirEntry};

use glob::Pattern;

use crate::config::IgnoreConfig;
use crate::error::{FsError, FsResult};
use crate::limits::SizeGuard;
use crate::sandbox::{is_root_alias, ResolvedPath, Sandbox};
use crate::types::{FileEntry, FileSystemEntry, FolderEntry, FolderListing};

/// Name globs for entries that never show up in listings
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    files: Vec<Pattern>,
    folders: Vec<Pattern>,
}

impl IgnoreRules {
    pub fn new(config: &IgnoreConfig) -> FsResult<Self> {
        Ok(Self {
            files: compile(&config.files)?,
            folders: compile(&config.folders)?,
        })
    }

    pub fn ignores_file(&self, name: &str) -> bool {
        self.files.iter().any(|p| p.matches(name))
    }

    pub fn ignores_folder(&self, name: &str) -> bool {
        self.folders.iter().any(|p| p.matches(name))
    }
}

fn compile(patterns: &[String]) -> FsResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| FsError::Config(format!("ignore pattern {:?}: {}", p, e)))
        })
        .collect()
}

pub struct DirectoryScanner<'a> {
    sandbox: &'a Sandbox,
    guard: &'a SizeGuard,
    ignore: &'a IgnoreRules,
}

impl<'a> DirectoryScanner<'a> {
    pub fn new(sandbox: &'a Sandbox, guard: &'a SizeGuard, ignore: &'a IgnoreRules) -> Self {
        Self {
            sandbox,
            guard,
            ignore,
        }
    }

    /// List the immediate children of `folder`, which the caller named
    /// `relative`. At most `cap` entries are emitted (`0` = no cap); excluded
    /// and ignored children are skipped without counting toward it.
    pub fn scan(&self, folder: &ResolvedPath, relative: &str, cap: usize) -> FsResult<FolderListing> {
        self.sandbox.require_not_excluded(folder)?;

        let relative = if is_root_alias(relative) { "" } else { relative };
        let path = folder.as_path();
        let mut children = fs::read_dir(path).map_err(|e| {
            if path.is_file() {
                FsError::NotADirectory(path.display().to_string())
            } else {
                FsError::from_io(path, e)
            }
        })?;

        let mut entries = Vec::new();
        let mut truncated = false;
        while let Some(child) = children.next() {
            let child = match child {
                Ok(child) => child,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry in {}: {}", path.display(), e);
                    continue;
                }
            };
            let Some(entry) = self.entry_for(&child, relative) else {
                continue;
            };
            entries.push(entry);

            if cap != 0 && entries.len() >= cap {
                // Only a child that would have been listed counts as cut off
                truncated = children
                    .by_ref()
                    .filter_map(Result::ok)
                    .any(|child| self.entry_for(&child, relative).is_some());
                break;
            }
        }

        tracing::debug!(
            "Listed {} entries in {} (truncated: {})",
            entries.len(),
            path.display(),
            truncated
        );

        let folder = FolderEntry {
            name: base_name(relative).to_string(),
            path: relative.to_string(),
        };
        Ok(FolderListing::new(folder, entries, truncated))
    }

    fn entry_for(&self, child: &DirEntry, relative: &str) -> Option<FileSystemEntry> {
        let name = child.file_name().to_string_lossy().into_owned();
        let item_path = join_relative(relative, &name);

        // Symlinks get the same containment and exclusion checks as caller paths
        let is_symlink = child.file_type().map(|t| t.is_symlink()).unwrap_or(false);
        if is_symlink {
            match self.sandbox.resolve(&item_path) {
                Ok(target) if self.sandbox.is_excluded(target.as_path()) => {
                    tracing::debug!("Skipping symlink into an excluded folder: {}", item_path);
                    return None;
                }
                Ok(_) => {}
                Err(_) => {
                    tracing::debug!("Skipping symlink leaving the share: {}", item_path);
                    return None;
                }
            }
        }

        let metadata = match fs::metadata(child.path()) {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("Skipping {}: {}", item_path, e);
                return None;
            }
        };

        if metadata.is_dir() {
            if self.ignore.ignores_folder(&name) {
                return None;
            }
            let resolved = self.sandbox.resolve(&item_path).ok()?;
            if self.sandbox.is_excluded(resolved.as_path()) {
                return None;
            }
            Some(FileSystemEntry::Folder(FolderEntry {
                name,
                path: item_path,
            }))
        } else {
            if self.ignore.ignores_file(&name) {
                return None;
            }
            let size = metadata.len();
            Some(FileSystemEntry::File(FileEntry {
                name,
                path: item_path,
                size,
                is_too_large: self.guard.is_too_large(size),
            }))
        }
    }
}

/// Append `name` to a caller folder path, adding `/` only when needed.
pub fn join_relative(relative: &str, name: &str) -> String {
    if relative.is_empty() || relative.ends_with('/') {
        format!("{relative}{name}")
    } else {
        format!("{relative}/{name}")
    }
}

/// Last segment of a caller path; `a/b/` names `b`.
pub fn base_name(relative: &str) -> &str {
    relative
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::Path;

    struct Fixture {
        _dir: tempfile::TempDir,
        sandbox: Sandbox,
        guard: SizeGuard,
        ignore: IgnoreRules,
    }

    impl Fixture {
        fn new(setup: impl FnOnce(&Path, &mut Config)) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().join("share");
            fs::create_dir_all(&root).unwrap();
            let mut config = Config::for_root(&root);
            setup(&root, &mut config);
            Self {
                sandbox: Sandbox::new(&config).unwrap(),
                guard: SizeGuard::from_limits(&config.limits),
                ignore: IgnoreRules::new(&config.ignore).unwrap(),
                _dir: dir,
            }
        }

        fn scan(&self, relative: &str, cap: usize) -> FsResult<FolderListing> {
            let folder = self.sandbox.resolve(relative)?;
            DirectoryScanner::new(&self.sandbox, &self.guard, &self.ignore).scan(
                &folder,
                relative,
                cap,
            )
        }
    }

    #[test]
    fn test_lists_files_and_folders() {
        let fx = Fixture::new(|root, config| {
            fs::create_dir_all(root.join("docs/sub")).unwrap();
            fs::write(root.join("docs/a.txt"), b"0123456789").unwrap();
            fs::write(root.join("docs/big.png"), vec![0u8; 64]).unwrap();
            config.limits.max_return_file_size = 32;
        });

        let listing = fx.scan("docs", 0).unwrap();
        assert_eq!(listing.folder.name, "docs");
        assert_eq!(listing.folder.path, "docs");
        assert_eq!(listing.subfolders.len(), 1);
        assert_eq!(listing.subfolders[0].path, "docs/sub");
        assert_eq!(listing.files.len(), 2);
        assert!(!listing.truncated);

        let a = listing.files.iter().find(|f| f.name == "a.txt").unwrap();
        assert_eq!(a.size, 10);
        assert!(!a.is_too_large);
        let big = listing.files.iter().find(|f| f.name == "big.png").unwrap();
        assert!(big.is_too_large);
        assert!(big.is_supported_image());
    }

    #[test]
    fn test_root_listing_paths_have_no_leading_separator() {
        let fx = Fixture::new(|root, _| {
            fs::write(root.join("a.txt"), b"a").unwrap();
        });
        for alias in ["", "/", "."] {
            let listing = fx.scan(alias, 0).unwrap();
            assert_eq!(listing.folder.path, "");
            assert_eq!(listing.files[0].path, "a.txt");
        }
    }

    #[test]
    fn test_trailing_separator_folder_name() {
        let fx = Fixture::new(|root, _| {
            fs::create_dir_all(root.join("docs/reports")).unwrap();
            fs::write(root.join("docs/reports/q1.txt"), b"q1").unwrap();
        });
        let listing = fx.scan("docs/reports/", 0).unwrap();
        assert_eq!(listing.folder.name, "reports");
        assert_eq!(listing.files[0].path, "docs/reports/q1.txt");
    }

    #[test]
    fn test_excluded_subfolder_omitted_without_counting() {
        let fx = Fixture::new(|root, config| {
            fs::create_dir_all(root.join("secret")).unwrap();
            fs::create_dir_all(root.join("public")).unwrap();
            config.exclude_folders = vec![root.join("secret").display().to_string()];
        });
        let listing = fx.scan("", 1).unwrap();
        assert_eq!(listing.subfolders.len(), 1);
        assert_eq!(listing.subfolders[0].name, "public");
        assert!(!listing.truncated);
    }

    #[test]
    fn test_hidden_children_past_cap_do_not_truncate() {
        // Whatever the enumeration order, only `keep.txt` is visible
        let fx = Fixture::new(|root, config| {
            fs::create_dir_all(root.join("secret")).unwrap();
            fs::create_dir_all(root.join(".cache")).unwrap();
            fs::write(root.join("keep.txt"), b"x").unwrap();
            fs::write(root.join("scratch.tmp"), b"x").unwrap();
            config.exclude_folders = vec![root.join("secret").display().to_string()];
            config.ignore.files = vec!["*.tmp".into()];
            config.ignore.folders = vec![".*".into()];
        });
        let listing = fx.scan("", 1).unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing.files[0].name, "keep.txt");
        assert!(!listing.truncated);
    }

    #[test]
    fn test_visible_child_past_cap_truncates() {
        let fx = Fixture::new(|root, config| {
            fs::create_dir_all(root.join("secret")).unwrap();
            fs::write(root.join("one.txt"), b"x").unwrap();
            fs::write(root.join("two.txt"), b"x").unwrap();
            config.exclude_folders = vec![root.join("secret").display().to_string()];
        });
        let listing = fx.scan("", 1).unwrap();
        assert_eq!(listing.len(), 1);
        assert!(listing.truncated);
    }

    #[test]
    fn test_listing_excluded_folder_denied() {
        let fx = Fixture::new(|root, config| {
            fs::create_dir_all(root.join("secret")).unwrap();
            config.exclude_folders = vec![root.join("secret").display().to_string()];
        });
        assert!(matches!(fx.scan("secret", 0), Err(FsError::AccessDenied(_))));
    }

    #[test]
    fn test_cap_truncates() {
        let fx = Fixture::new(|root, _| {
            for i in 0..600 {
                fs::write(root.join(format!("f{i}.txt")), b"x").unwrap();
            }
        });
        let listing = fx.scan("", 250).unwrap();
        assert_eq!(listing.len(), 250);
        assert!(listing.truncated);

        let all = fx.scan("", 0).unwrap();
        assert_eq!(all.len(), 600);
        assert!(!all.truncated);
    }

    #[test]
    fn test_cap_equal_to_entry_count_is_not_truncated() {
        let fx = Fixture::new(|root, _| {
            for i in 0..5 {
                fs::write(root.join(format!("f{i}.txt")), b"x").unwrap();
            }
        });
        let listing = fx.scan("", 5).unwrap();
        assert_eq!(listing.len(), 5);
        assert!(!listing.truncated);
    }

    #[test]
    fn test_ignore_rules() {
        let fx = Fixture::new(|root, config| {
            fs::create_dir_all(root.join(".git")).unwrap();
            fs::create_dir_all(root.join("src")).unwrap();
            fs::write(root.join("notes.tmp"), b"x").unwrap();
            fs::write(root.join("notes.md"), b"x").unwrap();
            config.ignore.files = vec!["*.tmp".into()];
            config.ignore.folders = vec![".*".into()];
        });
        let listing = fx.scan("", 0).unwrap();
        let folders: Vec<_> = listing.subfolders.iter().map(|f| f.name.as_str()).collect();
        let files: Vec<_> = listing.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(folders, vec!["src"]);
        assert_eq!(files, vec!["notes.md"]);
    }

    #[test]
    fn test_listing_a_file_is_an_error() {
        let fx = Fixture::new(|root, _| {
            fs::write(root.join("a.txt"), b"a").unwrap();
        });
        assert!(matches!(fx.scan("a.txt", 0), Err(FsError::NotADirectory(_))));
        assert!(matches!(fx.scan("missing", 0), Err(FsError::NotFound(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_escaping_symlinks_hidden() {
        let fx = Fixture::new(|root, _| {
            let outside = root.parent().unwrap().join("outside");
            fs::create_dir_all(&outside).unwrap();
            fs::write(outside.join("passwd"), b"root").unwrap();
            std::os::unix::fs::symlink(&outside, root.join("escape-dir")).unwrap();
            std::os::unix::fs::symlink(outside.join("passwd"), root.join("escape-file"))
                .unwrap();
            fs::write(root.join("ok.txt"), b"ok").unwrap();
        });
        let listing = fx.scan("", 0).unwrap();
        assert!(listing.subfolders.is_empty());
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "ok.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_into_excluded_folder_hidden() {
        let fx = Fixture::new(|root, config| {
            fs::create_dir_all(root.join("secret/inner")).unwrap();
            fs::write(root.join("secret/x"), b"classified").unwrap();
            std::os::unix::fs::symlink(root.join("secret/x"), root.join("alias.txt")).unwrap();
            std::os::unix::fs::symlink(root.join("secret/inner"), root.join("alias-dir"))
                .unwrap();
            fs::write(root.join("ok.txt"), b"ok").unwrap();
            config.exclude_folders = vec![root.join("secret").display().to_string()];
        });
        let listing = fx.scan("", 0).unwrap();
        assert!(listing.subfolders.is_empty());
        assert_eq!(listing.files.len(), 1);
        assert_eq!(listing.files[0].name, "ok.txt");
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let config = IgnoreConfig {
            files: vec!["[".into()],
            folders: vec![],
        };
        assert!(matches!(IgnoreRules::new(&config), Err(FsError::Config(_))));
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(join_relative("", "a"), "a");
        assert_eq!(join_relative("docs", "a"), "docs/a");
        assert_eq!(join_relative("docs/", "a"), "docs/a");
        assert_eq!(base_name("docs/reports"), "reports");
        assert_eq!(base_name("docs/reports/"), "reports");
        assert_eq!(base_name(""), "");
    }
}
