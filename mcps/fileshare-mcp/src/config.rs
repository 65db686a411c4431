//! Configuration snapshot and bootstrap
//!
//! The snapshot is assembled once at startup from, lowest precedence first:
//! built-in defaults, a TOML file, environment variables and command line
//! flags. It is never mutated afterwards.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

// ============================================================================
// Configuration Types
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Root directory exposed to callers
    #[serde(default)]
    pub file_system_path: String,
    /// Folders never accessible (absolute, or relative to the root)
    #[serde(default)]
    pub exclude_folders: Vec<String>,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub ignore: IgnoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum entries emitted by one folder listing (0 = unlimited)
    #[serde(default = "default_max_scan_items")]
    pub max_scan_items: usize,
    /// Maximum size of content returned verbatim (0 = unlimited)
    #[serde(default = "default_max_return_file_size")]
    pub max_return_file_size: u64,
    /// Maximum size of content read for extraction or thumbnails (0 = unlimited)
    #[serde(default = "default_max_read_file_size")]
    pub max_read_file_size: u64,
    /// Maximum core operations in flight at once (0 = unbounded)
    #[serde(default = "default_max_concurrent_ops")]
    pub max_concurrent_ops: usize,
}

fn default_max_scan_items() -> usize {
    10_000
}

fn default_max_return_file_size() -> u64 {
    1024 * 1024 // 1MB
}

fn default_max_read_file_size() -> u64 {
    20 * 1024 * 1024 // 20MB
}

fn default_max_concurrent_ops() -> usize {
    8
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_scan_items: default_max_scan_items(),
            max_return_file_size: default_max_return_file_size(),
            max_read_file_size: default_max_read_file_size(),
            max_concurrent_ops: default_max_concurrent_ops(),
        }
    }
}

/// Glob patterns matched against entry names; matches are left out of listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgnoreConfig {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub folders: Vec<String>,
}

// ============================================================================
// Command Line / Environment
// ============================================================================

#[derive(Debug, Default, Parser)]
#[command(name = "fileshare-mcp")]
#[command(about = "Read-only file share MCP server with sandboxing and size limits")]
pub struct Cli {
    /// TOML config file (overrides the standard locations)
    #[arg(long, env = "FILESHARE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Root directory exposed to tool callers
    #[arg(long, env = "FILE_SYSTEM_PATH")]
    pub file_system_path: Option<String>,

    /// Folders hidden from callers
    #[arg(
        long,
        alias = "exclude_folders",
        env = "EXCLUDE_FOLDERS",
        value_delimiter = ',',
        num_args = 1..
    )]
    pub exclude_folders: Vec<String>,

    /// Maximum entries returned by one folder listing
    #[arg(long, env = "MAX_SCAN_ITEMS")]
    pub max_scan_items: Option<usize>,

    /// Maximum size in bytes of content returned directly
    #[arg(long, env = "MAX_RETURN_FILE_SIZE")]
    pub max_return_file_size: Option<u64>,

    /// Maximum size in bytes of content read for extraction or thumbnails
    #[arg(long, env = "MAX_READ_FILE_SIZE")]
    pub max_read_file_size: Option<u64>,

    /// Maximum concurrent file operations
    #[arg(long, env = "MAX_CONCURRENT_OPS")]
    pub max_concurrent_ops: Option<usize>,

    /// File name globs hidden from listings
    #[arg(long, env = "IGNORE_FILES", value_delimiter = ',', num_args = 1..)]
    pub ignore_files: Vec<String>,

    /// Folder name globs hidden from listings
    #[arg(long, env = "IGNORE_FOLDERS", value_delimiter = ',', num_args = 1..)]
    pub ignore_folders: Vec<String>,
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Config rooted at `root` with default limits
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        Self {
            file_system_path: root.as_ref().display().to_string(),
            ..Default::default()
        }
    }

    /// Load from the process command line and environment
    pub fn load() -> FsResult<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Build the snapshot from parsed arguments, layering them over the file config
    pub fn from_cli(cli: Cli) -> FsResult<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::read_file(path)?,
            None => Self::load_standard_locations(),
        };

        if let Some(root) = cli.file_system_path {
            config.file_system_path = root;
        }
        if !cli.exclude_folders.is_empty() {
            config.exclude_folders = cli.exclude_folders;
        }
        if let Some(v) = cli.max_scan_items {
            config.limits.max_scan_items = v;
        }
        if let Some(v) = cli.max_return_file_size {
            config.limits.max_return_file_size = v;
        }
        if let Some(v) = cli.max_read_file_size {
            config.limits.max_read_file_size = v;
        }
        if let Some(v) = cli.max_concurrent_ops {
            config.limits.max_concurrent_ops = v;
        }
        if !cli.ignore_files.is_empty() {
            config.ignore.files = cli.ignore_files;
        }
        if !cli.ignore_folders.is_empty() {
            config.ignore.folders = cli.ignore_folders;
        }

        config.normalize();
        config.validate()?;
        Ok(config)
    }

    fn read_file(path: &Path) -> FsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FsError::Config(format!("{}: {}", path.display(), e)))?;
        let config = toml::from_str::<Config>(&content)
            .map_err(|e| FsError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Search, in order:
    /// 1. `./fileshare-mcp.toml`
    /// 2. `$XDG_CONFIG_HOME/fileshare-mcp/config.toml`
    /// 3. `~/.fileshare-mcp.toml`
    fn load_standard_locations() -> Self {
        let mut candidates = vec![PathBuf::from("fileshare-mcp.toml")];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("fileshare-mcp").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            candidates.push(home.join(".fileshare-mcp.toml"));
        }

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::read_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("Skipping config {}: {}", path.display(), e),
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }

    /// Expand `~`, drop blank exclusions and strip trailing separators.
    fn normalize(&mut self) {
        self.file_system_path = expand_home(self.file_system_path.trim());
        self.exclude_folders = self
            .exclude_folders
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| expand_home(p).trim_end_matches(['/', '\\']).to_string())
            .collect();
    }

    fn validate(&self) -> FsResult<()> {
        if self.file_system_path.is_empty() {
            return Err(FsError::Config(
                "File system path is not set (FILE_SYSTEM_PATH or --file-system-path)".into(),
            ));
        }
        Ok(())
    }
}

fn expand_home(path: &str) -> String {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return path.to_string(),
    };
    if path == "~" {
        home.display().to_string()
    } else if let Some(stripped) = path.strip_prefix("~/") {
        home.join(stripped).display().to_string()
    } else {
        path.to_string()
    }
}
