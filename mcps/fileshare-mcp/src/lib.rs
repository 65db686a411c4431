//! File Share MCP Library
//!
//! Read-only view of one directory tree for tool-calling clients: folder
//! listings, file metadata and file content, confined to a root directory
//! minus a set of excluded folders, with separate size ceilings for content
//! returned directly and content read for text extraction or thumbnails.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use fileshare_mcp::{Config, FileShare, SizeLimitKind};
//!
//! let share = FileShare::new(&Config::for_root("/data"))?;
//! let listing = share.list_folder("docs", None)?;
//! let bytes = share.read_bytes("docs/a.txt", SizeLimitKind::Return)?;
//! ```

pub mod access;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod limits;
pub mod metadata;
pub mod params;
pub mod sandbox;
pub mod scanner;
pub mod server;
pub mod share;
pub mod types;

pub use config::Config;
pub use error::{FsError, FsResult};
pub use limits::SizeLimitKind;
pub use server::FileShareMcpServer;
pub use share::FileShare;

// Re-export parameter types for direct API usage
pub use params::*;
