//! MCP Common - shared pieces for the MCP server binaries
//!
//! - **Initialization**: tracing setup and the `serve_stdio!` macro
//! - **Results**: `CallToolResult` constructors
//! - **Errors**: MCP error constructors
//! - **Embeddable**: [`EmbeddableMcp`] for in-process tool calls
//! - **Images** (`image-processing` feature): thumbnails and image results
//!
//! ```rust,ignore
//! // main.rs
//! mcp_common::serve_stdio!(FileShareMcpServer, "fileshare_mcp");
//! ```

pub mod embeddable;
pub mod error;
#[cfg(feature = "image-processing")]
pub mod imaging;
pub mod init;
pub mod result;

pub use embeddable::{EmbeddableError, EmbeddableMcp, EmbeddableResult};
pub use error::{internal_error, invalid_params, invalid_request, McpResult};
#[cfg(feature = "image-processing")]
pub use imaging::{image_success, thumbnail, ThumbnailError, ThumbnailFormat};
pub use init::init_tracing;
pub use result::{json_success, text_success};

pub use rmcp::{
    model::{CallToolResult, Content, Tool},
    ErrorData as McpError,
};

pub use async_trait::async_trait;
