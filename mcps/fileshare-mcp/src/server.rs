//! MCP Server implementation for the read-only file share
//!
//! This module defines the MCP server that exposes the share as tools.
//! Handler implementations are in the handlers module.

use mcp_common::{
    async_trait, CallToolResult, EmbeddableError, EmbeddableMcp, EmbeddableResult, McpError, Tool,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use serde_json::Value;

use crate::config::Config;
use crate::error::FsError;
use crate::handlers::{self, ShareContext};
use crate::params::*;
use crate::share::FileShare;

/// The File Share MCP Server
#[derive(Clone)]
pub struct FileShareMcpServer {
    ctx: ShareContext,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router - Each tool delegates to its handler
// ============================================================================

#[tool_router]
impl FileShareMcpServer {
    /// Create a server from the command line, environment and config file
    pub fn try_new() -> Result<Self, FsError> {
        Self::with_config(Config::load()?)
    }

    /// Create a server with explicit config
    pub fn with_config(config: Config) -> Result<Self, FsError> {
        let share = FileShare::new(&config)?;
        tracing::info!(
            "Limits: scan {} entries, return {} bytes, read {} bytes, {} concurrent ops",
            config.limits.max_scan_items,
            config.limits.max_return_file_size,
            config.limits.max_read_file_size,
            config.limits.max_concurrent_ops
        );

        Ok(Self {
            ctx: ShareContext::new(share),
            tool_router: Self::tool_router(),
        })
    }

    pub fn share(&self) -> &FileShare {
        self.ctx.share()
    }

    #[tool(
        description = "List the files and subfolders directly inside a folder of the share. Returns JSON with the folder, its subfolders and files (name, path, size, is_too_large, is_supported_image, supports_text_extraction) and a truncated flag set when the entry limit cut the listing short."
    )]
    async fn list_folder(
        &self,
        Parameters(params): Parameters<ListFolderParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::list_folder(&self.ctx, params).await
    }

    #[tool(
        description = "Get details for a file: size, modification time and format metadata such as image dimensions, PDF page count or document properties."
    )]
    async fn get_metadata(
        &self,
        Parameters(params): Parameters<PathParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_metadata(&self.ctx, params).await
    }

    #[tool(
        description = "Get the content of a file as text. Invalid UTF-8 is replaced. Fails for files above the return size limit."
    )]
    async fn get_content_raw(
        &self,
        Parameters(params): Parameters<PathParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_content_raw(&self.ctx, params).await
    }

    #[tool(
        description = "Get the content of a file as standard base64. Fails for files above the return size limit."
    )]
    async fn get_content_base64(
        &self,
        Parameters(params): Parameters<PathParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_content_base64(&self.ctx, params).await
    }

    #[tool(
        description = "Get a PNG or JPEG image. With thumb_width the image is shrunk to fit that many pixels, which also works for images above the return size limit."
    )]
    async fn get_image_content(
        &self,
        Parameters(params): Parameters<ImageContentParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_image_content(&self.ctx, params).await
    }

    #[tool(
        description = "Get the readable text of a document. PDF and DOCX files get text extraction; other files are read as UTF-8 text."
    )]
    async fn get_content_as_extracted_text(
        &self,
        Parameters(params): Parameters<PathParams>,
    ) -> Result<CallToolResult, McpError> {
        handlers::get_content_as_extracted_text(&self.ctx, params).await
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for FileShareMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Read-only file share. Paths are relative to the share root and \
                 '/'-delimited; an empty path or '/' names the root. Paths outside \
                 the root and excluded folders are denied. Use list_folder to browse, \
                 get_metadata for details, and the get_content_* tools for content."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// In-process calls
// ============================================================================

#[async_trait]
impl EmbeddableMcp for FileShareMcpServer {
    fn server_name(&self) -> &str {
        "fileshare"
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "list_folder" => {
                let params: ListFolderParams = serde_json::from_value(params)?;
                self.list_folder(Parameters(params)).await.map_err(Into::into)
            }

            "get_metadata" => {
                let params: PathParams = serde_json::from_value(params)?;
                self.get_metadata(Parameters(params)).await.map_err(Into::into)
            }

            "get_content_raw" => {
                let params: PathParams = serde_json::from_value(params)?;
                self.get_content_raw(Parameters(params)).await.map_err(Into::into)
            }

            "get_content_base64" => {
                let params: PathParams = serde_json::from_value(params)?;
                self.get_content_base64(Parameters(params))
                    .await
                    .map_err(Into::into)
            }

            "get_image_content" => {
                let params: ImageContentParams = serde_json::from_value(params)?;
                self.get_image_content(Parameters(params))
                    .await
                    .map_err(Into::into)
            }

            "get_content_as_extracted_text" => {
                let params: PathParams = serde_json::from_value(params)?;
                self.get_content_as_extracted_text(Parameters(params))
                    .await
                    .map_err(Into::into)
            }

            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }
}
