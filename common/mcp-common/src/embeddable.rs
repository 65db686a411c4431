//! In-process tool calls
//!
//! [`EmbeddableMcp`] lets a host (or an integration test) call a server's
//! tools directly, without a transport in between.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let server = FileShareMcpServer::with_config(config)?;
//! let names: Vec<_> = server.list_tools().into_iter().map(|t| t.name).collect();
//! let result = server
//!     .call_tool("list_folder", serde_json::json!({ "path": "docs" }))
//!     .await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments did not deserialize into the tool's parameter type
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The tool ran and returned an MCP error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

impl From<serde_json::Error> for EmbeddableError {
    fn from(err: serde_json::Error) -> Self {
        EmbeddableError::InvalidParams(err.to_string())
    }
}

pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// An MCP server whose tools can be called in-process
///
/// Servers built on `#[tool_router]` list tools from their router and
/// dispatch `call_tool` by name, deserializing `params` into the tool's
/// parameter type.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Name used for the server in MCP configuration
    fn server_name(&self) -> &str;

    fn list_tools(&self) -> Vec<Tool>;

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoServer;

    #[async_trait]
    impl EmbeddableMcp for EchoServer {
        fn server_name(&self) -> &str {
            "echo"
        }

        fn list_tools(&self) -> Vec<Tool> {
            vec![]
        }

        async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
            match name {
                "echo" => {
                    let text: String = serde_json::from_value(params)?;
                    Ok(crate::text_success(text))
                }
                _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let result = EchoServer.call_tool("missing", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_bad_params_are_invalid_params() {
        let result = EchoServer.call_tool("echo", serde_json::json!(42)).await;
        assert!(matches!(result, Err(EmbeddableError::InvalidParams(_))));
    }

    #[test]
    fn test_mcp_error_message_kept() {
        let err: EmbeddableError = crate::invalid_request("Access denied: secret").into();
        assert_eq!(err.to_string(), "mcp error: Access denied: secret");
    }
}
