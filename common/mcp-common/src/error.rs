//! MCP error constructors
//!
//! Tool handlers pick the constructor by who is at fault: the request itself
//! (`invalid_request`), one of its arguments (`invalid_params`), or the
//! server (`internal_error`).

use rmcp::ErrorData as McpError;

pub type McpResult<T> = Result<T, McpError>;

/// Server-side failure unrelated to the request
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// An argument names something that does not exist or has the wrong shape
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

/// The request is well-formed but not allowed, e.g. a denied path or a size
/// ceiling
pub fn invalid_request(message: impl Into<String>) -> McpError {
    McpError::invalid_request(message.into(), None)
}
