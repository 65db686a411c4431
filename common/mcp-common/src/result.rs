//! `CallToolResult` constructors for tool handlers

use rmcp::{
    model::{CallToolResult, Content},
    ErrorData as McpError,
};
use serde::Serialize;

/// Pretty-printed JSON of `data` as a single text item
///
/// ```rust,ignore
/// fn list_folder(&self) -> Result<CallToolResult, McpError> {
///     let listing = self.share.list_folder("", None)?;
///     json_success(&listing)
/// }
/// ```
pub fn json_success<T: Serialize>(data: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Plain text as a single text item
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;
    use std::collections::BTreeMap;

    fn text_of(result: &CallToolResult) -> &str {
        match &result.content[0].raw {
            RawContent::Text(t) => t.text.as_str(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    #[test]
    fn test_json_success() {
        let data = BTreeMap::from([("size", 10)]);
        let result = json_success(&data).unwrap();
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(result.content.len(), 1);
        assert!(text_of(&result).contains("\"size\": 10"));
    }

    #[test]
    fn test_text_success() {
        let result = text_success("0123456789");
        assert!(!result.is_error.unwrap_or(false));
        assert_eq!(text_of(&result), "0123456789");
    }
}
