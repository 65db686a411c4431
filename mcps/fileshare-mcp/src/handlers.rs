//! File share tool handlers
//!
//! The share itself is synchronous; each handler runs its operation on the
//! blocking pool, at most `max_concurrent_ops` at a time.

use std::sync::Arc;

use base64::Engine;
use mcp_common::{
    image_success, internal_error, invalid_params, invalid_request, json_success, text_success,
    CallToolResult, McpError,
};
use tokio::sync::Semaphore;

use crate::error::{FsError, FsResult};
use crate::limits::SizeLimitKind;
use crate::params::*;
use crate::share::FileShare;

// ============================================================================
// Helper Functions
// ============================================================================

pub fn fs_error_to_mcp(err: FsError) -> McpError {
    match &err {
        FsError::AccessDenied(_) | FsError::FileTooLarge { .. } => invalid_request(err.to_string()),
        FsError::NotFound(_)
        | FsError::TargetIsDirectory(_)
        | FsError::NotADirectory(_)
        | FsError::UnsupportedFormat(_) => invalid_params(err.to_string()),
        FsError::Config(_) | FsError::Io(_) => internal_error(err.to_string()),
    }
}

/// Shared handle to the share plus the in-flight operation limiter
#[derive(Clone)]
pub struct ShareContext {
    share: Arc<FileShare>,
    limiter: Option<Arc<Semaphore>>,
}

impl ShareContext {
    pub fn new(share: FileShare) -> Self {
        let limiter = match share.limits().max_concurrent_ops {
            0 => None,
            permits => Some(Arc::new(Semaphore::new(permits))),
        };
        Self {
            share: Arc::new(share),
            limiter,
        }
    }

    pub fn share(&self) -> &FileShare {
        &self.share
    }

    /// Run `op` on the blocking pool once a permit is free.
    async fn run<T, F>(&self, op: F) -> Result<T, McpError>
    where
        T: Send + 'static,
        F: FnOnce(&FileShare) -> FsResult<T> + Send + 'static,
    {
        let _permit = match &self.limiter {
            Some(limiter) => Some(
                limiter
                    .acquire()
                    .await
                    .map_err(|e| internal_error(format!("Operation limiter closed: {}", e)))?,
            ),
            None => None,
        };

        let share = Arc::clone(&self.share);
        tokio::task::spawn_blocking(move || op(&share))
            .await
            .map_err(|e| internal_error(format!("File share task failed: {}", e)))?
            .map_err(fs_error_to_mcp)
    }
}

// ============================================================================
// Handler Functions
// ============================================================================

pub async fn list_folder(
    ctx: &ShareContext,
    params: ListFolderParams,
) -> Result<CallToolResult, McpError> {
    let listing = ctx
        .run(move |share| share.list_folder(&params.path, params.limit))
        .await?;
    json_success(&listing)
}

pub async fn get_metadata(
    ctx: &ShareContext,
    params: PathParams,
) -> Result<CallToolResult, McpError> {
    let result = ctx.run(move |share| share.metadata(&params.path)).await?;
    json_success(&result)
}

pub async fn get_content_raw(
    ctx: &ShareContext,
    params: PathParams,
) -> Result<CallToolResult, McpError> {
    let text = ctx
        .run(move |share| share.read_text(&params.path, SizeLimitKind::Return))
        .await?;
    Ok(text_success(text))
}

pub async fn get_content_base64(
    ctx: &ShareContext,
    params: PathParams,
) -> Result<CallToolResult, McpError> {
    let bytes = ctx
        .run(move |share| share.read_bytes(&params.path, SizeLimitKind::Return))
        .await?;
    Ok(text_success(
        base64::engine::general_purpose::STANDARD.encode(bytes),
    ))
}

pub async fn get_image_content(
    ctx: &ShareContext,
    params: ImageContentParams,
) -> Result<CallToolResult, McpError> {
    let image = ctx
        .run(move |share| share.image_content(&params.path, params.thumb_width))
        .await?;
    Ok(image_success(&image.data, image.mime_type))
}

pub async fn get_content_as_extracted_text(
    ctx: &ShareContext,
    params: PathParams,
) -> Result<CallToolResult, McpError> {
    let text = ctx.run(move |share| share.extract_text(&params.path)).await?;
    Ok(text_success(text))
}
