// ABOUTME: Image operations trait for container engines.
// ABOUTME: Pull a source image, tag it under a new name, push the new name.

use crate::types::ImageReference;
use async_trait::async_trait;
use std::time::Duration;

/// Image operations the sync pipeline needs from an engine.
///
/// Implementations must be safe to call from several workers at once; the
/// daemon behind them serializes conflicting operations itself.
#[async_trait]
pub trait ImageOps: Send + Sync {
    /// Pull an image from its registry.
    async fn pull_image(&self, reference: &ImageReference) -> Result<(), ImageError>;

    /// Add `target` as a new name for the local image `source`.
    async fn tag_image(
        &self,
        source: &ImageReference,
        target: &ImageReference,
    ) -> Result<(), ImageError>;

    /// Push an image to the registry its name points at.
    async fn push_image(&self, reference: &ImageReference) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("authentication failed for registry: {0}")]
    AuthenticationFailed(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("tag failed: {0}")]
    TagFailed(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("{operation} of {image} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        image: String,
        timeout: Duration,
    },
}
