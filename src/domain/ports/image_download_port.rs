//! Port for raw image downloads.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Transport-level download failures.
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Request(String),
    /// The server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),
    /// The body could not be read.
    #[error("failed to read body: {0}")]
    Body(String),
}

/// Downloads the bytes behind a URL.
#[async_trait]
pub trait ImageDownloadPort: Send + Sync {
    /// Fetches the full response body.
    async fn download(&self, url: &str) -> Result<Bytes, DownloadError>;
}
