use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::trace;

use crate::domain::ports::{DownloadError, ImageDownloadPort};

/// Downloads image bytes over HTTP.
#[derive(Debug, Clone)]
pub struct HttpImageDownloader {
    client: Client,
}

impl HttpImageDownloader {
    /// Downloader over a shared client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageDownloadPort for HttpImageDownloader {
    async fn download(&self, url: &str) -> Result<Bytes, DownloadError> {
        trace!(url = %url, "Downloading image");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|e| DownloadError::Body(e.to_string()))
    }
}
