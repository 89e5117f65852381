//! HTTP adapters built on a shared `reqwest` client.

mod downloader;
mod emoji_cdn;

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

pub use downloader::HttpImageDownloader;
pub use emoji_cdn::EmojiCdnSource;

use crate::infrastructure::config::HttpConfig;

/// HTTP setup errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Builds the client every adapter shares.
///
/// # Errors
/// Returns error if the TLS backend cannot be initialised.
pub fn build_client(config: &HttpConfig) -> Result<Client, HttpError> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}
