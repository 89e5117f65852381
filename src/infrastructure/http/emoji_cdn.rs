//! Emoji artwork from an emoji image CDN.

use std::collections::HashMap;

use async_trait::async_trait;
use image::RgbaImage;
use reqwest::{Client, Url};
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::ports::EmojiSourcePort;
use crate::infrastructure::config::EmojiStyle;

/// Fetches `{base}/{emoji}?style={style}` and remembers every answer,
/// including misses, for the lifetime of the process.
#[derive(Debug)]
pub struct EmojiCdnSource {
    client: Client,
    base_url: String,
    style: EmojiStyle,
    cache: RwLock<HashMap<String, Option<RgbaImage>>>,
}

impl EmojiCdnSource {
    /// Source for `base_url` serving `style` artwork.
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>, style: EmojiStyle) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            style,
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn download(&self, emoji: &str) -> Option<RgbaImage> {
        let url = emoji_url(&self.base_url, emoji, self.style)?;

        let response = match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(emoji = %emoji, status = %response.status(), "Emoji not available");
                return None;
            }
            Err(e) => {
                debug!(emoji = %emoji, error = %e, "Emoji request failed");
                return None;
            }
        };

        let bytes = response.bytes().await.ok()?;
        tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|img| img.into_rgba8()))
            .await
            .ok()?
            .inspect_err(|e| debug!(emoji = %emoji, error = %e, "Emoji image could not be decoded"))
            .ok()
    }
}

#[async_trait]
impl EmojiSourcePort for EmojiCdnSource {
    async fn fetch(&self, emoji: &str) -> Option<RgbaImage> {
        if let Some(cached) = self.cache.read().await.get(emoji) {
            return cached.clone();
        }

        let art = self.download(emoji).await;
        self.cache
            .write()
            .await
            .insert(emoji.to_string(), art.clone());
        art
    }
}

fn emoji_url(base_url: &str, emoji: &str, style: EmojiStyle) -> Option<Url> {
    let mut url = Url::parse(base_url).ok()?;
    url.path_segments_mut().ok()?.pop_if_empty().push(emoji);
    url.query_pairs_mut().append_pair("style", style.as_str());
    Some(url)
}
