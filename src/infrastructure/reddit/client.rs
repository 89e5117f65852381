use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use super::dto::ListingResponse;
use crate::domain::entities::ImageFileType;
use crate::domain::ports::{ScrapeOutcome, SourceScraperPort};

const REDDIT_BASE: &str = "https://www.reddit.com";

/// Scrapes image links from subreddit listings.
#[derive(Debug, Clone)]
pub struct RedditScraper {
    client: Client,
    base_url: String,
}

impl RedditScraper {
    /// Creates a scraper against the public site.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, REDDIT_BASE)
    }

    /// Creates a scraper against another host, e.g. a mirror.
    #[must_use]
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn listing_url(&self, source: &str) -> String {
        format!("{}/r/{source}.json", self.base_url)
    }
}

#[async_trait]
impl SourceScraperPort for RedditScraper {
    async fn scrape(&self, source: &str) -> ScrapeOutcome {
        let url = self.listing_url(source);
        debug!(source = %source, url = %url, "Fetching listing");

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(source = %source, error = %e, "Listing request failed");
                return ScrapeOutcome::failed(0);
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            return ScrapeOutcome::failed(status.as_u16());
        }

        match response.json::<ListingResponse>().await {
            Ok(listing) => ScrapeOutcome::ok(image_urls(listing)),
            Err(e) => {
                warn!(source = %source, error = %e, "Listing could not be parsed");
                ScrapeOutcome::failed(0)
            }
        }
    }
}

/// Keeps the links whose path ends in a supported image extension.
fn image_urls(listing: ListingResponse) -> Vec<String> {
    listing
        .urls()
        .filter(|url| ImageFileType::from_url(url).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_x",
            "children": [
                {"kind": "t3", "data": {"url": "https://i.redd.it/one.jpg", "title": "a"}},
                {"kind": "t3", "data": {"url": "https://v.redd.it/clip"}},
                {"kind": "t3", "data": {"url": "https://i.imgur.com/two.PNG?x=1"}},
                {"kind": "t3", "data": {"url": null}},
                {"kind": "t3", "data": {"title": "self post"}},
                {"kind": "t3", "data": {"url": "https://i.redd.it/anim.gif"}}
            ]
        }
    }"#;

    #[test]
    fn test_listing_keeps_only_image_links() {
        let listing: ListingResponse = serde_json::from_str(LISTING).unwrap();

        assert_eq!(
            image_urls(listing),
            ["https://i.redd.it/one.jpg", "https://i.imgur.com/two.PNG?x=1"]
        );
    }

    #[test]
    fn test_listing_without_children() {
        let listing: ListingResponse = serde_json::from_str(r#"{"data": {}}"#).unwrap();
        assert!(image_urls(listing).is_empty());
    }

    #[test]
    fn test_listing_url() {
        let scraper = RedditScraper::with_base_url(Client::new(), "http://localhost:8080/");
        assert_eq!(scraper.listing_url("memes"), "http://localhost:8080/r/memes.json");
    }
}
