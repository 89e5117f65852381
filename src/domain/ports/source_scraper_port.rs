//! Port for scraping candidate image URLs from a content source.

use async_trait::async_trait;

/// Result of scraping one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeOutcome {
    /// HTTP status of the listing request, 0 if no response was received.
    pub status: u16,
    /// Candidate image URLs. Empty unless the status is OK.
    pub urls: Vec<String>,
}

impl ScrapeOutcome {
    /// The only status treated as success.
    pub const STATUS_OK: u16 = 200;

    /// Successful scrape.
    #[must_use]
    pub const fn ok(urls: Vec<String>) -> Self {
        Self {
            status: Self::STATUS_OK,
            urls,
        }
    }

    /// Failed scrape with the given status.
    #[must_use]
    pub const fn failed(status: u16) -> Self {
        Self {
            status,
            urls: Vec::new(),
        }
    }

    /// Returns true for the OK status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status == Self::STATUS_OK
    }
}

/// Fetches the listing of a source (e.g. a subreddit).
#[async_trait]
pub trait SourceScraperPort: Send + Sync {
    /// Scrapes one source. Never fails; failures are reported through the status.
    async fn scrape(&self, source: &str) -> ScrapeOutcome;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scraper returning canned outcomes. Unknown sources fail with 404.
    #[derive(Default)]
    pub struct MockScraper {
        outcomes: Mutex<HashMap<String, ScrapeOutcome>>,
        calls: AtomicUsize,
        order: Mutex<Vec<String>>,
    }

    impl MockScraper {
        /// Creates an empty mock.
        pub fn new() -> Self {
            Self::default()
        }

        /// Registers an outcome for a source.
        pub fn with(self, source: &str, outcome: ScrapeOutcome) -> Self {
            self.outcomes
                .lock()
                .unwrap()
                .insert(source.to_string(), outcome);
            self
        }

        /// Number of scrape calls made.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Sources in the order they were scraped.
        pub fn scraped(&self) -> Vec<String> {
            self.order.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SourceScraperPort for MockScraper {
        async fn scrape(&self, source: &str) -> ScrapeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.order.lock().unwrap().push(source.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .get(source)
                .cloned()
                .unwrap_or_else(|| ScrapeOutcome::failed(404))
        }
    }
}
