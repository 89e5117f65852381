//! Cache entries and the URL-keyed pools that hold them.

use std::collections::HashMap;
use std::fmt;

/// The three partitions of the random image cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    /// Scraped but never served.
    Unused,
    /// Served at least once.
    Used,
    /// Failed to download or decode.
    Bad,
}

impl PoolKind {
    /// Every pool, in persistence order.
    pub const ALL: [Self; 3] = [Self::Unused, Self::Used, Self::Bad];

    /// Returns the lowercase pool name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unused => "unused",
            Self::Used => "used",
            Self::Bad => "bad",
        }
    }
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cached image URL and the time (unix nanoseconds) it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Image URL, the identity of the entry.
    pub url: String,
    /// Unix timestamp in nanoseconds.
    pub timestamp: i64,
}

impl CacheEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(url: impl Into<String>, timestamp: i64) -> Self {
        Self {
            url: url.into(),
            timestamp,
        }
    }
}

/// Current wall-clock time as unix nanoseconds.
#[must_use]
pub fn timestamp_now() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
}

/// URL to timestamp mapping for a single pool. Iteration order is unspecified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePool {
    entries: HashMap<String, i64>,
}

impl CachePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of URLs in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the pool holds no URLs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if the URL is in the pool.
    #[must_use]
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    /// Timestamp recorded for the URL.
    #[must_use]
    pub fn get(&self, url: &str) -> Option<i64> {
        self.entries.get(url).copied()
    }

    /// Inserts or refreshes a URL.
    pub fn insert(&mut self, url: impl Into<String>, timestamp: i64) {
        self.entries.insert(url.into(), timestamp);
    }

    /// Removes a URL, returning its timestamp if it was present.
    pub fn remove(&mut self, url: &str) -> Option<i64> {
        self.entries.remove(url)
    }

    /// Iterates over all entries.
    pub fn iter(&self) -> impl Iterator<Item = CacheEntry> + '_ {
        self.entries
            .iter()
            .map(|(url, ts)| CacheEntry::new(url.clone(), *ts))
    }

    /// Iterates over the URLs.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Picks one URL uniformly at random.
    #[must_use]
    pub fn random_url(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let index = fastrand::usize(..self.entries.len());
        self.entries.keys().nth(index).cloned()
    }

    /// Removes a uniformly random sample of URLs until at most `limit` remain.
    /// Returns the number of URLs removed.
    pub fn cull(&mut self, limit: usize) -> usize {
        let excess = self.entries.len().saturating_sub(limit);
        if excess == 0 {
            return 0;
        }

        let doomed = fastrand::choose_multiple(self.entries.keys().cloned(), excess);
        for url in &doomed {
            self.entries.remove(url);
        }
        doomed.len()
    }
}

impl FromIterator<CacheEntry> for CachePool {
    fn from_iter<T: IntoIterator<Item = CacheEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|e| (e.url, e.timestamp)).collect(),
        }
    }
}
