//! Self-refreshing cache of random image URLs.
//!
//! Scraped URLs move through three pools: `unused` until first served, then
//! `used`, or `bad` once they fail. A URL lives in at most one pool. Culling
//! keeps every pool under the size limit, so bad URLs are eventually forgotten
//! and may be rediscovered by a later scrape.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::image_fetcher::ImageFetcher;
use crate::domain::entities::{CachePool, PoolKind, RenderableImage, timestamp_now};
use crate::domain::errors::MemeError;
use crate::domain::ports::{PoolStoreError, PoolStorePort, SourceScraperPort};

/// Knobs for a single [`RandomImageCache::update_cache`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Minimum seconds between passes. Negative disables throttling.
    pub wait_sec: i64,
    /// Ignore the throttle while the unused pool is empty.
    pub force_if_empty: bool,
    /// Scrape sources in random order.
    pub shuffle_first: bool,
    /// Abort the pass on the first failed scrape.
    pub stop_first_failure: bool,
    /// Trim pools to the size limit afterwards.
    pub cull: bool,
    /// Write all pools to the store afterwards.
    pub persist: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            wait_sec: -1,
            force_if_empty: true,
            shuffle_first: true,
            stop_first_failure: false,
            cull: true,
            persist: true,
        }
    }
}

impl UpdateOptions {
    /// Throttled variant used for the refresh after each request.
    #[must_use]
    pub fn throttled(wait_sec: u64) -> Self {
        Self {
            wait_sec: i64::try_from(wait_sec).unwrap_or(i64::MAX),
            ..Self::default()
        }
    }
}

/// Outcome of an update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// The pass was throttled and did nothing.
    pub skipped: bool,
    /// Sources that answered with the OK status.
    pub sources_ok: usize,
    /// Sources that failed.
    pub sources_failed: usize,
    /// URLs newly inserted into the unused pool.
    pub urls_added: usize,
}

impl UpdateReport {
    const fn skipped() -> Self {
        Self {
            skipped: true,
            sources_ok: 0,
            sources_failed: 0,
            urls_added: 0,
        }
    }
}

/// Pool sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// URLs waiting to be served.
    pub unused: usize,
    /// URLs already served at least once.
    pub used: usize,
    /// URLs that failed to download or decode.
    pub bad: usize,
}

impl std::fmt::Display for PoolStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unused={} used={} bad={}",
            self.unused, self.used, self.bad
        )
    }
}

#[derive(Debug, Default)]
struct CacheState {
    unused: CachePool,
    used: CachePool,
    bad: CachePool,
    last_update: Option<Instant>,
}

impl CacheState {
    const fn pool(&self, kind: PoolKind) -> &CachePool {
        match kind {
            PoolKind::Unused => &self.unused,
            PoolKind::Used => &self.used,
            PoolKind::Bad => &self.bad,
        }
    }

    const fn pool_mut(&mut self, kind: PoolKind) -> &mut CachePool {
        match kind {
            PoolKind::Unused => &mut self.unused,
            PoolKind::Used => &mut self.used,
            PoolKind::Bad => &mut self.bad,
        }
    }

    fn preferred_pool(&self) -> Option<PoolKind> {
        if !self.unused.is_empty() {
            Some(PoolKind::Unused)
        } else if !self.used.is_empty() {
            Some(PoolKind::Used)
        } else {
            None
        }
    }

    fn stats(&self) -> PoolStats {
        PoolStats {
            unused: self.unused.len(),
            used: self.used.len(),
            bad: self.bad.len(),
        }
    }

    /// Drops URLs that appear in more than one pool, keeping bad over used over unused.
    fn enforce_exclusivity(&mut self) -> usize {
        let mut removed = 0;
        let bad: Vec<String> = self.bad.urls().map(String::from).collect();
        for url in &bad {
            removed += usize::from(self.used.remove(url).is_some());
            removed += usize::from(self.unused.remove(url).is_some());
        }
        let used: Vec<String> = self.used.urls().map(String::from).collect();
        for url in &used {
            removed += usize::from(self.unused.remove(url).is_some());
        }
        removed
    }
}

/// Random image cache shared by every request of a long-running process.
///
/// One lock guards the three pools and the last update instant. It is held for
/// a whole update pass or a whole random selection loop, so a URL can never be
/// handed out while a pass is rewriting the pools.
pub struct RandomImageCache {
    store: Arc<dyn PoolStorePort>,
    scraper: Arc<dyn SourceScraperPort>,
    fetcher: ImageFetcher,
    size_limit: usize,
    state: Mutex<CacheState>,
}

impl std::fmt::Debug for RandomImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomImageCache")
            .field("size_limit", &self.size_limit)
            .finish_non_exhaustive()
    }
}

impl RandomImageCache {
    /// Loads all three pools from the store.
    ///
    /// # Errors
    /// Returns error if a pool cannot be read.
    pub async fn open(
        store: Arc<dyn PoolStorePort>,
        scraper: Arc<dyn SourceScraperPort>,
        fetcher: ImageFetcher,
        size_limit: usize,
    ) -> Result<Self, PoolStoreError> {
        let mut state = CacheState {
            unused: store.load(PoolKind::Unused).await?,
            used: store.load(PoolKind::Used).await?,
            bad: store.load(PoolKind::Bad).await?,
            last_update: None,
        };

        let duplicates = state.enforce_exclusivity();
        if duplicates > 0 {
            warn!(count = duplicates, "Dropped URLs stored in more than one pool");
        }

        info!(stats = %state.stats(), limit = size_limit, "Opened random image cache");

        Ok(Self {
            store,
            scraper,
            fetcher,
            size_limit,
            state: Mutex::new(state),
        })
    }

    /// Scrapes every source and merges new URLs into the unused pool.
    ///
    /// The pass is skipped when fewer than `wait_sec` seconds have elapsed since
    /// the previous pass started, unless `force_if_empty` is set and the unused
    /// pool is empty. Persistence failures are logged and never returned.
    pub async fn update_cache(&self, sources: &[String], options: UpdateOptions) -> UpdateReport {
        let mut state = self.state.lock().await;

        if let Some(last) = state.last_update
            && (last.elapsed().as_secs_f64() < options.wait_sec as f64)
            && !(options.force_if_empty && state.unused.is_empty())
        {
            debug!(wait_sec = options.wait_sec, "Cache update throttled");
            return UpdateReport::skipped();
        }

        state.last_update = Some(Instant::now());

        let mut order = sources.to_vec();
        if options.shuffle_first {
            fastrand::shuffle(&mut order);
        }

        let mut report = UpdateReport::default();

        for source in &order {
            let outcome = self.scraper.scrape(source).await;

            if !outcome.is_success() {
                report.sources_failed += 1;
                info!(source = %source, status = outcome.status, "Source scrape failed");
                if options.stop_first_failure {
                    break;
                }
                continue;
            }

            report.sources_ok += 1;
            let timestamp = timestamp_now();
            let mut added = 0;

            for url in outcome.urls {
                if state.bad.contains(&url) || state.used.contains(&url) {
                    continue;
                }
                if !state.unused.contains(&url) {
                    added += 1;
                }
                state.unused.insert(url, timestamp);
            }

            report.urls_added += added;
            info!(source = %source, added = added, "Source scraped");
        }

        if options.cull {
            for kind in PoolKind::ALL {
                let culled = state.pool_mut(kind).cull(self.size_limit);
                if culled > 0 {
                    debug!(pool = %kind, culled = culled, "Culled pool");
                }
            }
        }

        if options.persist {
            self.persist(&state).await;
        }

        info!(
            stats = %state.stats(),
            ok = report.sources_ok,
            failed = report.sources_failed,
            added = report.urls_added,
            "Cache update finished"
        );

        report
    }

    /// Serves a random cached image, preferring never-served URLs.
    ///
    /// Each failed attempt moves its URL to the bad pool and the pool preference
    /// is re-evaluated before the next attempt. A success from the unused pool
    /// moves the URL to the used pool.
    ///
    /// # Errors
    /// Returns `RandomCacheExhausted` when the pools are empty or every attempt fails.
    pub async fn download_random_image(
        &self,
        min_width: u32,
        force_width: u32,
        attempts: u32,
    ) -> Result<RenderableImage, MemeError> {
        let mut state = self.state.lock().await;
        let attempts = attempts.max(1);

        for attempt in 1..=attempts {
            let Some(kind) = state.preferred_pool() else {
                break;
            };
            let Some(url) = state.pool(kind).random_url() else {
                break;
            };

            match self.fetcher.fetch(&url, min_width, force_width).await {
                Ok(image) => {
                    if kind == PoolKind::Unused {
                        state.unused.remove(&url);
                        state.used.insert(url.clone(), timestamp_now());
                    }
                    debug!(url = %url, pool = %kind, attempt = attempt, "Served random image");
                    return Ok(image);
                }
                Err(e) => {
                    info!(
                        url = %url,
                        attempt = attempt,
                        attempts = attempts,
                        error = %e,
                        "Random image download failed"
                    );
                    state.pool_mut(kind).remove(&url);
                    state.bad.insert(url, timestamp_now());
                }
            }
        }

        Err(MemeError::RandomCacheExhausted)
    }

    /// Fetches a specific URL without touching the pools.
    ///
    /// # Errors
    /// Returns the fetcher's error.
    pub async fn download_image(
        &self,
        url: &str,
        min_width: u32,
        force_width: u32,
    ) -> Result<RenderableImage, MemeError> {
        self.fetcher.fetch(url, min_width, force_width).await
    }

    /// Runs a full update, then keeps retrying after `retry_delay` while the
    /// unused pool is still empty. `max_rounds` bounds the retries.
    pub async fn warm_up(
        &self,
        sources: &[String],
        retry_delay: Duration,
        max_rounds: Option<u32>,
    ) -> PoolStats {
        let mut rounds = 0u32;

        loop {
            self.update_cache(sources, UpdateOptions::default()).await;
            rounds += 1;

            let stats = self.stats().await;
            if stats.unused > 0 || max_rounds.is_some_and(|max| rounds >= max) {
                return stats;
            }

            warn!(
                round = rounds,
                retry_in = ?retry_delay,
                "Random image cache still empty after update"
            );
            tokio::time::sleep(retry_delay).await;
        }
    }

    /// Writes every pool to the store.
    ///
    /// # Errors
    /// Returns the first store error.
    pub async fn flush(&self) -> Result<(), PoolStoreError> {
        let state = self.state.lock().await;
        for kind in PoolKind::ALL {
            self.store.save(kind, state.pool(kind)).await?;
        }
        debug!(stats = %state.stats(), "Flushed cache pools");
        Ok(())
    }

    /// Current pool sizes.
    pub async fn stats(&self) -> PoolStats {
        self.state.lock().await.stats()
    }

    async fn persist(&self, state: &CacheState) {
        for kind in PoolKind::ALL {
            if let Err(e) = self.store.save(kind, state.pool(kind)).await {
                warn!(pool = %kind, error = %e, "Failed to persist cache pool");
            }
        }
    }
}
