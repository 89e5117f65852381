mod emoji_source_port;
mod image_download_port;
mod pool_store_port;
mod source_scraper_port;

pub use emoji_source_port::EmojiSourcePort;
pub use image_download_port::{DownloadError, ImageDownloadPort};
pub use pool_store_port::{PoolStoreError, PoolStorePort};
pub use source_scraper_port::{ScrapeOutcome, SourceScraperPort};

#[cfg(test)]
pub mod mocks {
    pub use super::emoji_source_port::mock::SolidEmojiSource;
    pub use super::image_download_port::mock::{MockDownloader, png_bytes};
    pub use super::pool_store_port::mock::MemoryPoolStore;
    pub use super::source_scraper_port::mock::MockScraper;
}
