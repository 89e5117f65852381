//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// HTTP image downloads and emoji artwork.
pub mod http;
/// Reddit listing scraper.
pub mod reddit;
/// File-backed pool store and source list.
pub mod storage;

pub use config::{AppConfig, CliArgs, CliCommand, ConfigError, EmojiStyle, LogLevel, StorageManager};
pub use http::{EmojiCdnSource, HttpError, HttpImageDownloader, build_client};
pub use reddit::RedditScraper;
pub use storage::{CsvPoolStore, load_source_list};
