//! Application services.

pub mod image_fetcher;
pub mod random_image_cache;
pub mod text_layout;

pub use image_fetcher::ImageFetcher;
pub use random_image_cache::{PoolStats, RandomImageCache, UpdateOptions, UpdateReport};
