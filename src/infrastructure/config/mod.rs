//! Application configuration.

pub mod app_config;
pub mod args;
pub mod fonts;
pub mod storage;

pub use app_config::{AppConfig, CacheConfig, EmojiStyle, FontConfig, HttpConfig, ImageConfig, LogLevel};
pub use args::{CliArgs, CliCommand, CommonArgs};
pub use fonts::load_font;
pub use storage::{ConfigError, StorageManager};
