//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::args::{CliArgs, CommonArgs};

pub(crate) const APP_NAME: &str = "memeoff";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "r3w0p";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Emoji artwork set requested from the emoji CDN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmojiStyle {
    /// Apple artwork.
    #[default]
    Apple,
    /// Google artwork.
    Google,
    /// Facebook artwork.
    Facebook,
    /// Twitter artwork.
    Twitter,
}

impl EmojiStyle {
    /// Value of the CDN `style` query parameter.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Google => "google",
            Self::Facebook => "facebook",
            Self::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for EmojiStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration.
///
/// Relative paths are resolved against the directory of the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(skip)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// File with one content source per line.
    #[serde(default = "default_source_list")]
    pub source_list: PathBuf,

    /// Emoji artwork style.
    #[serde(default)]
    pub emoji_style: EmojiStyle,

    /// Random image cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Source image limits.
    #[serde(default)]
    pub images: ImageConfig,

    /// Font locations per format.
    #[serde(default)]
    pub fonts: FontConfig,

    /// Outbound HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Random image cache configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory holding `unused.csv`, `used.csv` and `bad.csv`.
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,

    /// Maximum entries per pool.
    #[serde(default = "default_size_limit")]
    pub size_limit: usize,

    /// Minimum seconds between refreshes triggered by requests.
    #[serde(default = "default_refresh_wait")]
    pub refresh_wait_sec: u64,

    /// Seconds between startup refreshes while the cache is empty.
    #[serde(default = "default_warm_up_retry")]
    pub warm_up_retry_sec: u64,

    /// Give up warming up after this many refreshes. Unset retries forever.
    #[serde(default)]
    pub warm_up_rounds: Option<u32>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            size_limit: default_size_limit(),
            refresh_wait_sec: default_refresh_wait(),
            warm_up_retry_sec: default_warm_up_retry(),
            warm_up_rounds: None,
        }
    }
}

/// Source image limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Images narrower than this are rejected. Zero disables the check.
    #[serde(default = "default_min_width")]
    pub min_width: u32,

    /// Images are resized to exactly this width. Zero disables resizing.
    #[serde(default = "default_force_width")]
    pub force_width: u32,

    /// Tries per random image request.
    #[serde(default = "default_random_attempts")]
    pub random_attempts: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_width(),
            force_width: default_force_width(),
            random_attempts: default_random_attempts(),
        }
    }
}

/// Font file, or directory with exactly one font file, per format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Impact captions.
    #[serde(default = "default_font_impact")]
    pub impact: PathBuf,
    /// Twitter cards.
    #[serde(default = "default_font_twitter")]
    pub twitter: PathBuf,
    /// Caption strips.
    #[serde(default = "default_font_gifcap")]
    pub gifcap: PathBuf,
    /// Whisper overlays.
    #[serde(default = "default_font_whisper")]
    pub whisper: PathBuf,
    /// Demotivational titles.
    #[serde(default = "default_font_demotivational_title")]
    pub demotivational_title: PathBuf,
    /// Demotivational subtitles.
    #[serde(default = "default_font_demotivational_subtitle")]
    pub demotivational_subtitle: PathBuf,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            impact: default_font_impact(),
            twitter: default_font_twitter(),
            gifcap: default_font_gifcap(),
            whisper: default_font_whisper(),
            demotivational_title: default_font_demotivational_title(),
            demotivational_subtitle: default_font_demotivational_subtitle(),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Base URL of the listing site.
    #[serde(default = "default_reddit_base_url")]
    pub reddit_base_url: String,

    /// Base URL of the emoji image CDN.
    #[serde(default = "default_emoji_cdn_url")]
    pub emoji_cdn_url: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            reddit_base_url: default_reddit_base_url(),
            emoji_cdn_url: default_emoji_cdn_url(),
        }
    }
}

fn default_source_list() -> PathBuf {
    PathBuf::from("sources.txt")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

const fn default_size_limit() -> usize {
    1000
}

const fn default_refresh_wait() -> u64 {
    60
}

const fn default_warm_up_retry() -> u64 {
    10
}

const fn default_min_width() -> u32 {
    200
}

const fn default_force_width() -> u32 {
    500
}

const fn default_random_attempts() -> u32 {
    3
}

fn default_font_impact() -> PathBuf {
    PathBuf::from("fonts/impact")
}

fn default_font_twitter() -> PathBuf {
    PathBuf::from("fonts/twitter")
}

fn default_font_gifcap() -> PathBuf {
    PathBuf::from("fonts/gifcap")
}

fn default_font_whisper() -> PathBuf {
    PathBuf::from("fonts/whisper")
}

fn default_font_demotivational_title() -> PathBuf {
    PathBuf::from("fonts/demotiv/title")
}

fn default_font_demotivational_subtitle() -> PathBuf {
    PathBuf::from("fonts/demotiv/subtitle")
}

const fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("{APP_NAME}/{}", crate::VERSION)
}

fn default_reddit_base_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_emoji_cdn_url() -> String {
    "https://emojicdn.elk.sh".to_string()
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        let CommonArgs {
            config,
            log_path,
            log_level,
            source_list,
            cache_dir,
            emoji_style,
            min_width,
            force_width,
        } = &args.common;

        if let Some(config_path) = config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = log_level {
            self.log_level = *log_level;
        }
        if let Some(source_list) = source_list {
            self.source_list = source_list.clone();
        }
        if let Some(cache_dir) = cache_dir {
            self.cache.dir = cache_dir.clone();
        }
        if let Some(emoji_style) = emoji_style {
            self.emoji_style = *emoji_style;
        }
        if let Some(min_width) = min_width {
            self.images.min_width = *min_width;
        }
        if let Some(force_width) = force_width {
            self.images.force_width = *force_width;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::default_config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("memeoff.log"))
    }

    /// Returns effective config path.
    #[must_use]
    pub fn effective_config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(Self::default_config_path)
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }

    /// Resolves a configured path. Relative paths are taken from the config
    /// file's directory.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        self.effective_config_path()
            .as_deref()
            .and_then(Path::parent)
            .map_or_else(|| path.to_path_buf(), |base| base.join(path))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config: None,
            log_path: None,
            log_level: LogLevel::Info,
            source_list: default_source_list(),
            emoji_style: EmojiStyle::default(),
            cache: CacheConfig::default(),
            images: ImageConfig::default(),
            fonts: FontConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_partial_config() {
        let toml_content = r#"
            emoji_style = "google"

            [cache]
            size_limit = 50

            [fonts]
            impact = "/usr/share/fonts/impact.ttf"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.emoji_style, EmojiStyle::Google);
        assert_eq!(config.cache.size_limit, 50);
        assert_eq!(config.cache.refresh_wait_sec, 60);
        assert_eq!(config.fonts.impact, PathBuf::from("/usr/share/fonts/impact.ttf"));
        assert_eq!(config.fonts.twitter, PathBuf::from("fonts/twitter"));
        assert_eq!(config.images, ImageConfig::default());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.log_level, LogLevel::Info);
        assert_eq!(config.images.min_width, 200);
        assert_eq!(config.images.force_width, 500);
        assert_eq!(config.images.random_attempts, 3);
        assert_eq!(config.cache.size_limit, 1000);
        assert!(config.cache.warm_up_rounds.is_none());
    }

    #[test]
    fn test_merge_with_args_overrides_only_given_values() {
        let mut config = AppConfig::default();
        let args = CliArgs::parse_from([
            "memeoff",
            "--log-level",
            "debug",
            "--force-width",
            "640",
            "--emoji-style",
            "twitter",
            "refresh",
        ]);

        config.merge_with_args(&args);

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.images.force_width, 640);
        assert_eq!(config.images.min_width, 200);
        assert_eq!(config.emoji_style, EmojiStyle::Twitter);
        assert_eq!(config.source_list, PathBuf::from("sources.txt"));
    }

    #[test]
    fn test_resolve_relative_to_config_file() {
        let config = AppConfig {
            config: Some(PathBuf::from("/etc/memeoff/config.toml")),
            ..AppConfig::default()
        };

        assert_eq!(
            config.resolve(Path::new("fonts/impact")),
            PathBuf::from("/etc/memeoff/fonts/impact")
        );
        assert_eq!(config.resolve(Path::new("/abs/x.ttf")), PathBuf::from("/abs/x.ttf"));
    }
}
