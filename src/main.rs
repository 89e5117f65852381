use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use memeoff::application::services::text_layout::FormatRegistry;
use memeoff::application::{GenerateMemeUseCase, ImageFetcher, MemeSettings, RandomImageCache};
use memeoff::infrastructure::{
    AppConfig, CliArgs, CsvPoolStore, EmojiCdnSource, HttpImageDownloader, RedditScraper, StorageManager,
    build_client, load_source_list,
};
use memeoff::presentation::{CliHost, WarmUpPolicy};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry().with(filter).init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.common.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

async fn create_host(config: &AppConfig) -> Result<CliHost> {
    let sources = Arc::new(load_source_list(&config.resolve(&config.source_list))?);
    let fonts = config.fonts.load(config)?;

    let client = build_client(&config.http)?;
    let fetcher = ImageFetcher::new(Arc::new(HttpImageDownloader::new(client.clone())));
    let scraper = Arc::new(RedditScraper::with_base_url(
        client.clone(),
        config.http.reddit_base_url.clone(),
    ));
    let emoji = Arc::new(EmojiCdnSource::new(
        client,
        config.http.emoji_cdn_url.clone(),
        config.emoji_style,
    ));
    let store = Arc::new(CsvPoolStore::new(config.resolve(&config.cache.dir)));

    let cache = Arc::new(
        RandomImageCache::open(store, scraper, fetcher.clone(), config.cache.size_limit).await?,
    );

    let settings = MemeSettings {
        min_width: config.images.min_width,
        force_width: config.images.force_width,
        random_attempts: config.images.random_attempts,
        refresh_wait_sec: config.cache.refresh_wait_sec,
        refresh_after_request: false,
        ..MemeSettings::default()
    };

    let use_case = GenerateMemeUseCase::new(
        cache.clone(),
        fetcher,
        Arc::new(FormatRegistry::new(fonts)),
        emoji,
        sources.clone(),
        settings,
    );

    let warm_up = WarmUpPolicy {
        retry_delay: Duration::from_secs(config.cache.warm_up_retry_sec),
        max_rounds: config.cache.warm_up_rounds,
    };

    Ok(CliHost::new(use_case, cache, sources, warm_up))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;

    init_logging(&config)?;

    info!(version = memeoff::VERSION, "Starting {}", memeoff::NAME);

    let host = create_host(&config).await?;
    host.run(args.command).await
}
