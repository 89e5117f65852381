//! Command-line host: turns subcommands into requests and writes the replies.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use tracing::{info, warn};

use crate::application::dto::{ImageSource, MemeReply, MemeRequest};
use crate::application::services::{RandomImageCache, UpdateOptions};
use crate::application::use_cases::GenerateMemeUseCase;
use crate::domain::entities::ImageFileType;
use crate::infrastructure::config::CliCommand;

/// How long and how often to retry filling an empty cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WarmUpPolicy {
    /// Pause between warm-up rounds.
    pub retry_delay: Duration,
    /// Round limit, unbounded when `None`.
    pub max_rounds: Option<u32>,
}

/// Runs CLI subcommands against the meme pipeline.
#[derive(Debug)]
pub struct CliHost {
    use_case: GenerateMemeUseCase,
    cache: Arc<RandomImageCache>,
    sources: Arc<Vec<String>>,
    warm_up: WarmUpPolicy,
}

impl CliHost {
    /// Host over a wired use case and cache.
    #[must_use]
    pub const fn new(
        use_case: GenerateMemeUseCase,
        cache: Arc<RandomImageCache>,
        sources: Arc<Vec<String>>,
        warm_up: WarmUpPolicy,
    ) -> Self {
        Self {
            use_case,
            cache,
            sources,
            warm_up,
        }
    }

    /// # Errors
    /// Returns error if the subcommand fails or the request is answered with an error.
    pub async fn run(&self, command: CliCommand) -> Result<()> {
        let result = match command {
            CliCommand::Render {
                message,
                image,
                output,
                no_refresh,
            } => self.render(message, image.as_deref(), output.as_deref(), !no_refresh).await,
            CliCommand::Batch {
                image,
                batch,
                output,
            } => self.batch(&image, &batch, &output).await,
            CliCommand::Refresh { warm_up } => self.refresh(warm_up).await,
            CliCommand::Stats => {
                println!("{}", self.cache.stats().await);
                Ok(())
            }
        };

        self.cache
            .flush()
            .await
            .wrap_err("failed to save the random image cache")?;

        result
    }

    async fn render(
        &self,
        message: String,
        image: Option<&str>,
        output: Option<&Path>,
        refresh: bool,
    ) -> Result<()> {
        let mut request = MemeRequest::new(message);
        if let Some(arg) = image {
            request = request.with_attachment(image_source(arg).await?);
        }
        if self.use_case.needs_random_image(&request) {
            self.ensure_cache().await;
        }

        let Some(reply) = self.use_case.execute(request).await else {
            bail!("the message is not a meme command");
        };

        match reply {
            MemeReply::Image { filename, bytes, .. } => {
                let path = output_path(output, &filename).await;
                tokio::fs::write(&path, &bytes)
                    .await
                    .wrap_err_with(|| format!("failed to write {}", path.display()))?;
                info!(path = %path.display(), size = bytes.len(), "Wrote meme");
                println!("{}", path.display());

                if refresh {
                    let report = self.use_case.spawn_refresh().await?;
                    if !report.skipped {
                        info!(added = report.urls_added, "Refreshed cache after reply");
                    }
                }
                Ok(())
            }
            MemeReply::Text { content } => {
                println!("{content}");
                Ok(())
            }
            MemeReply::Error { message } => Err(eyre!(message)),
        }
    }

    /// Writes `<output>/<image stem>/<batch stem>/<line>.<ext>`, replacing any
    /// earlier run. Failing lines are reported and skipped.
    async fn batch(&self, image: &Path, batch: &Path, output: &Path) -> Result<()> {
        let source = image_source(&image.to_string_lossy()).await?;
        let lines = tokio::fs::read_to_string(batch)
            .await
            .wrap_err_with(|| format!("failed to read batch file {}", batch.display()))?;

        let dir = batch_dir(output, image, batch);
        if tokio::fs::try_exists(&dir).await? {
            tokio::fs::remove_dir_all(&dir).await?;
        }
        tokio::fs::create_dir_all(&dir).await?;

        let mut written = 0usize;
        for (index, line) in lines.lines().enumerate() {
            let number = index + 1;
            let request = MemeRequest::new(line).with_attachment(source.clone());

            match self.use_case.execute(request).await {
                Some(MemeReply::Image { filename, bytes, .. }) => {
                    let extension = Path::new(&filename)
                        .extension()
                        .map_or_else(String::new, |ext| ext.to_string_lossy().into_owned());
                    let path = dir.join(format!("{number}.{extension}"));
                    tokio::fs::write(&path, &bytes).await?;
                    written += 1;
                }
                Some(MemeReply::Text { content }) => println!("{number}: {content}"),
                Some(MemeReply::Error { message }) => {
                    warn!(line = number, error = %message, "Batch line failed");
                    eprintln!("{number}: {message}");
                }
                None => eprintln!("{number}: not a meme command"),
            }
        }

        info!(dir = %dir.display(), written = written, "Batch finished");
        println!("{}", dir.display());
        Ok(())
    }

    async fn refresh(&self, warm_up: bool) -> Result<()> {
        let stats = if warm_up {
            self.cache
                .warm_up(&self.sources, self.warm_up.retry_delay, self.warm_up.max_rounds)
                .await
        } else {
            let report = self.cache.update_cache(&self.sources, UpdateOptions::default()).await;
            println!(
                "sources ok: {}, failed: {}, new urls: {}",
                report.sources_ok, report.sources_failed, report.urls_added
            );
            self.cache.stats().await
        };

        println!("{stats}");
        Ok(())
    }

    /// Fills the cache before a random image request if it has nothing to serve.
    async fn ensure_cache(&self) {
        let stats = self.cache.stats().await;
        if stats.unused == 0 && stats.used == 0 {
            info!("Random image cache is empty, warming up");
            self.cache
                .warm_up(&self.sources, self.warm_up.retry_delay, self.warm_up.max_rounds)
                .await;
        }
    }
}

/// `http(s)://` arguments become URL attachments, anything else is read as a local file.
async fn image_source(arg: &str) -> Result<ImageSource> {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        return Ok(ImageSource::Url(arg.to_string()));
    }

    let path = Path::new(arg);
    let file_type = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageFileType::from_extension)
        .ok_or_else(|| eyre!("{arg}: only JPEG and PNG images are supported"))?;
    let data = tokio::fs::read(path)
        .await
        .wrap_err_with(|| format!("failed to read image {arg}"))?;
    let name = path
        .file_stem()
        .map_or_else(|| "image".to_string(), |stem| stem.to_string_lossy().into_owned());

    Ok(ImageSource::Bytes {
        data: Bytes::from(data),
        file_type,
        name,
    })
}

/// An existing directory receives the reply file name; no output means the
/// current directory.
async fn output_path(output: Option<&Path>, filename: &str) -> PathBuf {
    match output {
        Some(path) if tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir()) => path.join(filename),
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(filename),
    }
}

fn batch_dir(output: &Path, image: &Path, batch: &Path) -> PathBuf {
    let stem = |p: &Path| {
        p.file_stem()
            .map_or_else(|| "out".to_string(), |s| s.to_string_lossy().into_owned())
    };
    output.join(stem(image)).join(stem(batch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::ImageFetcher;
    use crate::application::services::text_layout::{CaptionRenderer, FormatStep, RenderContext};
    use crate::application::use_cases::MemeSettings;
    use crate::domain::ports::mocks::{MemoryPoolStore, MockDownloader, MockScraper, SolidEmojiSource, png_bytes};
    use image::RgbaImage;
    use tempfile::tempdir;

    struct Passthrough;

    impl CaptionRenderer for Passthrough {
        fn render(&self, image: RgbaImage, _steps: &[FormatStep], _ctx: &RenderContext<'_>) -> RgbaImage {
            image
        }
    }

    async fn host() -> CliHost {
        let (host, _) = host_with(
            Arc::new(MockScraper::new()),
            WarmUpPolicy {
                retry_delay: Duration::from_millis(1),
                max_rounds: Some(1),
            },
        )
        .await;
        host
    }

    async fn host_with(scraper: Arc<MockScraper>, warm_up: WarmUpPolicy) -> (CliHost, Arc<MockScraper>) {
        let fetcher = ImageFetcher::new(Arc::new(MockDownloader::new()));
        let cache = Arc::new(
            RandomImageCache::open(
                Arc::new(MemoryPoolStore::new()),
                scraper.clone(),
                fetcher.clone(),
                10,
            )
            .await
            .unwrap(),
        );
        let sources = Arc::new(vec!["memes".to_string()]);
        let use_case = GenerateMemeUseCase::new(
            cache.clone(),
            fetcher,
            Arc::new(Passthrough),
            Arc::new(SolidEmojiSource { size: 4 }),
            sources.clone(),
            MemeSettings {
                refresh_after_request: false,
                ..MemeSettings::default()
            },
        );
        (CliHost::new(use_case, cache, sources, warm_up), scraper)
    }

    #[tokio::test]
    async fn test_image_source_reads_local_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Cat Photo.png");
        std::fs::write(&path, png_bytes(10, 10)).unwrap();

        let source = image_source(path.to_str().unwrap()).await.unwrap();

        match source {
            ImageSource::Bytes { file_type, name, .. } => {
                assert_eq!(file_type, ImageFileType::Png);
                assert_eq!(name, "Cat Photo");
            }
            other @ ImageSource::Url(_) => panic!("unexpected source {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_image_source_url_and_unsupported_file() {
        assert_eq!(
            image_source("https://i.redd.it/a.png").await.unwrap(),
            ImageSource::Url("https://i.redd.it/a.png".into())
        );
        assert!(image_source("/tmp/clip.gif").await.is_err());
    }

    #[tokio::test]
    async fn test_output_path_resolution() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("out.png");

        assert_eq!(output_path(Some(dir.path()), "1_a.png").await, dir.path().join("1_a.png"));
        assert_eq!(output_path(Some(&file), "1_a.png").await, file);
        assert_eq!(output_path(None, "1_a.png").await, PathBuf::from("1_a.png"));
    }

    #[test]
    fn test_batch_dir() {
        assert_eq!(
            batch_dir(Path::new("/out"), Path::new("img/cat.jpg"), Path::new("b/all.txt")),
            PathBuf::from("/out/cat/all")
        );
    }

    #[tokio::test]
    async fn test_batch_writes_one_file_per_successful_line() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("cat.png");
        let batch = dir.path().join("lines.txt");
        std::fs::write(&image, png_bytes(600, 300)).unwrap();
        std::fs::write(&batch, "-M -I top // bottom\nhello there\n-M -T tweet\n").unwrap();

        let host = host().await;
        host.batch(&image, &batch, &dir.path().join("out")).await.unwrap();

        let out = dir.path().join("out").join("cat").join("lines");
        assert!(out.join("1.png").exists());
        assert!(!out.join("2.png").exists());
        assert!(out.join("3.png").exists());

        let written = image::open(out.join("3.png")).unwrap();
        assert_eq!(written.width(), 500);
    }

    #[tokio::test]
    async fn test_render_reports_empty_cache_as_error() {
        let host = host().await;
        let err = host
            .run(CliCommand::Render {
                message: "-M -T hi".into(),
                image: None,
                output: None,
                no_refresh: true,
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Failed to download random image. Please try again.");
    }

    #[tokio::test]
    async fn test_render_text_reply() {
        let host = host().await;
        host.run(CliCommand::Render {
            message: "-M -PING".into(),
            image: None,
            output: None,
            no_refresh: true,
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_requests_without_random_image_skip_unbounded_warm_up() {
        let (host, scraper) = host_with(
            Arc::new(MockScraper::new()),
            WarmUpPolicy {
                retry_delay: Duration::from_millis(1),
                max_rounds: None,
            },
        )
        .await;
        let render = |message: &str| CliCommand::Render {
            message: message.into(),
            image: None,
            output: None,
            no_refresh: true,
        };

        let ping = tokio::time::timeout(Duration::from_secs(2), host.run(render("-M PING"))).await;
        let custom = tokio::time::timeout(
            Duration::from_secs(2),
            host.run(render("-M -URL https://x.org/missing.png -T hi")),
        )
        .await;

        assert!(ping.unwrap().is_ok());
        assert_eq!(
            custom.unwrap().unwrap_err().to_string(),
            "Unable to download the image provided."
        );
        assert_eq!(scraper.calls(), 0);
    }
}
