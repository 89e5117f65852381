//! Message to captioned image.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::application::dto::{ImageSource, MemeReply, MemeRequest};
use crate::application::services::text_layout::formats::{
    RECOGNIZED_SYMBOLS, START_SYMBOL, SYMBOL_URL,
};
use crate::application::services::text_layout::{
    CaptionRenderer, EmojiAtlas, FormatStep, RenderContext, plan_formats, strip_modifiers,
};
use crate::application::services::{ImageFetcher, RandomImageCache, UpdateOptions, UpdateReport};
use crate::domain::entities::{Command, RenderableImage, timestamp_now};
use crate::domain::errors::MemeError;
use crate::domain::ports::EmojiSourcePort;
use crate::domain::services::CommandParser;

/// Marks hidden text in chat messages; stripped when it wraps the whole message.
const SPOILER_DELIMITER: &str = "||";

/// Option words carried by the start symbol.
pub mod options {
    /// Reply without mentioning the author.
    pub const ANON: &str = "ANON";
    /// Dark theme for the twitter format.
    pub const DARK: &str = "DARK";
    /// Reply `Pong.`.
    pub const PING: &str = "PING";
    /// Reply the help URL.
    pub const HELP: &str = "HELP";
    /// Reply the version.
    pub const VERSION: &str = "VERSION";
}

/// Limits and texts used while answering requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemeSettings {
    /// Narrower source images are rejected.
    pub min_width: u32,
    /// Width every source image is resized to.
    pub force_width: u32,
    /// Tries per random image request.
    pub random_attempts: u32,
    /// Throttle for the refresh kicked off after each image reply.
    pub refresh_wait_sec: u64,
    /// Whether to kick off that refresh at all.
    pub refresh_after_request: bool,
    /// Answer to `HELP`.
    pub help_url: String,
    /// Answer to `VERSION`, without the `v`.
    pub version: String,
}

impl Default for MemeSettings {
    fn default() -> Self {
        Self {
            min_width: 200,
            force_width: 500,
            random_attempts: 3,
            refresh_wait_sec: 60,
            refresh_after_request: true,
            help_url: "https://github.com/r3w0p/memeoff/wiki".to_string(),
            version: crate::VERSION.to_string(),
        }
    }
}

/// Answers one message: parse, pick the source image, caption it, encode it.
#[derive(Clone)]
pub struct GenerateMemeUseCase {
    parser: CommandParser,
    cache: Arc<RandomImageCache>,
    fetcher: ImageFetcher,
    renderer: Arc<dyn CaptionRenderer>,
    emoji: Arc<dyn EmojiSourcePort>,
    sources: Arc<Vec<String>>,
    settings: MemeSettings,
}

impl std::fmt::Debug for GenerateMemeUseCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateMemeUseCase")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl GenerateMemeUseCase {
    /// Wires the pipeline from its collaborators.
    #[must_use]
    pub fn new(
        cache: Arc<RandomImageCache>,
        fetcher: ImageFetcher,
        renderer: Arc<dyn CaptionRenderer>,
        emoji: Arc<dyn EmojiSourcePort>,
        sources: Arc<Vec<String>>,
        settings: MemeSettings,
    ) -> Self {
        Self {
            parser: CommandParser::new(START_SYMBOL, RECOGNIZED_SYMBOLS),
            cache,
            fetcher,
            renderer,
            emoji,
            sources,
            settings,
        }
    }

    /// Returns `None` when the message is not addressed to the bot.
    pub async fn execute(&self, request: MemeRequest) -> Option<MemeReply> {
        let command = self.parser.parse(strip_spoiler(&request.content))?;
        debug!(symbols = command.len(), options = ?command.options(), "Parsed command");

        if let Some(reply) = self.answer_option(&command) {
            return Some(reply);
        }

        let reply = match self.generate(&request, &command).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(kind = ?e.kind(), error = %e, "Meme request failed");
                MemeReply::Error {
                    message: e.user_message(),
                }
            }
        };

        if matches!(reply, MemeReply::Image { .. }) && self.settings.refresh_after_request {
            drop(self.spawn_refresh());
        }

        Some(reply)
    }

    /// Whether answering `request` would draw an image from the random cache.
    #[must_use]
    pub fn needs_random_image(&self, request: &MemeRequest) -> bool {
        if request.attachment.is_some() || request.reply_attachment.is_some() {
            return false;
        }
        let Some(command) = self.parser.parse(strip_spoiler(&request.content)) else {
            return false;
        };
        self.answer_option(&command).is_none() && custom_url(&command).is_none()
    }

    /// Starts a throttled cache refresh without waiting for it.
    pub fn spawn_refresh(&self) -> JoinHandle<UpdateReport> {
        let cache = Arc::clone(&self.cache);
        let sources = Arc::clone(&self.sources);
        let options = UpdateOptions::throttled(self.settings.refresh_wait_sec);
        tokio::spawn(async move { cache.update_cache(&sources, options).await })
    }

    fn answer_option(&self, command: &Command) -> Option<MemeReply> {
        let content = if command.has_option(options::PING) {
            "Pong.".to_string()
        } else if command.has_option(options::HELP) {
            self.settings.help_url.clone()
        } else if command.has_option(options::VERSION) {
            format!("v{}", self.settings.version)
        } else {
            return None;
        };
        Some(MemeReply::Text { content })
    }

    async fn generate(&self, request: &MemeRequest, command: &Command) -> Result<MemeReply, MemeError> {
        let source = self.resolve_image(request, command).await?;

        let steps: Vec<FormatStep> = plan_formats(command)
            .into_iter()
            .map(|step| FormatStep {
                text: strip_modifiers(&step.text),
                ..step
            })
            .collect();
        let all_text: String = steps.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
        let atlas = EmojiAtlas::resolve(&all_text, self.emoji.as_ref()).await;
        let dark = command.has_option(options::DARK);

        info!(
            name = %source.name,
            formats = steps.len(),
            emoji = atlas.len(),
            dark = dark,
            "Rendering meme"
        );

        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || {
            let ctx = RenderContext { emoji: &atlas, dark };
            let image = renderer.render(source.image, &steps, &ctx);
            let output = RenderableImage::new(image, source.file_type, source.name);
            output.encode().map(|bytes| (output.name, bytes))
        })
        .await
        .map_err(|e| MemeError::unknown(format!("Render task panicked: {e}")))?
        .map_err(|e| MemeError::unknown(format!("Encoding failed: {e}")))?;

        let (name, bytes) = rendered;
        Ok(MemeReply::Image {
            filename: format!("{}_{}", timestamp_now(), name.to_lowercase()),
            bytes,
            mention_author: !command.has_option(options::ANON),
            delete_trigger: true,
        })
    }

    /// Attachment, then reply attachment, then `-URL`, then a random cached image.
    async fn resolve_image(&self, request: &MemeRequest, command: &Command) -> Result<RenderableImage, MemeError> {
        let MemeSettings {
            min_width,
            force_width,
            random_attempts,
            ..
        } = self.settings;

        let explicit = request
            .attachment
            .as_ref()
            .or(request.reply_attachment.as_ref());

        if let Some(source) = explicit {
            return self.load(source, min_width, force_width).await;
        }

        if let Some(url) = custom_url(command) {
            debug!(url = %url, "Using custom image URL");
            return self.cache.download_image(url, min_width, force_width).await;
        }

        debug!("Using random cached image");
        self.cache
            .download_random_image(min_width, force_width, random_attempts)
            .await
    }

    async fn load(&self, source: &ImageSource, min_width: u32, force_width: u32) -> Result<RenderableImage, MemeError> {
        match source {
            ImageSource::Url(url) => self.fetcher.fetch(url, min_width, force_width).await,
            ImageSource::Bytes {
                data,
                file_type,
                name,
            } => {
                self.fetcher
                    .from_bytes(data.clone(), *file_type, name, min_width, force_width)
                    .await
            }
        }
    }
}

fn custom_url(command: &Command) -> Option<&String> {
    command.get(SYMBOL_URL).and_then(<[String]>::first)
}

fn strip_spoiler(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix(SPOILER_DELIMITER)
        .and_then(|rest| rest.strip_suffix(SPOILER_DELIMITER))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::text_layout::FormatKind;
    use crate::domain::entities::{CacheEntry, CachePool, ImageFileType, PoolKind};
    use crate::domain::ports::mocks::{MemoryPoolStore, MockDownloader, MockScraper, SolidEmojiSource, png_bytes};
    use bytes::Bytes;
    use image::RgbaImage;
    use std::sync::Mutex;

    /// Records the steps it was asked to apply and grows the image by 10px per step.
    #[derive(Default)]
    struct RecordingRenderer {
        calls: Mutex<Vec<(Vec<FormatStep>, bool, usize)>>,
    }

    impl CaptionRenderer for RecordingRenderer {
        fn render(&self, image: RgbaImage, steps: &[FormatStep], ctx: &RenderContext<'_>) -> RgbaImage {
            self.calls
                .lock()
                .unwrap()
                .push((steps.to_vec(), ctx.dark, ctx.emoji.len()));
            let grow = 10 * u32::try_from(steps.len()).unwrap();
            RgbaImage::new(image.width(), image.height() + grow)
        }
    }

    struct Fixture {
        use_case: GenerateMemeUseCase,
        renderer: Arc<RecordingRenderer>,
        downloader: Arc<MockDownloader>,
        cache: Arc<RandomImageCache>,
    }

    async fn fixture(downloader: MockDownloader, unused: &[&str]) -> Fixture {
        let downloader = Arc::new(downloader);
        let fetcher = ImageFetcher::new(downloader.clone());
        let pool: CachePool = unused.iter().map(|u| CacheEntry::new(*u, 1)).collect();
        let cache = Arc::new(
            RandomImageCache::open(
                Arc::new(MemoryPoolStore::new().with_pool(PoolKind::Unused, pool)),
                Arc::new(MockScraper::new()),
                fetcher.clone(),
                100,
            )
            .await
            .unwrap(),
        );
        let renderer = Arc::new(RecordingRenderer::default());
        let settings = MemeSettings {
            refresh_after_request: false,
            version: "1.0.0".to_string(),
            ..MemeSettings::default()
        };
        let use_case = GenerateMemeUseCase::new(
            cache.clone(),
            fetcher,
            renderer.clone(),
            Arc::new(SolidEmojiSource { size: 4 }),
            Arc::new(vec!["memes".to_string()]),
            settings,
        );
        Fixture {
            use_case,
            renderer,
            downloader,
            cache,
        }
    }

    fn image_reply(reply: Option<MemeReply>) -> (String, Vec<u8>, bool) {
        match reply {
            Some(MemeReply::Image {
                filename,
                bytes,
                mention_author,
                delete_trigger,
            }) => {
                assert!(delete_trigger);
                (filename, bytes, mention_author)
            }
            other => panic!("expected image reply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_command_is_ignored() {
        let f = fixture(MockDownloader::new(), &[]).await;
        assert!(f.use_case.execute(MemeRequest::new("just chatting")).await.is_none());
    }

    #[tokio::test]
    async fn test_text_options() {
        let f = fixture(MockDownloader::new(), &[]).await;

        let ping = f.use_case.execute(MemeRequest::new("-m ping")).await;
        let version = f.use_case.execute(MemeRequest::new("-M VERSION")).await;
        let help = f.use_case.execute(MemeRequest::new("-M -T x -help")).await;

        assert_eq!(ping, Some(MemeReply::Text { content: "Pong.".into() }));
        assert_eq!(version, Some(MemeReply::Text { content: "v1.0.0".into() }));
        assert_eq!(
            help,
            Some(MemeReply::Text {
                content: "https://github.com/r3w0p/memeoff/wiki".into()
            })
        );
        assert!(f.renderer.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_needs_random_image_only_without_other_source() {
        let f = fixture(MockDownloader::new(), &[]).await;
        let attachment = ImageSource::Url("https://x.org/a.png".into());

        assert!(f.use_case.needs_random_image(&MemeRequest::new("-M -T hi")));
        assert!(f.use_case.needs_random_image(&MemeRequest::new("||-M -I top||")));
        assert!(f.use_case.needs_random_image(&MemeRequest::new("-M -URL -T hi")));
        assert!(!f.use_case.needs_random_image(&MemeRequest::new("-M PING")));
        assert!(!f.use_case.needs_random_image(&MemeRequest::new("-M -T hi -VERSION")));
        assert!(!f.use_case.needs_random_image(&MemeRequest::new("-M -URL https://x.org/a.png -T hi")));
        assert!(!f.use_case.needs_random_image(&MemeRequest::new("hello there")));
        assert!(!f.use_case.needs_random_image(&MemeRequest::new("-M -T hi").with_attachment(attachment.clone())));
        assert!(!f.use_case.needs_random_image(&MemeRequest::new("-M -T hi").with_reply_attachment(attachment)));
    }

    #[tokio::test]
    async fn test_random_image_is_captioned_and_promoted() {
        let url = "https://i.redd.it/cat.png";
        let f = fixture(MockDownloader::new().with_png(url, 1000, 500), &[url]).await;

        let reply = f
            .use_case
            .execute(MemeRequest::new("-M -DARK -T hello \u{1F600}\u{FE0F} -ANON"))
            .await;
        let (filename, bytes, mention_author) = image_reply(reply);

        assert!(filename.ends_with("_https-i-redd-it-cat.png"));
        assert!(!mention_author);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (500, 260));

        let calls = f.renderer.calls.lock().unwrap();
        let (steps, dark, emoji) = &calls[0];
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].kind, FormatKind::Twitter);
        assert_eq!(steps[0].text, "hello \u{1F600}");
        assert!(*dark);
        assert_eq!(*emoji, 1);
        drop(calls);

        assert_eq!(f.cache.stats().await.used, 1);
    }

    #[tokio::test]
    async fn test_attachment_wins_over_url_and_cache() {
        let f = fixture(MockDownloader::new(), &["https://i.redd.it/never.png"]).await;
        let request = MemeRequest::new("-M -URL https://x/ignored.png -I hi")
            .with_reply_attachment(ImageSource::Url("https://x/ignored-too.png".into()))
            .with_attachment(ImageSource::Bytes {
                data: Bytes::from(png_bytes(400, 200)),
                file_type: ImageFileType::Jpeg,
                name: "Local Photo".into(),
            });

        let (filename, bytes, mention_author) = image_reply(f.use_case.execute(request).await);

        assert!(filename.ends_with("_local-photo.jpeg"));
        assert!(mention_author);
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Jpeg);
        assert_eq!(f.downloader.calls(), 0);
        assert_eq!(f.cache.stats().await.unused, 1);
    }

    #[tokio::test]
    async fn test_custom_url_errors_become_user_messages() {
        let f = fixture(MockDownloader::new(), &[]).await;

        let invalid = f
            .use_case
            .execute(MemeRequest::new("-M -URL https://x/clip.gif -T a"))
            .await;
        let exhausted = f.use_case.execute(MemeRequest::new("-M -T a")).await;

        assert_eq!(
            invalid,
            Some(MemeReply::Error {
                message: "The image provided is of an invalid image type.".into()
            })
        );
        assert_eq!(
            exhausted,
            Some(MemeReply::Error {
                message: "Failed to download random image. Please try again.".into()
            })
        );
    }

    #[tokio::test]
    async fn test_small_attachment_reports_minimum_width() {
        let url = "https://cdn.example/small.png";
        let f = fixture(MockDownloader::new().with_png(url, 100, 100), &[]).await;

        let reply = f
            .use_case
            .execute(MemeRequest::new("-M -W hi").with_attachment(ImageSource::Url(url.into())))
            .await;

        assert_eq!(
            reply,
            Some(MemeReply::Error {
                message: "The image provided is too small. Images must have a width of at least 200px."
                    .into()
            })
        );
    }

    #[tokio::test]
    async fn test_spoiler_wrapped_command_is_parsed() {
        let f = fixture(MockDownloader::new(), &[]).await;
        let reply = f.use_case.execute(MemeRequest::new("||-M PING||")).await;
        assert_eq!(reply, Some(MemeReply::Text { content: "Pong.".into() }));
    }

    #[tokio::test]
    async fn test_spawn_refresh_runs_update() {
        let f = fixture(MockDownloader::new(), &[]).await;
        let report = f.use_case.spawn_refresh().await.unwrap();
        assert_eq!(report.sources_failed, 1);
    }
}
