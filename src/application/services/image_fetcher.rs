//! Validated download, decode and width normalisation of caption sources.

use std::sync::Arc;

use bytes::Bytes;
use image::RgbaImage;
use image::imageops::FilterType;
use tracing::{debug, warn};

use crate::domain::entities::{ImageFileType, RenderableImage};
use crate::domain::errors::MemeError;
use crate::domain::ports::ImageDownloadPort;

/// Turns a URL or raw bytes into a [`RenderableImage`].
#[derive(Clone)]
pub struct ImageFetcher {
    downloader: Arc<dyn ImageDownloadPort>,
}

impl std::fmt::Debug for ImageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageFetcher").finish_non_exhaustive()
    }
}

impl ImageFetcher {
    /// Creates a fetcher that downloads through `downloader`.
    #[must_use]
    pub fn new(downloader: Arc<dyn ImageDownloadPort>) -> Self {
        Self { downloader }
    }

    /// Downloads and decodes the image at `url`.
    ///
    /// A zero `min_width` or `force_width` disables that check.
    ///
    /// # Errors
    /// Returns `InvalidImageUrl` before any network access when the URL does not
    /// end in a JPEG or PNG extension, then download, decode and width errors.
    pub async fn fetch(
        &self,
        url: &str,
        min_width: u32,
        force_width: u32,
    ) -> Result<RenderableImage, MemeError> {
        let file_type = ImageFileType::from_url(url).ok_or_else(|| {
            debug!(url = %url, "Rejected image URL");
            MemeError::invalid_url(url)
        })?;

        let bytes = self.downloader.download(url).await.map_err(|e| {
            warn!(url = %url, error = %e, "Image download failed");
            MemeError::download(url, e.to_string())
        })?;

        debug!(url = %url, size = bytes.len(), "Downloaded image");

        decode(bytes, file_type, image_name(url, file_type), url, min_width, force_width).await
    }

    /// Decodes an image that is already in memory, e.g. a local file.
    ///
    /// # Errors
    /// Returns decode and width errors.
    pub async fn from_bytes(
        &self,
        bytes: Bytes,
        file_type: ImageFileType,
        name: &str,
        min_width: u32,
        force_width: u32,
    ) -> Result<RenderableImage, MemeError> {
        let name = format!("{}.{}", slugify(name), file_type.extension());
        decode(bytes, file_type, name.clone(), &name, min_width, force_width).await
    }
}

async fn decode(
    bytes: Bytes,
    file_type: ImageFileType,
    name: String,
    origin: &str,
    min_width: u32,
    force_width: u32,
) -> Result<RenderableImage, MemeError> {
    let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
        .await
        .map_err(|e| MemeError::unknown(format!("Decode task panicked: {e}")))?
        .map_err(|e| MemeError::decode(origin, e.to_string()))?
        .into_rgba8();

    if min_width > 0 && decoded.width() < min_width {
        return Err(MemeError::ImageTooSmall {
            width: decoded.width(),
            min_width,
        });
    }

    let image = if force_width > 0 && decoded.width() != force_width {
        tokio::task::spawn_blocking(move || resize_to_width(&decoded, force_width))
            .await
            .map_err(|e| MemeError::unknown(format!("Resize task panicked: {e}")))?
    } else {
        decoded
    };

    Ok(RenderableImage::new(image, file_type, name))
}

/// Scales to `width`, keeping the aspect ratio with the height rounded down.
#[must_use]
pub fn resize_to_width(image: &RgbaImage, width: u32) -> RgbaImage {
    let height = (u64::from(image.height()) * u64::from(width) / u64::from(image.width().max(1)))
        .max(1);
    let height = u32::try_from(height).unwrap_or(u32::MAX);
    image::imageops::resize(image, width, height, FilterType::CatmullRom)
}

/// File name for an image URL: the slug of the URL without its extension, plus
/// the canonical extension.
#[must_use]
pub fn image_name(url: &str, file_type: ImageFileType) -> String {
    let url = url.trim();
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let base = &url[..end];
    let stem = base.rfind('.').map_or(base, |dot| &base[..dot]);
    format!("{}.{}", slugify(stem), file_type.extension())
}

/// Lower-cases and collapses every run of non-alphanumeric characters into `-`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DownloadError;
    use crate::domain::ports::mocks::{MockDownloader, png_bytes};
    use test_case::test_case;

    fn fetcher(mock: MockDownloader) -> (ImageFetcher, Arc<MockDownloader>) {
        let mock = Arc::new(mock);
        (ImageFetcher::new(mock.clone()), mock)
    }

    #[tokio::test]
    async fn test_force_width_resizes_exactly() {
        let url = "https://i.redd.it/wide.png";
        let (fetcher, _) = fetcher(MockDownloader::new().with_png(url, 1000, 601));

        let img = fetcher.fetch(url, 200, 500).await.unwrap();

        assert_eq!(img.width(), 500);
        assert_eq!(img.height(), 300);
        assert_eq!(img.file_type, ImageFileType::Png);
        assert_eq!(img.name, "https-i-redd-it-wide.PNG");
    }

    #[tokio::test]
    async fn test_small_image_upscaled() {
        let url = "https://i.redd.it/tiny.jpg";
        let (fetcher, _) = fetcher(MockDownloader::new().with_png(url, 250, 125));

        let img = fetcher.fetch(url, 200, 500).await.unwrap();

        assert_eq!((img.width(), img.height()), (500, 250));
        assert_eq!(img.file_type, ImageFileType::Jpeg);
    }

    #[tokio::test]
    async fn test_too_small_is_rejected_without_resize() {
        let url = "https://i.redd.it/small.png";
        let (fetcher, _) = fetcher(MockDownloader::new().with_png(url, 150, 150));

        let err = fetcher.fetch(url, 200, 500).await.unwrap_err();

        assert!(matches!(
            err,
            MemeError::ImageTooSmall {
                width: 150,
                min_width: 200
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_request() {
        let (fetcher, mock) = fetcher(MockDownloader::new());

        let err = fetcher
            .fetch("https://example.com/clip.gif", 0, 0)
            .await
            .unwrap_err();

        assert!(matches!(err, MemeError::InvalidImageUrl { .. }));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_http_failure_maps_to_download_error() {
        let url = "https://example.com/gone.png";
        let (fetcher, _) =
            fetcher(MockDownloader::new().with_error(url, DownloadError::Status(404)));

        let err = fetcher.fetch(url, 0, 0).await.unwrap_err();
        assert!(matches!(err, MemeError::ImageDownloadFailed { .. }));
    }

    #[tokio::test]
    async fn test_garbage_body_maps_to_decode_error() {
        let url = "https://example.com/broken.jpg";
        let (fetcher, _) = fetcher(MockDownloader::new().with_body(url, b"not an image".to_vec()));

        let err = fetcher.fetch(url, 0, 0).await.unwrap_err();
        assert!(matches!(err, MemeError::ImageDecodeFailed { .. }));
    }

    #[tokio::test]
    async fn test_from_bytes_keeps_width_when_unforced() {
        let (fetcher, _) = fetcher(MockDownloader::new());

        let img = fetcher
            .from_bytes(
                Bytes::from(png_bytes(320, 200)),
                ImageFileType::Png,
                "My Cat",
                0,
                0,
            )
            .await
            .unwrap();

        assert_eq!((img.width(), img.height()), (320, 200));
        assert_eq!(img.name, "my-cat.PNG");
    }

    #[test_case("https://i.redd.it/AbC.jpg", ImageFileType::Jpeg, "https-i-redd-it-abc.JPEG" ; "jpg_normalized")]
    #[test_case("https://i.imgur.com/x_y.png?a=1", ImageFileType::Png, "https-i-imgur-com-x-y.PNG" ; "query_dropped")]
    fn test_image_name(url: &str, file_type: ImageFileType, expected: &str) {
        assert_eq!(image_name(url, file_type), expected);
    }
}
