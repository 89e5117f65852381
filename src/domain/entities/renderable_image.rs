//! Domain types for images flowing through a request.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};

/// File types accepted as caption sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFileType {
    /// JPEG, written as `JPEG` (the 3-letter `JPG` is normalized).
    Jpeg,
    /// PNG.
    Png,
}

impl ImageFileType {
    /// Parses a file extension, with or without leading dot, case-insensitive.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim().trim_start_matches('.');
        if ext.eq_ignore_ascii_case("jpg") || ext.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    /// Extension of the last path segment of an absolute URL, ignoring query and fragment.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let (_, segment) = url_path(url)?.rsplit_once('/')?;
        let (_, ext) = segment.rsplit_once('.')?;
        Self::from_extension(ext)
    }

    /// Canonical upper-case extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }

    /// Encoder format for the `image` crate.
    #[must_use]
    pub const fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }
}

impl std::fmt::Display for ImageFileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Returns the URL up to its query or fragment, if it has a scheme and a path.
pub(crate) fn url_path(url: &str) -> Option<&str> {
    let url = url.trim();
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let base = &url[..end];
    let (scheme, rest) = base.split_once("://")?;
    if scheme.is_empty() || !rest.contains('/') {
        return None;
    }
    Some(base)
}

/// A decoded bitmap owned by one request, with the type it will be written as.
#[derive(Debug, Clone)]
pub struct RenderableImage {
    /// Pixel data.
    pub image: RgbaImage,
    /// Output file type.
    pub file_type: ImageFileType,
    /// Slug file name, e.g. `https-i-redd-it-abc.PNG`.
    pub name: String,
}

impl RenderableImage {
    /// Creates a renderable image.
    #[must_use]
    pub fn new(image: RgbaImage, file_type: ImageFileType, name: impl Into<String>) -> Self {
        Self {
            image,
            file_type,
            name: name.into(),
        }
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Encodes the bitmap in its file type. JPEG output drops the alpha channel.
    ///
    /// # Errors
    /// Returns error if encoding fails.
    pub fn encode(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut out = Cursor::new(Vec::new());
        match self.file_type {
            ImageFileType::Jpeg => DynamicImage::ImageRgba8(self.image.clone())
                .to_rgb8()
                .write_to(&mut out, ImageFormat::Jpeg)?,
            ImageFileType::Png => self.image.write_to(&mut out, ImageFormat::Png)?,
        }
        Ok(out.into_inner())
    }
}
