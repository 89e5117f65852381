//! Per-request error types.

use thiserror::Error;

/// Failures surfaced while handling a single caption request.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum MemeError {
    #[error("invalid image URL (expected .jpg, .jpeg or .png): {url}")]
    InvalidImageUrl { url: String },

    #[error("failed to download image from {url}: {message}")]
    ImageDownloadFailed { url: String, message: String },

    #[error("failed to decode image from {url}: {message}")]
    ImageDecodeFailed { url: String, message: String },

    #[error("image is {width}px wide, minimum is {min_width}px")]
    ImageTooSmall { width: u32, min_width: u32 },

    #[error("random image cache exhausted")]
    RandomCacheExhausted,

    #[error("unexpected failure: {message}")]
    UnknownRequestFailure { message: String },
}

/// Closed set of request failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemeErrorKind {
    /// URL extension check failed.
    InvalidImageUrl,
    /// Transport-level failure.
    ImageDownloadFailed,
    /// Bytes were not a valid image.
    ImageDecodeFailed,
    /// Below the minimum width.
    ImageTooSmall,
    /// No random candidate survived.
    RandomCacheExhausted,
    /// Anything else.
    UnknownRequestFailure,
}

impl MemeError {
    /// Creates invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidImageUrl { url: url.into() }
    }

    /// Creates download error.
    #[must_use]
    pub fn download(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ImageDownloadFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates decode error.
    #[must_use]
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ImageDecodeFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates catch-all error.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::UnknownRequestFailure {
            message: message.into(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> MemeErrorKind {
        match self {
            Self::InvalidImageUrl { .. } => MemeErrorKind::InvalidImageUrl,
            Self::ImageDownloadFailed { .. } => MemeErrorKind::ImageDownloadFailed,
            Self::ImageDecodeFailed { .. } => MemeErrorKind::ImageDecodeFailed,
            Self::ImageTooSmall { .. } => MemeErrorKind::ImageTooSmall,
            Self::RandomCacheExhausted => MemeErrorKind::RandomCacheExhausted,
            Self::UnknownRequestFailure { .. } => MemeErrorKind::UnknownRequestFailure,
        }
    }

    /// Text shown to the person who sent the request.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::ImageTooSmall { min_width, .. } => format!(
                "The image provided is too small. Images must have a width of at least {min_width}px."
            ),
            _ => self.kind().user_message().to_string(),
        }
    }
}

impl MemeErrorKind {
    /// Generic user-facing text for the kind.
    #[must_use]
    pub const fn user_message(self) -> &'static str {
        match self {
            Self::InvalidImageUrl => "The image provided is of an invalid image type.",
            Self::ImageDownloadFailed => "Unable to download the image provided.",
            Self::ImageDecodeFailed => "Unable to open the image provided.",
            Self::ImageTooSmall => "The image provided is too small.",
            Self::RandomCacheExhausted => "Failed to download random image. Please try again.",
            Self::UnknownRequestFailure => "An unknown problem occurred. Please try again.",
        }
    }
}
