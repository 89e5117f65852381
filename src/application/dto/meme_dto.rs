//! Request and reply shapes exchanged with the message host.

use bytes::Bytes;

use crate::domain::entities::ImageFileType;

/// Where a caption source image comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Remote image, validated and downloaded.
    Url(String),
    /// Image already in memory, e.g. read from a local file.
    Bytes {
        data: Bytes,
        file_type: ImageFileType,
        name: String,
    },
}

/// A message received by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemeRequest {
    /// Raw message text.
    pub content: String,
    /// Image attached to the message itself.
    pub attachment: Option<ImageSource>,
    /// Image attached to the message being replied to.
    pub reply_attachment: Option<ImageSource>,
}

impl MemeRequest {
    /// Request with message text and no attachments.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Sets the message attachment.
    #[must_use]
    pub fn with_attachment(mut self, source: ImageSource) -> Self {
        self.attachment = Some(source);
        self
    }

    /// Sets the attachment of the replied-to message.
    #[must_use]
    pub fn with_reply_attachment(mut self, source: ImageSource) -> Self {
        self.reply_attachment = Some(source);
        self
    }
}

/// What the host should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemeReply {
    /// The captioned image.
    Image {
        /// `{unix_ns}_{name}` in lower case.
        filename: String,
        /// Encoded JPEG or PNG.
        bytes: Vec<u8>,
        /// Mention the author in the reply. Cleared by the `ANON` option.
        mention_author: bool,
        /// Delete the triggering message.
        delete_trigger: bool,
    },
    /// A plain text answer, e.g. to `PING`.
    Text { content: String },
    /// A user-facing error message.
    Error { message: String },
}
