//! Port for emoji artwork.

use async_trait::async_trait;
use image::RgbaImage;

/// Supplies a bitmap for a single emoji.
#[async_trait]
pub trait EmojiSourcePort: Send + Sync {
    /// Returns the artwork for the emoji, or `None` to fall back to the font glyph.
    async fn fetch(&self, emoji: &str) -> Option<RgbaImage>;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Emoji source that paints every emoji as a solid square.
    pub struct SolidEmojiSource {
        /// Edge length of the returned bitmap.
        pub size: u32,
    }

    #[async_trait]
    impl EmojiSourcePort for SolidEmojiSource {
        async fn fetch(&self, _emoji: &str) -> Option<RgbaImage> {
            Some(RgbaImage::from_pixel(
                self.size,
                self.size,
                image::Rgba([255, 200, 0, 255]),
            ))
        }
    }
}
