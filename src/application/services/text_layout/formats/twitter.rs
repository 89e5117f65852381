use image::{Rgba, RgbaImage};

use super::{FormatKind, MemeFormat, RenderContext};
use crate::application::services::text_layout::canvas::{BLACK, Border, WHITE, expand, round_corners};
use crate::application::services::text_layout::font::{
    FontFace, TextStyle, fit_font, max_line_height,
};
use crate::application::services::text_layout::wrap::wrap_lines;

const WORD_WRAP: usize = 24;
const INIT_FONT_SIZE: u32 = 42;
const MAX_WIDTH: f32 = 0.94;
const PAD: u32 = 15;
const PAD_MULTILINE: u32 = 10;
const RADIUS: u32 = 60;
const SUPERSAMPLE: u32 = 3;
const EMOJI_SCALE: f32 = 1.0;
const EMOJI_OFFSET: (i32, i32) = (0, 3);

/// Background of the dark theme, `#15202b`.
pub const DARK_BACKGROUND: Rgba<u8> = Rgba([0x15, 0x20, 0x2b, 255]);

/// A tweet card: rounded image under left-aligned text.
#[derive(Debug, Clone)]
pub struct Twitter {
    face: FontFace,
}

impl Twitter {
    /// Tweet card drawn with `face`.
    #[must_use]
    pub const fn new(face: FontFace) -> Self {
        Self { face }
    }
}

/// Height of the text block above the image.
pub(crate) const fn header_height(lines: u32, line_height: u32) -> u32 {
    PAD * 2 + lines * (line_height + PAD_MULTILINE)
}

impl MemeFormat for Twitter {
    fn kind(&self) -> FormatKind {
        FormatKind::Twitter
    }

    fn apply(&self, image: RgbaImage, text: &str, ctx: &RenderContext<'_>) -> RgbaImage {
        let (background, foreground) = if ctx.dark {
            (DARK_BACKGROUND, WHITE)
        } else {
            (WHITE, BLACK)
        };

        let lines = wrap_lines(text, WORD_WRAP);
        let font = fit_font(
            &self.face.sized(INIT_FONT_SIZE),
            &lines,
            image.width(),
            MAX_WIDTH,
            EMOJI_SCALE,
            ctx.emoji,
        );
        let line_height = max_line_height(&font, &lines, EMOJI_SCALE, ctx.emoji);

        let rounded = round_corners(&image, RADIUS, SUPERSAMPLE, background);
        let count = u32::try_from(lines.len()).unwrap_or(u32::MAX);
        let border = Border::new(PAD, header_height(count, line_height), PAD, PAD);
        let mut canvas = expand(&rounded, border, background);

        let style = TextStyle::plain(foreground).with_emoji(EMOJI_SCALE, EMOJI_OFFSET);
        for (i, line) in lines.iter().enumerate() {
            let i = u32::try_from(i).unwrap_or(u32::MAX);
            let y = PAD + i * (line_height + PAD_MULTILINE);
            font.draw(&mut canvas, PAD as i32, y as i32, line, &style, ctx.emoji);
        }

        canvas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::text_layout::emoji::EmojiAtlas;
    use crate::application::services::text_layout::font::test_support::test_font;

    #[test]
    fn test_header_height() {
        assert_eq!(header_height(0, 40), 30);
        assert_eq!(header_height(2, 40), 130);
    }

    #[test]
    fn test_dark_card_uses_dark_background() {
        let face = test_font();
        let atlas = EmojiAtlas::new();
        let ctx = RenderContext {
            emoji: &atlas,
            dark: true,
        };

        let out = Twitter::new(face).apply(RgbaImage::from_pixel(400, 300, WHITE), "hello", &ctx);

        assert_eq!(out.width(), 430);
        assert!(out.height() > 300 + 30 + 15);
        assert_eq!(*out.get_pixel(0, 0), DARK_BACKGROUND);
        assert_eq!(*out.get_pixel(out.width() - 1, out.height() - 1), DARK_BACKGROUND);
    }
}
