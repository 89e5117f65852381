use image::RgbaImage;

use super::{FormatKind, MemeFormat, RenderContext, centered_x};
use crate::application::services::text_layout::canvas::{BLACK, Border, WHITE, expand};
use crate::application::services::text_layout::font::{
    FontFace, TextStyle, fit_font, max_line_height,
};
use crate::application::services::text_layout::wrap::wrap_lines;

const WORD_WRAP: usize = 25;
const INIT_FONT_SIZE: u32 = 80;
const TEXT_SPACE: u32 = 6;
const MAX_WIDTH: f32 = 0.94;
const HEIGHT_PAD: u32 = 20;
const EMOJI_SCALE: f32 = 0.8;
const EMOJI_OFFSET: (i32, i32) = (0, 17);

/// Black text on a white strip above the image.
#[derive(Debug, Clone)]
pub struct Gifcap {
    face: FontFace,
}

impl Gifcap {
    /// Caption strip drawn with `face`.
    #[must_use]
    pub const fn new(face: FontFace) -> Self {
        Self { face }
    }
}

pub(crate) const fn strip_height(lines: u32, line_height: u32) -> u32 {
    HEIGHT_PAD * 2 + lines * line_height + TEXT_SPACE * lines
}

impl MemeFormat for Gifcap {
    fn kind(&self) -> FormatKind {
        FormatKind::Gifcap
    }

    fn apply(&self, image: RgbaImage, text: &str, ctx: &RenderContext<'_>) -> RgbaImage {
        let lines = wrap_lines(text, WORD_WRAP);
        let font = fit_font(
            &self.face.sized(INIT_FONT_SIZE),
            &lines,
            image.width(),
            MAX_WIDTH,
            1.0,
            ctx.emoji,
        );
        let line_height = max_line_height(&font, &lines, 1.0, ctx.emoji);
        let count = u32::try_from(lines.len()).unwrap_or(u32::MAX);

        let mut canvas = expand(
            &image,
            Border::new(0, strip_height(count, line_height), 0, 0),
            WHITE,
        );
        let width = canvas.width();

        let style = TextStyle::plain(BLACK).with_emoji(EMOJI_SCALE, EMOJI_OFFSET);
        let top = f64::from(HEIGHT_PAD) * 0.7;
        for (i, line) in lines.iter().enumerate() {
            let (line_width, _) = font.measure(line, EMOJI_SCALE, ctx.emoji);
            let y = (i as f64).mul_add(f64::from(line_height + TEXT_SPACE), top);
            font.draw(&mut canvas, centered_x(width, line_width), y as i32, line, &style, ctx.emoji);
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
    fn test_strip_height() {
        assert_eq!(strip_height(1, 50), 96);
        assert_eq!(strip_height(3, 30), 148);
    }

    #[test]
    fn test_strip_is_white_above_image() {
        let face = test_font();
        let atlas = EmojiAtlas::new();
        let ctx = RenderContext {
            emoji: &atlas,
            dark: false,
        };

        let out = Gifcap::new(face).apply(RgbaImage::from_pixel(400, 200, BLACK), "when the", &ctx);

        assert_eq!(out.width(), 400);
        assert!(out.height() > 240);
        assert_eq!(*out.get_pixel(0, 0), WHITE);
        assert_eq!(*out.get_pixel(0, out.height() - 1), BLACK);
    }
}
