use image::RgbaImage;

use super::{FormatKind, MemeFormat, RenderContext, centered_x, split_context};
use crate::application::services::text_layout::canvas::{BLACK, WHITE};
use crate::application::services::text_layout::font::{
    FontFace, TextStyle, fit_font, max_line_height,
};
use crate::application::services::text_layout::wrap::wrap_lines;

const WORD_WRAP: usize = 25;
const INIT_FONT_SIZE: u32 = 50;
const MAX_WIDTH: f32 = 0.94;
const STROKE_WIDTH: u32 = 3;
const PAD_BOTTOM: i64 = 13;
const TOP_NUDGE: i64 = 4;
const EMOJI_SCALE: f32 = 0.9;
const EMOJI_OFFSET: (i32, i32) = (0, 15);

/// Classic upper-case white text with a black outline at the top and bottom.
#[derive(Debug, Clone)]
pub struct Impact {
    face: FontFace,
}

impl Impact {
    /// Impact captions drawn with `face`.
    #[must_use]
    pub const fn new(face: FontFace) -> Self {
        Self { face }
    }
}

impl MemeFormat for Impact {
    fn kind(&self) -> FormatKind {
        FormatKind::Impact
    }

    fn apply(&self, mut image: RgbaImage, text: &str, ctx: &RenderContext<'_>) -> RgbaImage {
        let (top, bottom) = split_context(text);
        let (width, height) = image.dimensions();
        let style = TextStyle::plain(WHITE)
            .with_stroke(STROKE_WIDTH, BLACK)
            .with_emoji(EMOJI_SCALE, EMOJI_OFFSET);

        for (half, is_top) in [(top, true), (bottom, false)] {
            let lines = wrap_lines(&half.to_uppercase(), WORD_WRAP);
            if lines.is_empty() {
                continue;
            }

            let font = fit_font(
                &self.face.sized(INIT_FONT_SIZE),
                &lines,
                width,
                MAX_WIDTH,
                EMOJI_SCALE,
                ctx.emoji,
            );
            let line_height = i64::from(max_line_height(&font, &lines, EMOJI_SCALE, ctx.emoji));
            let count = lines.len() as i64;

            for (i, line) in lines.iter().enumerate() {
                let (line_width, _) = font.measure(line, EMOJI_SCALE, ctx.emoji);
                let i = i as i64;
                let y = if is_top {
                    i * line_height - TOP_NUDGE
                } else {
                    i64::from(height) - PAD_BOTTOM - (count - i) * line_height
                };
                font.draw(
                    &mut image,
                    centered_x(width, line_width),
                    y as i32,
                    line,
                    &style,
                    ctx.emoji,
                );
            }
        }

        image
    }
}
