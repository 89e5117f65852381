use image::RgbaImage;

use super::{FormatKind, MemeFormat, RenderContext, centered_x};
use crate::application::services::text_layout::canvas::{BLACK, WHITE};
use crate::application::services::text_layout::font::{
    FontFace, TextStyle, fit_font, max_line_height,
};
use crate::application::services::text_layout::wrap::wrap_lines;

const WORD_WRAP: usize = 15;
const INIT_FONT_SIZE: u32 = 92;
const MAX_WIDTH: f32 = 1.0;
const STROKE_WIDTH: u32 = 4;
const TEXT_SPACE: f64 = 5.0;
const LINE_LIFT: f64 = 50.0;
const VERTICAL_ANCHOR: f64 = 0.52;
const EMOJI_SCALE: f32 = 0.75;
const EMOJI_OFFSET: (i32, i32) = (0, 6);

/// Outlined white text centered slightly below the middle of the image.
#[derive(Debug, Clone)]
pub struct Whisper {
    face: FontFace,
}

impl Whisper {
    /// Whisper overlay drawn with `face`.
    #[must_use]
    pub const fn new(face: FontFace) -> Self {
        Self { face }
    }
}

/// Top of line `index` of `count`. Each extra line lifts the block by 50px.
pub(crate) fn line_top(image_height: u32, own_height: u32, max_height: u32, index: usize, count: usize) -> i32 {
    let centre = (f64::from(image_height) - f64::from(own_height)) * VERTICAL_ANCHOR;
    let step = index as f64 * (f64::from(max_height) + TEXT_SPACE);
    let lift = count.saturating_sub(1) as f64 * LINE_LIFT;
    (centre + step - lift) as i32
}

impl MemeFormat for Whisper {
    fn kind(&self) -> FormatKind {
        FormatKind::Whisper
    }

    fn apply(&self, mut image: RgbaImage, text: &str, ctx: &RenderContext<'_>) -> RgbaImage {
        let lines = wrap_lines(text, WORD_WRAP);
        let (width, height) = image.dimensions();
        let font = fit_font(
            &self.face.sized(INIT_FONT_SIZE),
            &lines,
            width,
            MAX_WIDTH,
            1.0,
            ctx.emoji,
        );
        let max_height = max_line_height(&font, &lines, 1.0, ctx.emoji);

        let style = TextStyle::plain(WHITE)
            .with_stroke(STROKE_WIDTH, BLACK)
            .with_emoji(EMOJI_SCALE, EMOJI_OFFSET);
        for (i, line) in lines.iter().enumerate() {
            let (line_width, line_height) = font.measure(line, EMOJI_SCALE, ctx.emoji);
            let y = line_top(height, line_height, max_height, i, lines.len());
            font.draw(&mut image, centered_x(width, line_width), y, line, &style, ctx.emoji);
        }

        image
    }
}
