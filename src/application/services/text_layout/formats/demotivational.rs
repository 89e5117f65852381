use image::RgbaImage;

use super::{FormatKind, MemeFormat, RenderContext, centered_x, split_context};
use crate::application::services::text_layout::canvas::{BLACK, Border, WHITE, expand};
use crate::application::services::text_layout::emoji::EmojiAtlas;
use crate::application::services::text_layout::font::{
    FontFace, TextStyle, fit_font, max_line_height,
};
use crate::application::services::text_layout::wrap::wrap_lines;

const BORDER_INNER: u32 = 3;
const BORDER_TOP: u32 = 55;
const BORDER_SIDES_INITIAL: u32 = 75;
const BORDER_SIDES_FINAL: u32 = 25;

const TITLE_PAD_ABOVE: u32 = 38;
const TITLE_WORD_WRAP: usize = 18;
const TITLE_FONT_SIZE: u32 = 60;
const TITLE_MAX_WIDTH: f32 = 0.9;
const TITLE_EMOJI_SCALE: f32 = 0.85;
const TITLE_EMOJI_OFFSET: (i32, i32) = (0, 8);

const SUBTITLE_PAD_ABOVE_SOLO: u32 = 20;
const SUBTITLE_WORD_WRAP: usize = 54;
const SUBTITLE_FONT_SIZE: u32 = 26;
const SUBTITLE_MAX_WIDTH: f32 = 1.0;
const SUBTITLE_EMOJI_SCALE: f32 = 1.0;
const SUBTITLE_EMOJI_OFFSET: (i32, i32) = (0, 5);
const SUBTITLE_LINE_EXTRA: u32 = 5;

/// Framed poster with an upper-case title and a sentence-case subtitle.
#[derive(Debug, Clone)]
pub struct Demotivational {
    title_face: FontFace,
    subtitle_face: FontFace,
}

impl Demotivational {
    /// Uses separate faces for title and subtitle.
    #[must_use]
    pub const fn new(title_face: FontFace, subtitle_face: FontFace) -> Self {
        Self {
            title_face,
            subtitle_face,
        }
    }

    fn apply_title(&self, image: &RgbaImage, lines: &[String], atlas: &EmojiAtlas) -> RgbaImage {
        let mut canvas = expand(image, Border::below(TITLE_PAD_ABOVE), BLACK);
        let (width, height) = canvas.dimensions();

        let font = fit_font(
            &self.title_face.sized(TITLE_FONT_SIZE),
            lines,
            width,
            TITLE_MAX_WIDTH,
            TITLE_EMOJI_SCALE,
            atlas,
        );
        let line_height = f64::from(max_line_height(&font, lines, TITLE_EMOJI_SCALE, atlas));
        canvas = expand(&canvas, Border::below(title_block(lines.len(), line_height)), BLACK);

        let style = TextStyle::plain(WHITE).with_emoji(TITLE_EMOJI_SCALE, TITLE_EMOJI_OFFSET);
        for (i, line) in lines.iter().enumerate() {
            let (line_width, _) = font.measure(line, TITLE_EMOJI_SCALE, atlas);
            let y = (i as f64).mul_add(line_height * 0.95, f64::from(height)) - line_height * 0.5;
            font.draw(&mut canvas, centered_x(width, line_width), y as i32, line, &style, atlas);
        }

        canvas
    }

    fn apply_subtitle(
        &self,
        image: &RgbaImage,
        lines: &[String],
        atlas: &EmojiAtlas,
        has_title: bool,
    ) -> RgbaImage {
        let mut canvas = if has_title {
            image.clone()
        } else {
            expand(image, Border::below(SUBTITLE_PAD_ABOVE_SOLO), BLACK)
        };
        let (width, height) = canvas.dimensions();

        let font = fit_font(
            &self.subtitle_face.sized(SUBTITLE_FONT_SIZE),
            lines,
            width,
            SUBTITLE_MAX_WIDTH,
            SUBTITLE_EMOJI_SCALE,
            atlas,
        );
        let line_height = max_line_height(&font, lines, SUBTITLE_EMOJI_SCALE, atlas) + SUBTITLE_LINE_EXTRA;
        let count = u32::try_from(lines.len()).unwrap_or(u32::MAX);
        canvas = expand(&canvas, Border::below(count * line_height + 5), BLACK);

        let lift = if has_title { 0.3 } else { 0.2 };
        let line_height = f64::from(line_height);
        let style = TextStyle::plain(WHITE).with_emoji(SUBTITLE_EMOJI_SCALE, SUBTITLE_EMOJI_OFFSET);
        for (i, line) in lines.iter().enumerate() {
            let (line_width, _) = font.measure(line, SUBTITLE_EMOJI_SCALE, atlas);
            let y = (i as f64).mul_add(line_height, f64::from(height)) - line_height * lift;
            font.draw(&mut canvas, centered_x(width, line_width), y as i32, line, &style, atlas);
        }

        canvas
    }
}

/// Space added below the title: `int(lines * height * 0.9) + 5`.
pub(crate) fn title_block(lines: usize, line_height: f64) -> u32 {
    (lines as f64 * line_height * 0.9) as u32 + 5
}

/// The frame drawn before any text.
pub(crate) fn frame(image: &RgbaImage) -> RgbaImage {
    let framed = expand(image, Border::uniform(BORDER_INNER), BLACK);
    let framed = expand(&framed, Border::uniform(BORDER_INNER), WHITE);
    expand(
        &framed,
        Border::new(BORDER_SIDES_INITIAL, BORDER_TOP, BORDER_SIDES_INITIAL, 0),
        BLACK,
    )
}

impl MemeFormat for Demotivational {
    fn kind(&self) -> FormatKind {
        FormatKind::Demotivational
    }

    fn apply(&self, image: RgbaImage, text: &str, ctx: &RenderContext<'_>) -> RgbaImage {
        let (title, subtitle) = split_context(text);
        let title_lines = wrap_lines(&title.to_uppercase(), TITLE_WORD_WRAP);
        let subtitle_lines = wrap_lines(subtitle, SUBTITLE_WORD_WRAP);
        let has_title = !title_lines.is_empty();
        let has_subtitle = !subtitle_lines.is_empty();

        let mut canvas = frame(&image);

        if !has_title && !has_subtitle {
            canvas = expand(&canvas, Border::below(BORDER_TOP), BLACK);
        }
        if has_title {
            canvas = self.apply_title(&canvas, &title_lines, ctx.emoji);
        }
        if has_subtitle {
            canvas = self.apply_subtitle(&canvas, &subtitle_lines, ctx.emoji, has_title);
        }

        expand(
            &canvas,
            Border::new(BORDER_SIDES_FINAL, 0, BORDER_SIDES_FINAL, 0),
            BLACK,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::text_layout::font::test_support::test_font;

    #[test]
    fn test_frame_layers() {
        let out = frame(&RgbaImage::from_pixel(100, 50, WHITE));

        assert_eq!(out.dimensions(), (100 + 12 + 150, 50 + 12 + 55));
        assert_eq!(*out.get_pixel(75, 55), BLACK);
        assert_eq!(*out.get_pixel(78, 58), WHITE);
        assert_eq!(*out.get_pixel(81, 61), WHITE);
    }

    #[test]
    fn test_title_block() {
        assert_eq!(title_block(2, 50.0), 95);
        assert_eq!(title_block(1, 33.0), 34);
    }

    #[test]
    fn test_no_text_adds_flat_margin() {
        let face = test_font();
        let atlas = EmojiAtlas::new();
        let ctx = RenderContext {
            emoji: &atlas,
            dark: false,
        };

        let out = Demotivational::new(face.clone(), face).apply(RgbaImage::from_pixel(100, 50, WHITE), " // ", &ctx);

        assert_eq!(out.dimensions(), (100 + 12 + 150 + 50, 50 + 12 + 55 + 55));
    }

    #[test]
    fn test_title_and_subtitle_extend_downwards() {
        let face = test_font();
        let atlas = EmojiAtlas::new();
        let ctx = RenderContext {
            emoji: &atlas,
            dark: false,
        };
        let poster = Demotivational::new(face.clone(), face);
        let source = RgbaImage::from_pixel(500, 300, WHITE);

        let title_only = poster.apply(source.clone(), "failure", &ctx);
        let both = poster.apply(source, "failure // it happens", &ctx);

        assert_eq!(title_only.width(), 500 + 12 + 150 + 50);
        assert!(title_only.height() > 300 + 12 + 55 + TITLE_PAD_ABOVE);
        assert!(both.height() > title_only.height());
    }
}
