//! Font faces, sized fonts, measurement and glyph drawing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use rusttype::{Font, Scale, point};

use super::canvas::{blend_pixel, paste};
use super::emoji::{EmojiAtlas, Segment, segments};
use crate::domain::entities::FontSpec;

/// A parsed font file shared read-only between requests.
#[derive(Clone)]
pub struct FontFace {
    font: Arc<Font<'static>>,
    path: PathBuf,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FontFace {
    /// Parses font data read from `path`.
    ///
    /// # Errors
    /// Returns an error message if the data is not a usable font.
    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self, String> {
        let path = path.into();
        let font = Font::try_from_vec(data).ok_or_else(|| "not a TrueType/OpenType font".to_string())?;
        if font.glyph_count() == 0 {
            return Err("font has no glyphs".to_string());
        }
        Ok(Self {
            font: Arc::new(font),
            path,
        })
    }

    /// File the face was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The face at a given size.
    #[must_use]
    pub fn sized(&self, size: u32) -> SizedFont {
        SizedFont {
            face: self.clone(),
            spec: FontSpec::new(self.path.clone(), size),
        }
    }
}

/// Fill, optional outline and emoji placement for one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Glyph colour.
    pub fill: Rgba<u8>,
    /// Outline width and colour.
    pub stroke: Option<(u32, Rgba<u8>)>,
    /// Emoji edge length as a fraction of the font size.
    pub emoji_scale: f32,
    /// Emoji displacement from the top-left of its slot.
    pub emoji_offset: (i32, i32),
}

impl TextStyle {
    /// Plain text in one colour with full-size emoji.
    #[must_use]
    pub const fn plain(fill: Rgba<u8>) -> Self {
        Self {
            fill,
            stroke: None,
            emoji_scale: 1.0,
            emoji_offset: (0, 0),
        }
    }

    /// Adds an outline.
    #[must_use]
    pub const fn with_stroke(mut self, width: u32, color: Rgba<u8>) -> Self {
        self.stroke = Some((width, color));
        self
    }

    /// Sets emoji size and offset.
    #[must_use]
    pub const fn with_emoji(mut self, scale: f32, offset: (i32, i32)) -> Self {
        self.emoji_scale = scale;
        self.emoji_offset = offset;
        self
    }
}

/// A face paired with the [`FontSpec`] it is used at.
#[derive(Debug, Clone)]
pub struct SizedFont {
    face: FontFace,
    spec: FontSpec,
}

impl SizedFont {
    /// Path and size.
    #[must_use]
    pub fn spec(&self) -> &FontSpec {
        &self.spec
    }

    /// Size in points.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.spec.size()
    }

    /// The same face one point smaller, or `None` at size 1.
    #[must_use]
    pub fn shrunk(&self) -> Option<Self> {
        self.spec.shrunk().map(|spec| Self {
            face: self.face.clone(),
            spec,
        })
    }

    fn scale(&self) -> Scale {
        Scale::uniform(self.size() as f32)
    }

    fn ascent(&self) -> f32 {
        self.face.font.v_metrics(self.scale()).ascent
    }

    fn emoji_side(&self, emoji_scale: f32) -> u32 {
        ((self.size() as f32 * emoji_scale) as u32).max(1)
    }

    /// Horizontal advance of a run of plain text, including kerning.
    fn text_width(&self, text: &str) -> f32 {
        let scale = self.scale();
        let font = &self.face.font;
        let mut width = 0.0;
        let mut previous = None;

        for c in text.chars() {
            let glyph = font.glyph(c).scaled(scale);
            if let Some(prev) = previous {
                width += font.pair_kerning(scale, prev, glyph.id());
            }
            width += glyph.h_metrics().advance_width;
            previous = Some(glyph.id());
        }

        width
    }

    /// Lowest inked row of a run of plain text, measured from the top of the line.
    fn text_bottom(&self, text: &str) -> i32 {
        let ascent = self.ascent();
        self.face
            .font
            .layout(text, self.scale(), point(0.0, ascent))
            .filter_map(|g| g.pixel_bounding_box())
            .map(|bb| bb.max.y)
            .max()
            .unwrap_or(0)
    }

    /// Width and height of a line. Emoji with artwork count as squares of
    /// `size * emoji_scale`.
    #[must_use]
    pub fn measure(&self, line: &str, emoji_scale: f32, atlas: &EmojiAtlas) -> (u32, u32) {
        let mut width = 0.0f32;
        let mut height = 0i32;

        for segment in segments(line) {
            match segment {
                Segment::Emoji(emoji) if atlas.get(emoji).is_some() => {
                    let side = self.emoji_side(emoji_scale);
                    width += side as f32;
                    height = height.max(i32::try_from(side).unwrap_or(i32::MAX));
                }
                Segment::Emoji(text) | Segment::Text(text) => {
                    width += self.text_width(text);
                    height = height.max(self.text_bottom(text));
                }
            }
        }

        if height <= 0 {
            let v = self.face.font.v_metrics(self.scale());
            height = (v.ascent - v.descent).ceil() as i32;
        }

        (width.ceil().max(0.0) as u32, u32::try_from(height).unwrap_or(0))
    }

    /// Draws a line with its top-left corner at `(x, y)`.
    pub fn draw(&self, canvas: &mut RgbaImage, x: i32, y: i32, line: &str, style: &TextStyle, atlas: &EmojiAtlas) {
        let baseline = y as f32 + self.ascent();
        let mut cursor = x as f32;

        for segment in segments(line) {
            match segment {
                Segment::Emoji(emoji) if atlas.get(emoji).is_some() => {
                    let side = self.emoji_side(style.emoji_scale);
                    if let Some(art) = atlas.get(emoji) {
                        let art = imageops::resize(art, side, side, FilterType::Triangle);
                        paste(
                            canvas,
                            &art,
                            cursor as i64 + i64::from(style.emoji_offset.0),
                            i64::from(y) + i64::from(style.emoji_offset.1),
                        );
                    }
                    cursor += side as f32;
                }
                Segment::Emoji(text) | Segment::Text(text) => {
                    if let Some((width, color)) = style.stroke {
                        self.draw_outline(canvas, cursor, baseline, text, width, color);
                    }
                    self.draw_run(canvas, cursor, baseline, text, style.fill, (0, 0));
                    cursor += self.text_width(text);
                }
            }
        }
    }

    fn draw_outline(&self, canvas: &mut RgbaImage, x: f32, baseline: f32, text: &str, width: u32, color: Rgba<u8>) {
        let w = i32::try_from(width).unwrap_or(0);
        for dy in -w..=w {
            for dx in -w..=w {
                if (dx, dy) != (0, 0) && dx * dx + dy * dy <= w * w {
                    self.draw_run(canvas, x, baseline, text, color, (dx, dy));
                }
            }
        }
    }

    fn draw_run(&self, canvas: &mut RgbaImage, x: f32, baseline: f32, text: &str, color: Rgba<u8>, shift: (i32, i32)) {
        for glyph in self.face.font.layout(text, self.scale(), point(x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = i64::from(bb.min.x) + i64::from(gx) + i64::from(shift.0);
                let py = i64::from(bb.min.y) + i64::from(gy) + i64::from(shift.1);
                blend_pixel(canvas, px, py, color, coverage);
            });
        }
    }
}

/// Largest size not above `initial` at which `widest(size)` fits in `max_width`.
///
/// Decrements one point at a time and stops at 1, so it evaluates at most
/// `initial` sizes.
pub fn fit_size(initial: u32, max_width: f32, mut widest: impl FnMut(u32) -> f32) -> u32 {
    let mut size = initial.max(1);
    while size > 1 && widest(size) > max_width {
        size -= 1;
    }
    size
}

/// Shrinks `font` until every line is at most `canvas_width * scale` wide.
/// Text that already fits keeps the initial size.
#[must_use]
pub fn fit_font(
    font: &SizedFont,
    lines: &[String],
    canvas_width: u32,
    scale: f32,
    emoji_scale: f32,
    atlas: &EmojiAtlas,
) -> SizedFont {
    let max_width = canvas_width as f32 * scale;
    let size = fit_size(font.size(), max_width, |size| {
        let candidate = font.face.sized(size);
        lines
            .iter()
            .map(|line| candidate.measure(line, emoji_scale, atlas).0 as f32)
            .fold(0.0, f32::max)
    });
    font.face.sized(size)
}

/// Tallest line height at this size.
#[must_use]
pub fn max_line_height(font: &SizedFont, lines: &[String], emoji_scale: f32, atlas: &EmojiAtlas) -> u32 {
    lines
        .iter()
        .map(|line| font.measure(line, emoji_scale, atlas).1)
        .max()
        .unwrap_or(0)
}
