//! Caption layout: wrapping, font fitting, glyph and emoji drawing, and the
//! formats built on them.
//!
//! Everything here is synchronous and CPU-bound. Callers run it on the
//! blocking pool.

pub mod canvas;
pub mod emoji;
pub mod font;
pub mod formats;
pub mod wrap;

pub use emoji::{EmojiAtlas, strip_modifiers};
pub use font::{FontFace, SizedFont, TextStyle, fit_font, max_line_height};
pub use formats::{
    CaptionRenderer, FormatFonts, FormatKind, FormatRegistry, FormatStep, MemeFormat, RenderContext, plan_formats,
};
pub use wrap::wrap_lines;
