//! Caption formats and the mapping from command symbols to format applications.

mod demotivational;
mod gifcap;
mod impact;
mod twitter;
mod whisper;

use std::fmt;
use std::sync::Arc;

use image::RgbaImage;

pub use demotivational::Demotivational;
pub use gifcap::Gifcap;
pub use impact::Impact;
pub use twitter::Twitter;
pub use whisper::Whisper;

use super::emoji::EmojiAtlas;
use super::font::FontFace;
use crate::domain::entities::Command;

/// Separates the two halves of a caption, e.g. top and bottom text.
pub const CONTEXT_DELIMITER: &str = "//";

/// Command start symbol.
pub const START_SYMBOL: &str = "-M";
/// Impact, `top // bottom`.
pub const SYMBOL_IMPACT: &str = "-I";
/// Impact, top text only.
pub const SYMBOL_IMPACT_TOP: &str = "-IT";
/// Impact, bottom text only.
pub const SYMBOL_IMPACT_BOTTOM: &str = "-IB";
/// Tweet card.
pub const SYMBOL_TWITTER: &str = "-T";
/// Demotivational poster, `title // subtitle`.
pub const SYMBOL_DEMOTIVATIONAL: &str = "-D";
/// Demotivational title only.
pub const SYMBOL_DEMOTIVATIONAL_TITLE: &str = "-DT";
/// Demotivational subtitle only.
pub const SYMBOL_DEMOTIVATIONAL_SUBTITLE: &str = "-DS";
/// Caption strip above the image.
pub const SYMBOL_GIFCAP: &str = "-G";
/// Centered whisper text.
pub const SYMBOL_WHISPER: &str = "-W";
/// Custom source image URL.
pub const SYMBOL_URL: &str = "-URL";

/// Every symbol the command parser should recognise besides the start symbol.
pub const RECOGNIZED_SYMBOLS: [&str; 10] = [
    SYMBOL_IMPACT,
    SYMBOL_IMPACT_TOP,
    SYMBOL_IMPACT_BOTTOM,
    SYMBOL_TWITTER,
    SYMBOL_DEMOTIVATIONAL,
    SYMBOL_DEMOTIVATIONAL_TITLE,
    SYMBOL_DEMOTIVATIONAL_SUBTITLE,
    SYMBOL_GIFCAP,
    SYMBOL_WHISPER,
    SYMBOL_URL,
];

/// Per-request rendering inputs shared by all formats.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Emoji artwork for the request text.
    pub emoji: &'a EmojiAtlas,
    /// Dark colour scheme where a format has one.
    pub dark: bool,
}

/// A caption style applied to an image.
pub trait MemeFormat: Send + Sync {
    /// Which format this is.
    fn kind(&self) -> FormatKind;

    /// Returns the captioned image. The input may be returned enlarged.
    fn apply(&self, image: RgbaImage, text: &str, ctx: &RenderContext<'_>) -> RgbaImage;
}

/// The closed set of formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatKind {
    /// Top and bottom captions.
    Impact,
    /// Tweet card.
    Twitter,
    /// Black frame with title and subtitle.
    Demotivational,
    /// White caption strip above the image.
    Gifcap,
    /// Centered outlined text.
    Whisper,
}

impl FormatKind {
    /// Lower-case name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Impact => "impact",
            Self::Twitter => "twitter",
            Self::Demotivational => "demotivational",
            Self::Gifcap => "gifcap",
            Self::Whisper => "whisper",
        }
    }
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Splits at the first [`CONTEXT_DELIMITER`] into two trimmed halves.
#[must_use]
pub fn split_context(text: &str) -> (&str, &str) {
    match text.split_once(CONTEXT_DELIMITER) {
        Some((first, second)) => (first.trim(), second.trim()),
        None => (text.trim(), ""),
    }
}

/// One format application derived from a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatStep {
    /// Format to apply.
    pub kind: FormatKind,
    /// Text handed to the format.
    pub text: String,
}

/// Turns the symbols of a command into format applications, in command order.
///
/// `-IT` and `-IB` become impact text on one side of the delimiter. `-DT` and
/// `-DS` merge into a single demotivational application placed where the first
/// of them appears.
#[must_use]
pub fn plan_formats(command: &Command) -> Vec<FormatStep> {
    let mut steps = Vec::new();
    let mut demotivational_planned = false;

    for (symbol, args) in command.iter() {
        let text = args.join(" ");
        let step = match symbol {
            SYMBOL_IMPACT => FormatStep {
                kind: FormatKind::Impact,
                text,
            },
            SYMBOL_IMPACT_TOP => FormatStep {
                kind: FormatKind::Impact,
                text: format!("{text} {CONTEXT_DELIMITER}"),
            },
            SYMBOL_IMPACT_BOTTOM => FormatStep {
                kind: FormatKind::Impact,
                text: format!("{CONTEXT_DELIMITER} {text}"),
            },
            SYMBOL_TWITTER => FormatStep {
                kind: FormatKind::Twitter,
                text,
            },
            SYMBOL_DEMOTIVATIONAL => FormatStep {
                kind: FormatKind::Demotivational,
                text,
            },
            SYMBOL_GIFCAP => FormatStep {
                kind: FormatKind::Gifcap,
                text,
            },
            SYMBOL_WHISPER => FormatStep {
                kind: FormatKind::Whisper,
                text,
            },
            SYMBOL_DEMOTIVATIONAL_TITLE | SYMBOL_DEMOTIVATIONAL_SUBTITLE => {
                if !demotivational_planned {
                    demotivational_planned = true;
                    let title = command.text(SYMBOL_DEMOTIVATIONAL_TITLE).unwrap_or_default();
                    let subtitle = command
                        .text(SYMBOL_DEMOTIVATIONAL_SUBTITLE)
                        .unwrap_or_default();
                    steps.push(FormatStep {
                        kind: FormatKind::Demotivational,
                        text: format!("{title} {CONTEXT_DELIMITER} {subtitle}"),
                    });
                }
                continue;
            }
            _ => continue,
        };
        steps.push(step);
    }

    steps
}

/// Validated fonts for every format.
#[derive(Debug, Clone)]
pub struct FormatFonts {
    /// Font for impact.
    pub impact: FontFace,
    /// Font for twitter.
    pub twitter: FontFace,
    /// Font for gifcap.
    pub gifcap: FontFace,
    /// Font for whisper.
    pub whisper: FontFace,
    /// Font for the demotivational title.
    pub demotivational_title: FontFace,
    /// Font for the demotivational subtitle.
    pub demotivational_subtitle: FontFace,
}

/// One instance of every format, built once at startup.
#[derive(Clone)]
pub struct FormatRegistry {
    impact: Arc<dyn MemeFormat>,
    twitter: Arc<dyn MemeFormat>,
    demotivational: Arc<dyn MemeFormat>,
    gifcap: Arc<dyn MemeFormat>,
    whisper: Arc<dyn MemeFormat>,
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatRegistry").finish_non_exhaustive()
    }
}

impl FormatRegistry {
    /// Builds every format from its font.
    #[must_use]
    pub fn new(fonts: FormatFonts) -> Self {
        Self {
            impact: Arc::new(Impact::new(fonts.impact)),
            twitter: Arc::new(Twitter::new(fonts.twitter)),
            demotivational: Arc::new(Demotivational::new(
                fonts.demotivational_title,
                fonts.demotivational_subtitle,
            )),
            gifcap: Arc::new(Gifcap::new(fonts.gifcap)),
            whisper: Arc::new(Whisper::new(fonts.whisper)),
        }
    }

    /// The format instance for `kind`.
    #[must_use]
    pub fn get(&self, kind: FormatKind) -> &dyn MemeFormat {
        match kind {
            FormatKind::Impact => self.impact.as_ref(),
            FormatKind::Twitter => self.twitter.as_ref(),
            FormatKind::Demotivational => self.demotivational.as_ref(),
            FormatKind::Gifcap => self.gifcap.as_ref(),
            FormatKind::Whisper => self.whisper.as_ref(),
        }
    }

}

/// Applies a planned sequence of formats to an image.
pub trait CaptionRenderer: Send + Sync {
    /// Applies the steps in order.
    fn render(&self, image: RgbaImage, steps: &[FormatStep], ctx: &RenderContext<'_>) -> RgbaImage;
}

impl CaptionRenderer for FormatRegistry {
    fn render(&self, mut image: RgbaImage, steps: &[FormatStep], ctx: &RenderContext<'_>) -> RgbaImage {
        for step in steps {
            image = self.get(step.kind).apply(image, &step.text, ctx);
        }
        image
    }
}

/// `(canvas_width - line_width) / 2`, truncated towards zero.
pub(crate) fn centered_x(canvas_width: u32, line_width: u32) -> i32 {
    let offset = (f64::from(canvas_width) - f64::from(line_width)) / 2.0;
    offset as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::services::CommandParser;
    use test_case::test_case;

    fn plan(raw: &str) -> Vec<FormatStep> {
        let parser = CommandParser::new(START_SYMBOL, RECOGNIZED_SYMBOLS);
        plan_formats(&parser.parse(raw).unwrap())
    }

    fn step(kind: FormatKind, text: &str) -> FormatStep {
        FormatStep {
            kind,
            text: text.to_string(),
        }
    }

    #[test_case("top // bottom", ("top", "bottom") ; "both")]
    #[test_case("only top", ("only top", "") ; "no_delimiter")]
    #[test_case("// bottom", ("", "bottom") ; "leading")]
    #[test_case("a // b // c", ("a", "b // c") ; "first_only")]
    fn test_split_context(text: &str, expected: (&str, &str)) {
        assert_eq!(split_context(text), expected);
    }

    #[test]
    fn test_plan_keeps_command_order() {
        assert_eq!(
            plan("-M -W psst -I top // bottom -T hello"),
            vec![
                step(FormatKind::Whisper, "psst"),
                step(FormatKind::Impact, "top // bottom"),
                step(FormatKind::Twitter, "hello"),
            ]
        );
    }

    #[test]
    fn test_plan_impact_halves() {
        assert_eq!(
            plan("-M -IT up -IB down"),
            vec![
                step(FormatKind::Impact, "up //"),
                step(FormatKind::Impact, "// down"),
            ]
        );
    }

    #[test]
    fn test_plan_merges_demotivational_parts() {
        assert_eq!(
            plan("-M -DS small words -G cap -DT BIG"),
            vec![
                step(FormatKind::Demotivational, "BIG // small words"),
                step(FormatKind::Gifcap, "cap"),
            ]
        );
    }

    #[test]
    fn test_plan_ignores_url_and_start() {
        assert!(plan("-M -URL https://x/a.png").is_empty());
    }

    #[test]
    fn test_centered_x() {
        assert_eq!(centered_x(500, 101), 199);
        assert_eq!(centered_x(100, 120), -10);
    }
}
