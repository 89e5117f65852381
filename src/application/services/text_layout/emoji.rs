//! Emoji detection, text clean-up and per-request emoji artwork.

use std::collections::HashMap;

use futures_util::future::join_all;
use image::RgbaImage;
use tracing::debug;

use crate::domain::ports::EmojiSourcePort;

/// Code points removed before layout: variation selectors, gender signs and
/// the zero-width joiner.
const STRIPPED: [char; 5] = ['\u{FE0E}', '\u{FE0F}', '\u{2640}', '\u{2642}', '\u{200D}'];

const REGIONAL_INDICATORS: std::ops::RangeInclusive<char> = '\u{1F1E6}'..='\u{1F1FF}';

/// Removes code points that would otherwise render as stray boxes between emoji.
#[must_use]
pub fn strip_modifiers(text: &str) -> String {
    text.chars().filter(|c| !STRIPPED.contains(c)).collect()
}

/// Returns true for code points in the emoji blocks.
#[must_use]
pub fn is_emoji(c: char) -> bool {
    matches!(
        u32::from(c),
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2300..=0x23FF | 0x2B05..=0x2B55 | 0x3030 | 0x303D
    )
}

/// A run of plain text or a single emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Characters drawn with the font.
    Text(&'a str),
    /// One emoji, possibly two code points for flags.
    Emoji(&'a str),
}

/// Splits text into plain runs and emoji. A pair of regional indicators is a
/// single flag emoji.
#[must_use]
pub fn segments(text: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut text_start = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_emoji(c) {
            text_start.get_or_insert(i);
            continue;
        }

        if let Some(start) = text_start.take() {
            out.push(Segment::Text(&text[start..i]));
        }

        let mut end = i + c.len_utf8();
        if REGIONAL_INDICATORS.contains(&c)
            && let Some(&(j, next)) = chars.peek()
            && REGIONAL_INDICATORS.contains(&next)
        {
            end = j + next.len_utf8();
            chars.next();
        }
        out.push(Segment::Emoji(&text[i..end]));
    }

    if let Some(start) = text_start {
        out.push(Segment::Text(&text[start..]));
    }

    out
}

/// Emoji artwork resolved for one request.
#[derive(Debug, Clone, Default)]
pub struct EmojiAtlas {
    images: HashMap<String, RgbaImage>,
}

impl EmojiAtlas {
    /// Empty atlas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches artwork for every distinct emoji in `text` concurrently. Emoji
    /// the source cannot supply are left out and render with the font glyph.
    pub async fn resolve(text: &str, source: &dyn EmojiSourcePort) -> Self {
        let mut wanted: Vec<&str> = segments(text)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Emoji(emoji) => Some(emoji),
                Segment::Text(_) => None,
            })
            .collect();
        wanted.sort_unstable();
        wanted.dedup();

        let fetched = join_all(wanted.iter().map(|emoji| source.fetch(emoji))).await;

        let mut atlas = Self::new();
        for (emoji, image) in wanted.into_iter().zip(fetched) {
            match image {
                Some(image) => atlas.insert(emoji, image),
                None => debug!(emoji = %emoji, "No artwork for emoji"),
            }
        }
        atlas
    }

    /// Adds artwork for an emoji.
    pub fn insert(&mut self, emoji: impl Into<String>, image: RgbaImage) {
        self.images.insert(emoji.into(), image);
    }

    /// Artwork for an emoji, if resolved.
    #[must_use]
    pub fn get(&self, emoji: &str) -> Option<&RgbaImage> {
        self.images.get(emoji)
    }

    /// Number of resolved emoji.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Whether no emoji were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::SolidEmojiSource;

    #[test]
    fn test_strip_modifiers() {
        assert_eq!(strip_modifiers("\u{1F937}\u{200D}\u{2642}\u{FE0F} hi"), "\u{1F937} hi");
    }

    #[test]
    fn test_segments_split_text_and_emoji() {
        let text = "hi \u{1F600}\u{1F600} there";
        assert_eq!(
            segments(text),
            vec![
                Segment::Text("hi "),
                Segment::Emoji("\u{1F600}"),
                Segment::Emoji("\u{1F600}"),
                Segment::Text(" there"),
            ]
        );
    }

    #[test]
    fn test_regional_indicator_pair_is_one_flag() {
        let flag = "\u{1F1EC}\u{1F1E7}";
        assert_eq!(segments(flag), vec![Segment::Emoji(flag)]);
    }

    #[test]
    fn test_plain_text_has_no_emoji() {
        assert_eq!(segments("plain"), vec![Segment::Text("plain")]);
        assert!(!is_emoji('A'));
        assert!(is_emoji('\u{2764}'));
    }

    #[tokio::test]
    async fn test_atlas_resolves_each_emoji_once() {
        let source = SolidEmojiSource { size: 8 };
        let atlas = EmojiAtlas::resolve("\u{1F600} a \u{1F600} \u{1F525}", &source).await;

        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas.get("\u{1F525}").map(RgbaImage::width), Some(8));
    }
}
