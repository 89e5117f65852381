//! Startup loading of the per-format fonts.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::app_config::{AppConfig, FontConfig};
use crate::application::services::text_layout::{FontFace, FormatFonts};
use crate::domain::errors::StartupError;

const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

impl FontConfig {
    /// Loads and parses every configured font.
    ///
    /// # Errors
    /// Returns the first font that is missing, ambiguous or unparsable.
    pub fn load(&self, config: &AppConfig) -> Result<FormatFonts, StartupError> {
        let load = |format: &str, path: &Path| load_font(format, &config.resolve(path));

        let fonts = FormatFonts {
            impact: load("impact", &self.impact)?,
            twitter: load("twitter", &self.twitter)?,
            gifcap: load("gifcap", &self.gifcap)?,
            whisper: load("whisper", &self.whisper)?,
            demotivational_title: load("demotivational title", &self.demotivational_title)?,
            demotivational_subtitle: load("demotivational subtitle", &self.demotivational_subtitle)?,
        };

        info!("Loaded format fonts");
        Ok(fonts)
    }
}

/// Loads the font at `path`, or the single font file inside it when it is a
/// directory.
///
/// # Errors
/// Returns `FontResourceMissing`, `FontResourceAmbiguous` or `FontResourceInvalid`.
pub fn load_font(format: &str, path: &Path) -> Result<FontFace, StartupError> {
    let file = locate_font(format, path)?;

    let data = fs::read(&file).map_err(|e| StartupError::FontResourceInvalid {
        format: format.to_string(),
        path: file.clone(),
        reason: e.to_string(),
    })?;

    let face = FontFace::from_bytes(file.clone(), data).map_err(|reason| StartupError::FontResourceInvalid {
        format: format.to_string(),
        path: file.clone(),
        reason,
    })?;

    debug!(format = format, path = %file.display(), "Loaded font");
    Ok(face)
}

fn locate_font(format: &str, path: &Path) -> Result<PathBuf, StartupError> {
    let missing = || StartupError::FontResourceMissing {
        format: format.to_string(),
        path: path.to_path_buf(),
    };

    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if !path.is_dir() {
        return Err(missing());
    }

    let entries = fs::read_dir(path).map_err(|source| StartupError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|p| p.is_file() && is_font_file(p))
        .collect();

    match candidates.len() {
        0 => Err(missing()),
        1 => Ok(candidates.remove(0)),
        count => Err(StartupError::FontResourceAmbiguous {
            format: format.to_string(),
            path: path.to_path_buf(),
            count,
        }),
    }
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FONT_EXTENSIONS.iter().any(|f| ext.eq_ignore_ascii_case(f)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::text_layout::font::test_support::TEST_FONT_PATH;
    use tempfile::tempdir;

    #[test]
    fn test_missing_path() {
        let dir = tempdir().unwrap();
        let err = load_font("impact", &dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, StartupError::FontResourceMissing { .. }));
    }

    #[test]
    fn test_directory_without_fonts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("README.txt"), "fonts go here").unwrap();

        let err = load_font("gifcap", dir.path()).unwrap_err();
        assert!(matches!(err, StartupError::FontResourceMissing { .. }));
    }

    #[test]
    fn test_directory_with_two_fonts() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ttf"), b"x").unwrap();
        fs::write(dir.path().join("b.OTF"), b"y").unwrap();

        let err = load_font("whisper", dir.path()).unwrap_err();
        assert!(matches!(err, StartupError::FontResourceAmbiguous { count: 2, .. }));
    }

    #[test]
    fn test_unparsable_font() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("broken.ttf"), b"not a font").unwrap();

        let err = load_font("twitter", dir.path()).unwrap_err();
        match err {
            StartupError::FontResourceInvalid { path, .. } => {
                assert_eq!(path, dir.path().join("broken.ttf"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_single_font_in_directory() {
        let dir = tempdir().unwrap();
        fs::copy(TEST_FONT_PATH, dir.path().join("only.ttf")).unwrap();

        let face = load_font("impact", dir.path()).unwrap();
        assert_eq!(face.path(), dir.path().join("only.ttf"));
    }
}
