//! Font resource description.

use std::path::{Path, PathBuf};

/// A font file at a given pixel size.
///
/// Shrinking produces a new value; a spec is never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontSpec {
    path: PathBuf,
    size: u32,
}

impl FontSpec {
    /// Creates a spec. Sizes below 1 are clamped to 1.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, size: u32) -> Self {
        Self {
            path: path.into(),
            size: size.max(1),
        }
    }

    /// Font file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pixel size.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Same font at another size.
    #[must_use]
    pub fn with_size(&self, size: u32) -> Self {
        Self::new(self.path.clone(), size)
    }

    /// Same font one pixel smaller, or `None` at the floor of 1.
    #[must_use]
    pub fn shrunk(&self) -> Option<Self> {
        (self.size > 1).then(|| self.with_size(self.size - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shrunk_leaves_original() {
        let spec = FontSpec::new("impact.ttf", 50);
        let smaller = spec.shrunk().unwrap();

        assert_eq!(spec.size(), 50);
        assert_eq!(smaller.size(), 49);
        assert_eq!(smaller.path(), spec.path());
    }

    #[test]
    fn test_shrunk_floor() {
        assert!(FontSpec::new("a.ttf", 1).shrunk().is_none());
        assert_eq!(FontSpec::new("a.ttf", 0).size(), 1);
    }
}
