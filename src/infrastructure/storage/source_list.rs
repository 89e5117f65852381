use std::fs;
use std::path::Path;

use tracing::info;

use crate::domain::errors::StartupError;

/// Reads one source identifier per line, trimmed, skipping blank lines.
///
/// # Errors
/// Returns `SourceListMissing` if the file does not exist and `SourceListEmpty`
/// if it holds no identifiers.
pub fn load_source_list(path: &Path) -> Result<Vec<String>, StartupError> {
    if !path.is_file() {
        return Err(StartupError::SourceListMissing {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|source| StartupError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let sources: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    if sources.is_empty() {
        return Err(StartupError::SourceListEmpty {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), count = sources.len(), "Loaded source list");
    Ok(sources)
}
