//! Startup-time configuration faults. All of these are fatal.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the process before it accepts requests.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StartupError {
    #[error("font not found for {format}: {}", path.display())]
    FontResourceMissing { format: String, path: PathBuf },

    #[error("multiple fonts ({count}) found for {format} in {}", path.display())]
    FontResourceAmbiguous {
        format: String,
        path: PathBuf,
        count: usize,
    },

    #[error("font for {format} at {} could not be loaded: {reason}", path.display())]
    FontResourceInvalid {
        format: String,
        path: PathBuf,
        reason: String,
    },

    #[error("source list does not exist at {}", path.display())]
    SourceListMissing { path: PathBuf },

    #[error("source list is empty at {}", path.display())]
    SourceListEmpty { path: PathBuf },

    #[error("io error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
