use std::path::PathBuf;
use thiserror::Error;

/// Error type for shimres resolution.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read manifest at {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Cannot find module '{specifier}' from '{}'", base.display())]
    NotFound { specifier: String, base: PathBuf },
}
