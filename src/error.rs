/// Error types for the gallery
///
/// Image load failures are never errors: they are handled by the
/// fallback chain in `assets::resolver`. What ends up here is either a
/// malformed manifest from the metadata collaborator or an I/O problem
/// while reading the manifest or config.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalleryError {
    /// A raw item is missing one of `id`, `title` or `primarySrc`
    #[error("item #{index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// The manifest is not a JSON array of items
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file exists but could not be parsed
    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, GalleryError>;
