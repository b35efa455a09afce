//! Editor error types

use std::path::PathBuf;

use thiserror::Error;
use void_asset::AssetError;
use void_core::FsError;

/// Errors raised by editor-side operations
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("cannot encode TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preferences I/O on {path:?}: {source}")]
    Preferences {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resource name that cannot be used as a file name
    #[error("invalid resource name: {0:?}")]
    InvalidName(String),

    /// Drop or create target is not a folder inside the project
    #[error("not a resource folder: {0:?}")]
    NotAFolder(PathBuf),

    /// Destination already exists
    #[error("resource already exists: {0:?}")]
    AlreadyExists(PathBuf),

    #[cfg(feature = "watch")]
    #[error(transparent)]
    Watch(#[from] void_asset::WatchError),

    /// Bad command line
    #[error("{0}")]
    Usage(String),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;
