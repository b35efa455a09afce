//! Error types for the asset database

use std::path::PathBuf;

use thiserror::Error;
use void_core::FsError;

use crate::guid::Guid;

/// Asset database errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// An externally supplied GUID is already registered
    #[error("GUID already registered: {0}")]
    DuplicateGuid(Guid),

    /// Underlying file-system operation failed
    #[error(transparent)]
    Io(#[from] FsError),

    /// A file and a folder claim the same path, or a target is occupied
    #[error("path conflict at {0:?}")]
    PathConflict(PathBuf),

    /// No live asset has this GUID
    #[error("asset not found: {0}")]
    AssetNotFound(Guid),

    /// No live asset at this path
    #[error("no asset registered at {0:?}")]
    PathNotFound(PathBuf),

    /// Folders carry no importer
    #[error("asset has no importer: {0}")]
    NotImportable(Guid),

    /// Path lies outside the resource directory
    #[error("path is outside the resource directory: {0:?}")]
    OutsideResources(PathBuf),

    /// Sidecar record could not be encoded or decoded
    #[error("invalid sidecar record {path:?}: {message}")]
    Sidecar { path: PathBuf, message: String },

    /// Invalid configuration
    #[error("invalid asset database configuration: {0}")]
    Config(String),
}

/// Result type for asset database operations
pub type AssetResult<T> = Result<T, AssetError>;
