//! File-system error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by a [`FileSystem`](crate::fs::FileSystem) implementation.
///
/// Every variant carries the path it failed on so callers can report it
/// without extra bookkeeping.
#[derive(Debug, Error)]
pub enum FsError {
    /// Underlying I/O failure
    #[error("{op} failed for {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path does not exist
    #[error("{op}: no such file or directory: {path:?}")]
    NotFound { op: &'static str, path: PathBuf },

    /// Destination already exists
    #[error("{op}: destination already exists: {path:?}")]
    AlreadyExists { op: &'static str, path: PathBuf },

    /// Directory operation on a file
    #[error("{op}: not a directory: {path:?}")]
    NotADirectory { op: &'static str, path: PathBuf },
}

impl FsError {
    /// Wrap an `std::io::Error`, mapping `NotFound` to its own variant.
    pub fn from_io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { op, path },
            std::io::ErrorKind::AlreadyExists => Self::AlreadyExists { op, path },
            _ => Self::Io { op, path, source },
        }
    }

    /// Path the failed operation targeted
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::NotFound { path, .. }
            | Self::AlreadyExists { path, .. }
            | Self::NotADirectory { path, .. } => path,
        }
    }

    /// True for the `NotFound` variant
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for file-system operations
pub type FsResult<T> = Result<T, FsError>;
