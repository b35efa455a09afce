//! Editor-level notifications sent by the content view

use std::path::{Path, PathBuf};

/// Editor event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    /// The content view switched to another folder
    ContentFolderChanged { path: PathBuf },
    /// A non-folder resource was activated and should open in its editor
    EditResource { path: PathBuf },
}

impl EditorEvent {
    pub fn path(&self) -> &Path {
        match self {
            Self::ContentFolderChanged { path } | Self::EditResource { path } => path,
        }
    }
}
