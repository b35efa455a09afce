//! Asset entity - in-memory record of one tracked resource or folder

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::guid::Guid;
use crate::importer::{AssetImporter, FOLDER_IMPORTER_TYPE};

/// One tracked resource or folder.
///
/// Assets are owned by the [`AssetDatabase`](crate::AssetDatabase). The
/// parent relation is a GUID, resolved through the database, never an
/// owning link.
pub struct Asset {
    pub(crate) guid: Guid,
    pub(crate) name: String,
    pub(crate) path: PathBuf,
    pub(crate) dot_asset_filename: PathBuf,
    pub(crate) cache_path: Option<PathBuf>,
    pub(crate) timestamp: Option<SystemTime>,
    pub(crate) importer_type: String,
    pub(crate) importer_type_name: String,
    pub(crate) importer: Option<Box<dyn AssetImporter>>,
    pub(crate) parent: Option<Guid>,
    pub(crate) dirty: bool,
}

impl Asset {
    pub(crate) fn folder(guid: Guid, path: PathBuf, dot_asset_filename: PathBuf) -> Self {
        Self {
            guid,
            name: void_core::path::file_name(&path),
            path,
            dot_asset_filename,
            cache_path: None,
            timestamp: None,
            importer_type: FOLDER_IMPORTER_TYPE.to_string(),
            importer_type_name: String::new(),
            importer: None,
            parent: None,
            dirty: false,
        }
    }

    pub(crate) fn file(
        guid: Guid,
        path: PathBuf,
        dot_asset_filename: PathBuf,
        importer: Box<dyn AssetImporter>,
    ) -> Self {
        Self {
            guid,
            name: void_core::path::file_name(&path),
            path,
            dot_asset_filename,
            cache_path: None,
            timestamp: None,
            importer_type: importer.importer_type().to_string(),
            importer_type_name: importer.type_name().to_string(),
            importer: Some(importer),
            parent: None,
            dirty: true,
        }
    }

    pub fn guid(&self) -> &Guid {
        &self.guid
    }

    /// Base file or folder name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Imported artifact, `None` for folders and types without a cache file
    pub fn cache_path(&self) -> Option<&Path> {
        self.cache_path.as_deref()
    }

    /// Source modification time at the last successful import
    pub fn timestamp(&self) -> Option<SystemTime> {
        self.timestamp
    }

    pub fn importer_type(&self) -> &str {
        &self.importer_type
    }

    /// Importer name as persisted in sidecar records, empty for folders
    pub fn importer_type_name(&self) -> &str {
        &self.importer_type_name
    }

    pub fn importer(&self) -> Option<&dyn AssetImporter> {
        self.importer.as_deref()
    }

    /// GUID of the enclosing folder, `None` at the resource root
    pub fn parent(&self) -> Option<&Guid> {
        self.parent.as_ref()
    }

    /// True while the cached artifact must not be used
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_folder(&self) -> bool {
        self.importer.is_none() && self.importer_type == FOLDER_IMPORTER_TYPE
    }

    /// Path of the sidecar record for this asset
    pub fn dot_asset_filename(&self) -> &Path {
        &self.dot_asset_filename
    }

    /// Whether the asset needs a cache artifact before it is usable
    pub fn requires_cache_file(&self) -> bool {
        self.importer
            .as_ref()
            .map(|i| i.requires_cache_file())
            .unwrap_or(false)
    }

    /// Clean, and its cache artifact (if it needs one) is recorded
    pub fn is_usable(&self) -> bool {
        !self.dirty && (!self.requires_cache_file() || self.cache_path.is_some())
    }

    pub(crate) fn set_path(&mut self, path: PathBuf, dot_asset_filename: PathBuf) {
        self.name = void_core::path::file_name(&path);
        self.path = path;
        self.dot_asset_filename = dot_asset_filename;
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset")
            .field("guid", &self.guid)
            .field("path", &self.path)
            .field("importer_type", &self.importer_type)
            .field("parent", &self.parent)
            .field("dirty", &self.dirty)
            .field("cache_path", &self.cache_path)
            .finish()
    }
}
