//! Sidecar records
//!
//! Each resource has a small JSON file next to it (`<path>.asset`) holding
//! its GUID and import metadata, so identity survives an editor restart.
//!
//! ```json
//! {
//!   "version": 1,
//!   "guid": "3f2c9a0e5b8d4e7c9a1b2c3d4e5f6a7b",
//!   "importer": "MaterialImporter",
//!   "settings": { "default_technique": "Techniques/NoTexture.xml" },
//!   "timestamp": { "secs_since_epoch": 1700000000, "nanos_since_epoch": 0 },
//!   "cache": "3f2c9a0e5b8d4e7c9a1b2c3d4e5f6a7b"
//! }
//! ```

use std::path::Path;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use void_core::FileSystem;

use crate::asset::Asset;
use crate::error::{AssetError, AssetResult};
use crate::guid::Guid;

/// Current sidecar format version
pub const SIDECAR_VERSION: u32 = 1;

/// Persisted identity and import metadata of one resource
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SidecarRecord {
    pub version: u32,
    pub guid: Guid,
    /// Importer type name, empty for folders
    #[serde(default)]
    pub importer: String,
    #[serde(default)]
    pub settings: Value,
    /// Source modification time at the last successful import
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<SystemTime>,
    /// Cache artifact file name inside the cache directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
}

impl SidecarRecord {
    /// Snapshot of an asset's persisted state
    pub fn from_asset(asset: &Asset) -> Self {
        Self {
            version: SIDECAR_VERSION,
            guid: asset.guid().clone(),
            importer: asset.importer_type_name().to_string(),
            settings: asset
                .importer()
                .map(|i| i.settings())
                .unwrap_or(Value::Null),
            timestamp: asset.timestamp(),
            cache: asset
                .cache_path()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
        }
    }

    /// Read a sidecar; `Ok(None)` if there is none.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> AssetResult<Option<Self>> {
        if !fs.exists(path) {
            return Ok(None);
        }
        let text = fs.read_to_string(path)?;
        let record: Self = serde_json::from_str(&text).map_err(|e| AssetError::Sidecar {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if record.version > SIDECAR_VERSION {
            return Err(AssetError::Sidecar {
                path: path.to_path_buf(),
                message: format!("unsupported version {}", record.version),
            });
        }
        Ok(Some(record))
    }

    /// Write the sidecar as pretty JSON
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> AssetResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| AssetError::Sidecar {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        fs.write_atomic(path, json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use void_core::MemoryFileSystem;

    #[test]
    fn test_sidecar_save_load() {
        let fs = MemoryFileSystem::new();
        fs.add_dir("/res");
        let record = SidecarRecord {
            version: SIDECAR_VERSION,
            guid: Guid::from("abc"),
            importer: "ModelImporter".into(),
            settings: serde_json::json!({ "scale": 2.0 }),
            timestamp: Some(SystemTime::UNIX_EPOCH + Duration::from_nanos(1_500_000_123)),
            cache: Some("abc".into()),
        };

        record.save(&fs, Path::new("/res/ship.fbx.asset")).unwrap();
        let loaded = SidecarRecord::load(&fs, Path::new("/res/ship.fbx.asset"))
            .unwrap()
            .unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn test_sidecar_missing_and_corrupt() {
        let fs = MemoryFileSystem::new();
        assert!(SidecarRecord::load(&fs, Path::new("/res/none.asset")).unwrap().is_none());

        fs.add_file("/res/bad.asset", "{ nope");
        assert!(matches!(
            SidecarRecord::load(&fs, Path::new("/res/bad.asset")),
            Err(AssetError::Sidecar { .. })
        ));
    }

    #[test]
    fn test_sidecar_minimal_record() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/res/Materials.asset", r#"{ "version": 1, "guid": "folder-guid" }"#);
        let record = SidecarRecord::load(&fs, Path::new("/res/Materials.asset"))
            .unwrap()
            .unwrap();
        assert_eq!(record.guid.as_str(), "folder-guid");
        assert!(record.importer.is_empty());
        assert!(record.timestamp.is_none());
    }
}
