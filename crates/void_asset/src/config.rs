//! Asset database configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AssetError, AssetResult};

/// Directory holding the tracked resources inside a project
pub const RESOURCES_DIR_NAME: &str = "Resources";

/// Directory holding import artifacts inside a project
pub const CACHE_DIR_NAME: &str = "Cache";

/// Default sidecar extension (`wood.material` -> `wood.material.asset`)
pub const DEFAULT_SIDECAR_EXTENSION: &str = "asset";

/// Asset database configuration.
///
/// Deserializable so a project file can override any field:
///
/// ```toml
/// [assets]
/// auto_import = true
/// write_sidecars = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetDatabaseConfig {
    /// Root of the tracked resource tree
    pub resource_dir: PathBuf,
    /// Directory receiving import artifacts, one file per GUID
    pub cache_dir: PathBuf,
    /// Extension appended to a resource path to locate its sidecar record
    pub sidecar_extension: String,
    /// Persist sidecar records next to resources
    pub write_sidecars: bool,
    /// Import every dirty asset at the end of each scan
    pub auto_import: bool,
    /// Skip files and folders whose name starts with a dot
    pub ignore_hidden: bool,
}

impl Default for AssetDatabaseConfig {
    fn default() -> Self {
        Self {
            resource_dir: PathBuf::from(RESOURCES_DIR_NAME),
            cache_dir: PathBuf::from(CACHE_DIR_NAME),
            sidecar_extension: DEFAULT_SIDECAR_EXTENSION.to_string(),
            write_sidecars: true,
            auto_import: false,
            ignore_hidden: true,
        }
    }
}

impl AssetDatabaseConfig {
    /// Config with explicit resource and cache directories
    pub fn new(resource_dir: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            cache_dir: cache_dir.into(),
            ..Default::default()
        }
    }

    /// Standard layout: `<project>/Resources` and `<project>/Cache`
    pub fn for_project(project_dir: impl AsRef<Path>) -> Self {
        let project_dir = project_dir.as_ref();
        Self::new(
            project_dir.join(RESOURCES_DIR_NAME),
            project_dir.join(CACHE_DIR_NAME),
        )
    }

    /// Check the configuration and normalize its paths
    pub fn validated(mut self) -> AssetResult<Self> {
        if self.resource_dir.as_os_str().is_empty() {
            return Err(AssetError::Config("resource_dir is empty".into()));
        }
        if self.cache_dir.as_os_str().is_empty() {
            return Err(AssetError::Config("cache_dir is empty".into()));
        }
        if self.sidecar_extension.is_empty() || self.sidecar_extension.contains('.') {
            return Err(AssetError::Config(format!(
                "invalid sidecar extension {:?}",
                self.sidecar_extension
            )));
        }

        self.resource_dir = void_core::path::normalize(&self.resource_dir);
        self.cache_dir = void_core::path::normalize(&self.cache_dir);

        if self.cache_dir.starts_with(&self.resource_dir) {
            return Err(AssetError::Config(
                "cache_dir must not live inside resource_dir".into(),
            ));
        }

        self.sidecar_extension = self.sidecar_extension.to_lowercase();
        Ok(self)
    }
}
