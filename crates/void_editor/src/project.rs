//! Project loading
//!
//! A project is a directory laid out as:
//!
//! ```text
//! MyGame/
//!   project.toml        optional overrides
//!   Resources/          tracked resources
//!     Components/       script components
//!   Cache/              import artifacts
//! ```
//!
//! `project.toml` may override any asset database setting:
//!
//! ```toml
//! [project]
//! name = "My Game"
//!
//! [assets]
//! auto_import = true
//! cache_dir = "Build/Cache"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use void_asset::{AssetDatabase, AssetDatabaseConfig, ScanReport};
use void_core::{FileSystem, NativeFileSystem};

use crate::error::EditorResult;

/// Project file name inside the project directory
pub const PROJECT_FILE_NAME: &str = "project.toml";

/// Script components live here, relative to the resource directory
pub const COMPONENTS_DIR_NAME: &str = "Components";

/// `[project]` table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    pub name: Option<String>,
}

/// Contents of `project.toml`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectFile {
    pub project: ProjectSection,
    pub assets: AssetDatabaseConfig,
}

impl ProjectFile {
    /// Parse `project.toml`; a missing file yields the standard layout
    pub fn load(fs: &dyn FileSystem, project_dir: &Path) -> EditorResult<Self> {
        let path = project_dir.join(PROJECT_FILE_NAME);
        if !fs.exists(&path) {
            log::debug!("No {} in {:?}, using defaults", PROJECT_FILE_NAME, project_dir);
            return Ok(Self::default());
        }
        let text = fs.read_to_string(&path)?;
        let file: Self = toml::from_str(&text)?;
        log::info!("Loaded project file {:?}", path);
        Ok(file)
    }

    /// Write `project.toml`
    pub fn save(&self, fs: &dyn FileSystem, project_dir: &Path) -> EditorResult<()> {
        let text = toml::to_string_pretty(self)?;
        fs.write(&project_dir.join(PROJECT_FILE_NAME), text.as_bytes())?;
        Ok(())
    }

    /// Database config with relative paths resolved against the project
    pub fn database_config(&self, project_dir: &Path) -> AssetDatabaseConfig {
        let mut config = self.assets.clone();
        config.resource_dir = project_dir.join(&config.resource_dir);
        config.cache_dir = project_dir.join(&config.cache_dir);
        config
    }
}

/// An open project and its asset database
pub struct Project {
    root: PathBuf,
    name: String,
    db: AssetDatabase,
}

impl Project {
    /// Open the project at `root` on the native file system
    pub fn open(root: impl AsRef<Path>) -> EditorResult<Self> {
        Self::open_with(root, Arc::new(NativeFileSystem::new()))
    }

    /// Open a project through the given file system.
    ///
    /// The resource directory is created if missing. Nothing is scanned yet.
    pub fn open_with(root: impl AsRef<Path>, fs: Arc<dyn FileSystem>) -> EditorResult<Self> {
        let root = void_core::path::normalize(root);
        let file = ProjectFile::load(fs.as_ref(), &root)?;
        let config = file.database_config(&root);

        fs.create_dir_all(&config.resource_dir)?;
        let db = AssetDatabase::new(config, fs)?;

        let name = file
            .project
            .name
            .clone()
            .unwrap_or_else(|| void_core::path::file_name(&root));
        log::info!("Opened project {:?} at {:?}", name, root);

        Ok(Self { root, name, db })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> &AssetDatabase {
        &self.db
    }

    pub fn database_mut(&mut self) -> &mut AssetDatabase {
        &mut self.db
    }

    pub fn resource_path(&self) -> &Path {
        self.db.resource_path()
    }

    /// Directory holding script components
    pub fn components_path(&self) -> PathBuf {
        self.db.resource_path().join(COMPONENTS_DIR_NAME)
    }

    /// True for the components folder and anything below it
    pub fn is_components_dir_or_file(&self, path: impl AsRef<Path>) -> bool {
        void_core::path::normalize(path).starts_with(self.components_path())
    }

    /// Scan, then import every dirty asset if `import` is set
    pub fn refresh(&mut self, import: bool) -> EditorResult<ScanReport> {
        let mut report = self.db.scan()?;
        if import && !self.db.config().auto_import {
            let imported = self.db.import_dirty()?;
            report.imported += imported.imported;
            report.import_failed += imported.import_failed;
        }
        Ok(report)
    }
}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("root", &self.root)
            .field("name", &self.name)
            .field("db", &self.db)
            .finish()
    }
}
