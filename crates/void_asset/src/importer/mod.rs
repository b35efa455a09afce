//! Asset importers - pluggable per-type cache generation
//!
//! An importer turns one source file into an engine-ready artifact in the
//! cache directory. The database only talks to the [`AssetImporter`] trait;
//! concrete variants are picked through the [`ImporterRegistry`], which maps
//! file extensions to constructors. Adding a resource type means registering
//! another constructor, nothing else.

mod generic;
mod material;
mod model;
mod prefab;

pub use generic::GenericImporter;
pub use material::{MaterialImporter, MaterialSettings};
pub use model::{AnimationImportInfo, ModelImporter, ModelSettings};
pub use prefab::PrefabImporter;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use void_core::{FileSystem, FsError};

use crate::guid::Guid;

/// Importer type of folders; folders never get an importer instance
pub const FOLDER_IMPORTER_TYPE: &str = "Folder";

/// Error produced by an importer.
///
/// The database absorbs these: the asset stays dirty and observers get a
/// `ResourceChanged` with reason `ImportFailed`.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Reading the source or writing the artifact failed
    #[error(transparent)]
    Io(#[from] FsError),

    /// Source content could not be parsed
    #[error("malformed source {path:?}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// A resource referenced by the source does not exist
    #[error("missing dependency {dependency:?} referenced by {path:?}")]
    MissingDependency { path: PathBuf, dependency: PathBuf },

    /// Importer settings cannot be applied
    #[error("unsupported importer settings: {0}")]
    Unsupported(String),
}

/// Result type for importers
pub type ImportResult<T> = Result<T, ImportError>;

/// Everything an importer may touch while importing one asset.
///
/// Importers see their own source file, their own cache artifact and
/// existence checks for dependencies; never the rest of the database.
pub struct ImportContext<'a> {
    /// GUID of the asset being imported
    pub guid: &'a Guid,
    /// Source file
    pub source_path: &'a Path,
    /// Where the artifact goes
    pub cache_path: &'a Path,
    resource_dir: &'a Path,
    fs: &'a dyn FileSystem,
    /// Dependencies resolved during import
    pub dependencies: Vec<PathBuf>,
}

impl<'a> ImportContext<'a> {
    pub fn new(
        guid: &'a Guid,
        source_path: &'a Path,
        cache_path: &'a Path,
        resource_dir: &'a Path,
        fs: &'a dyn FileSystem,
    ) -> Self {
        Self {
            guid,
            source_path,
            cache_path,
            resource_dir,
            fs,
            dependencies: Vec::new(),
        }
    }

    /// Read the source file
    pub fn read_source(&self) -> ImportResult<Vec<u8>> {
        Ok(self.fs.read(self.source_path)?)
    }

    /// Read the source file as UTF-8
    pub fn read_source_string(&self) -> ImportResult<String> {
        let bytes = self.read_source()?;
        String::from_utf8(bytes).map_err(|e| self.malformed(format!("invalid UTF-8: {}", e)))
    }

    /// Parse the source file as JSON
    pub fn read_source_json(&self) -> ImportResult<serde_json::Value> {
        let text = self.read_source_string()?;
        serde_json::from_str(&text).map_err(|e| self.malformed(e.to_string()))
    }

    /// Write the cache artifact. Any previous artifact survives a failed write.
    pub fn write_cache(&self, data: &[u8]) -> ImportResult<()> {
        Ok(self.fs.write_atomic(self.cache_path, data)?)
    }

    /// Resolve a resource-relative path and require that it exists.
    pub fn require_dependency(&mut self, relative: &str) -> ImportResult<PathBuf> {
        let path = void_core::path::normalize(self.resource_dir.join(relative));
        if !path.starts_with(self.resource_dir) || !self.fs.exists(&path) {
            return Err(ImportError::MissingDependency {
                path: self.source_path.to_path_buf(),
                dependency: PathBuf::from(relative),
            });
        }
        if !self.dependencies.contains(&path) {
            self.dependencies.push(path.clone());
        }
        Ok(path)
    }

    /// Build a `Malformed` error for this source
    pub fn malformed(&self, message: impl Into<String>) -> ImportError {
        ImportError::Malformed {
            path: self.source_path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Per-type import capability.
pub trait AssetImporter {
    /// Discriminator used by `get_assets_by_importer_type` (e.g. `"Material"`)
    fn importer_type(&self) -> &str;

    /// Importer name persisted in sidecar records (e.g. `"MaterialImporter"`)
    fn type_name(&self) -> &str;

    /// Reset type-specific configuration to engine defaults
    fn set_defaults(&mut self);

    /// Convert the source into the cache artifact
    fn import(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()>;

    /// Warm sub-resources before `import` runs
    fn preload(&mut self, _ctx: &mut ImportContext<'_>) -> ImportResult<()> {
        Ok(())
    }

    /// Whether the asset is unusable until a cache artifact exists
    fn requires_cache_file(&self) -> bool {
        true
    }

    /// Settings persisted in the sidecar record
    fn settings(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    /// Restore settings read from a sidecar record
    fn load_settings(&mut self, _settings: &serde_json::Value) -> ImportResult<()> {
        Ok(())
    }

    /// Downcasting hook for editors that expose variant-specific settings
    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        None
    }
}

/// Constructor registered for a set of extensions
pub type ImporterFactory = Box<dyn Fn() -> Box<dyn AssetImporter>>;

struct RegisteredImporter {
    importer_type: String,
    factory: ImporterFactory,
}

/// Maps extensions and importer types to importer constructors
pub struct ImporterRegistry {
    by_extension: BTreeMap<String, usize>,
    entries: Vec<RegisteredImporter>,
}

impl ImporterRegistry {
    /// Registry with no importers; unknown files fall back to a generic one
    pub fn new() -> Self {
        Self {
            by_extension: BTreeMap::new(),
            entries: Vec::new(),
        }
    }

    /// Registry with the built-in material, model, prefab and generic importers
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(&["material"], || Box::new(MaterialImporter::new()));
        registry.register(
            &["mdl", "fbx", "obj", "dae", "blend", "3ds", "gltf", "glb"],
            || Box::new(ModelImporter::new()),
        );
        registry.register(&["prefab"], || Box::new(PrefabImporter::new()));
        registry.register(&["scene"], || Box::new(GenericImporter::new("Scene")));
        registry.register(&["js", "ts", "lua"], || Box::new(GenericImporter::new("JavaScript")));
        registry.register(&["png", "jpg", "jpeg", "bmp", "tga", "dds"], || {
            Box::new(GenericImporter::new("Texture"))
        });
        registry.register(&["wav", "ogg"], || Box::new(GenericImporter::new("Sound")));
        registry.register(&["txt", "json", "xml"], || Box::new(GenericImporter::new("Text")));
        registry
    }

    /// Register a constructor for the given extensions.
    ///
    /// Later registrations win for an extension already mapped.
    pub fn register<F>(&mut self, extensions: &[&str], factory: F)
    where
        F: Fn() -> Box<dyn AssetImporter> + 'static,
    {
        let importer_type = factory().importer_type().to_string();
        let idx = self.entries.len();
        self.entries.push(RegisteredImporter {
            importer_type,
            factory: Box::new(factory),
        });

        for ext in extensions {
            self.by_extension.insert(ext.to_lowercase(), idx);
        }
    }

    /// Fresh importer for a source path, with defaults applied
    pub fn create_for_path(&self, path: &Path) -> Box<dyn AssetImporter> {
        let importer = void_core::path::extension(path)
            .and_then(|ext| self.by_extension.get(&ext))
            .and_then(|&idx| self.entries.get(idx))
            .map(|entry| (entry.factory)())
            .unwrap_or_else(|| Box::new(GenericImporter::default()));
        Self::with_defaults_applied(importer)
    }

    /// Fresh importer for an importer type, with defaults applied
    pub fn create_for_type(&self, importer_type: &str) -> Option<Box<dyn AssetImporter>> {
        self.entries
            .iter()
            .find(|e| e.importer_type == importer_type)
            .map(|e| Self::with_defaults_applied((e.factory)()))
    }

    /// Check if an extension has a dedicated importer
    pub fn supports_extension(&self, ext: &str) -> bool {
        self.by_extension.contains_key(&ext.to_lowercase())
    }

    /// All registered extensions
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_extension.keys().map(|s| s.as_str())
    }

    fn with_defaults_applied(mut importer: Box<dyn AssetImporter>) -> Box<dyn AssetImporter> {
        importer.set_defaults();
        importer
    }
}

impl Default for ImporterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use void_core::MemoryFileSystem;

    struct UpperImporter;

    impl AssetImporter for UpperImporter {
        fn importer_type(&self) -> &str {
            "Upper"
        }

        fn type_name(&self) -> &str {
            "UpperImporter"
        }

        fn set_defaults(&mut self) {}

        fn import(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
            let text = ctx.read_source_string()?;
            ctx.write_cache(text.to_uppercase().as_bytes())
        }
    }

    #[test]
    fn test_registry_dispatch() {
        let registry = ImporterRegistry::with_defaults();

        assert!(registry.supports_extension("material"));
        assert!(registry.supports_extension("FBX"));
        assert!(!registry.supports_extension("xyz"));

        let material = registry.create_for_path(Path::new("/res/wood.material"));
        assert_eq!(material.importer_type(), "Material");
        assert_eq!(material.type_name(), "MaterialImporter");

        let model = registry.create_for_path(Path::new("/res/Ship.FBX"));
        assert_eq!(model.importer_type(), "Model");

        let unknown = registry.create_for_path(Path::new("/res/notes.xyz"));
        assert_eq!(unknown.importer_type(), "Generic");
        assert!(!unknown.requires_cache_file());
    }

    #[test]
    fn test_custom_importer_is_additive() {
        let mut registry = ImporterRegistry::with_defaults();
        registry.register(&["up"], || Box::new(UpperImporter));

        let fs = MemoryFileSystem::new();
        fs.add_file("/res/a.up", "hello");
        fs.add_dir("/cache");

        let guid = Guid::from("g1");
        let mut importer = registry.create_for_path(Path::new("/res/a.up"));
        let mut ctx = ImportContext::new(
            &guid,
            Path::new("/res/a.up"),
            Path::new("/cache/g1"),
            Path::new("/res"),
            &fs,
        );
        importer.import(&mut ctx).unwrap();

        assert_eq!(fs.read(Path::new("/cache/g1")).unwrap(), b"HELLO");
        assert!(registry.create_for_type("Upper").is_some());
    }

    #[test]
    fn test_require_dependency() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/res/Textures/wood.png", "png");

        let guid = Guid::from("g");
        let mut ctx = ImportContext::new(
            &guid,
            Path::new("/res/wood.material"),
            Path::new("/cache/g"),
            Path::new("/res"),
            &fs,
        );

        let resolved = ctx.require_dependency("Textures/wood.png").unwrap();
        assert_eq!(resolved, PathBuf::from("/res/Textures/wood.png"));
        assert_eq!(ctx.dependencies.len(), 1);

        assert!(matches!(
            ctx.require_dependency("Textures/missing.png"),
            Err(ImportError::MissingDependency { .. })
        ));
        assert!(ctx.require_dependency("../outside.png").is_err());
    }
}
