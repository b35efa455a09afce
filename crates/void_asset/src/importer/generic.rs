//! Pass-through importer for resources the engine reads directly

use super::{AssetImporter, ImportContext, ImportResult};

/// Importer for resources that need no cache artifact (scenes, scripts,
/// textures, plain text). Importing only checks that the source is readable.
#[derive(Clone, Debug)]
pub struct GenericImporter {
    importer_type: String,
    type_name: String,
}

impl GenericImporter {
    /// Generic importer reporting `importer_type` (e.g. `"Scene"`)
    pub fn new(importer_type: impl Into<String>) -> Self {
        let importer_type = importer_type.into();
        let type_name = format!("{}Importer", importer_type);
        Self {
            importer_type,
            type_name,
        }
    }
}

impl Default for GenericImporter {
    fn default() -> Self {
        Self::new("Generic")
    }
}

impl AssetImporter for GenericImporter {
    fn importer_type(&self) -> &str {
        &self.importer_type
    }

    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn set_defaults(&mut self) {}

    fn import(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
        ctx.read_source()?;
        Ok(())
    }

    fn requires_cache_file(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guid::Guid;
    use std::path::Path;
    use void_core::{FileSystem, MemoryFileSystem};

    #[test]
    fn test_generic_writes_nothing() {
        let fs = MemoryFileSystem::new();
        fs.add_file("/res/level.scene", "<scene/>");
        fs.add_dir("/cache");

        let guid = Guid::from("g");
        let mut ctx = ImportContext::new(&guid, Path::new("/res/level.scene"), Path::new("/cache/g"), Path::new("/res"), &fs);
        let mut importer = GenericImporter::new("Scene");

        importer.import(&mut ctx).unwrap();
        assert_eq!(importer.type_name(), "SceneImporter");
        assert!(!fs.exists(Path::new("/cache/g")));
    }

    #[test]
    fn test_generic_fails_on_missing_source() {
        let fs = MemoryFileSystem::new();
        let guid = Guid::from("g");
        let mut ctx = ImportContext::new(&guid, Path::new("/res/gone.txt"), Path::new("/cache/g"), Path::new("/res"), &fs);
        assert!(GenericImporter::default().import(&mut ctx).is_err());
    }
}
