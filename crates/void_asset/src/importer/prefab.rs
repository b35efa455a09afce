//! Prefab importer

use serde_json::Value;

use super::{AssetImporter, ImportContext, ImportResult};

/// Importer for `.prefab` resources.
///
/// `preload` parses and validates the prefab; `import` writes the parsed
/// document to the cache so scene loading never re-validates it.
#[derive(Clone, Debug, Default)]
pub struct PrefabImporter {
    loaded: Option<Value>,
}

impl PrefabImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefab parsed by the last successful `preload`
    pub fn loaded(&self) -> Option<&Value> {
        self.loaded.as_ref()
    }
}

impl AssetImporter for PrefabImporter {
    fn importer_type(&self) -> &str {
        "Prefab"
    }

    fn type_name(&self) -> &str {
        "PrefabImporter"
    }

    fn set_defaults(&mut self) {
        self.loaded = None;
    }

    fn preload(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
        self.loaded = None;
        let prefab = ctx.read_source_json()?;

        let object = prefab
            .as_object()
            .ok_or_else(|| ctx.malformed("prefab must be a JSON object"))?;
        if !object.get("name").map(Value::is_string).unwrap_or(false) {
            return Err(ctx.malformed("prefab has no `name`"));
        }
        if !object.get("root").map(Value::is_object).unwrap_or(false) {
            return Err(ctx.malformed("prefab has no `root` entity"));
        }

        self.loaded = Some(prefab);
        Ok(())
    }

    fn import(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
        if self.loaded.is_none() {
            self.preload(ctx)?;
        }
        // Consume the preloaded document so the next import re-reads the source
        let prefab = self
            .loaded
            .take()
            .ok_or_else(|| ctx.malformed("prefab not loaded"))?;
        let bytes = serde_json::to_vec(&prefab).map_err(|e| ctx.malformed(e.to_string()))?;
        ctx.write_cache(&bytes)
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self as &mut dyn std::any::Any)
    }
}
