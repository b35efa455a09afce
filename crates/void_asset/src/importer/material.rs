//! Material importer
//!
//! Materials are JSON documents:
//!
//! ```json
//! {
//!     "technique": "Techniques/Diff.xml",
//!     "textures": { "diffuse": "Textures/wood.png" },
//!     "parameters": { "MatSpecColor": [0.2, 0.2, 0.2, 16.0] }
//! }
//! ```
//!
//! Importing checks that every referenced texture exists and writes the
//! material with its technique filled in.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{AssetImporter, ImportContext, ImportError, ImportResult};

/// Engine default technique for materials that do not name one
pub const DEFAULT_TECHNIQUE: &str = "Techniques/NoTexture.xml";

/// Persisted material importer settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialSettings {
    /// Technique used when the material omits `technique`
    pub default_technique: String,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            default_technique: DEFAULT_TECHNIQUE.to_string(),
        }
    }
}

/// Importer for `.material` resources
#[derive(Clone, Debug, Default)]
pub struct MaterialImporter {
    pub settings: MaterialSettings,
}

impl MaterialImporter {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, ctx: &mut ImportContext<'_>) -> ImportResult<Map<String, Value>> {
        let mut material = match ctx.read_source_json()? {
            Value::Object(map) => map,
            _ => return Err(ctx.malformed("material must be a JSON object")),
        };

        if let Some(textures) = material.get("textures") {
            let textures = textures
                .as_object()
                .ok_or_else(|| ctx.malformed("`textures` must be an object"))?
                .clone();
            for (unit, texture) in &textures {
                let texture = texture
                    .as_str()
                    .ok_or_else(|| ctx.malformed(format!("texture unit `{}` is not a path", unit)))?;
                ctx.require_dependency(texture)?;
            }
        }

        match material.get("technique") {
            Some(Value::String(_)) => {}
            Some(_) => return Err(ctx.malformed("`technique` must be a string")),
            None => {
                material.insert(
                    "technique".to_string(),
                    Value::String(self.settings.default_technique.clone()),
                );
            }
        }

        Ok(material)
    }
}

impl AssetImporter for MaterialImporter {
    fn importer_type(&self) -> &str {
        "Material"
    }

    fn type_name(&self) -> &str {
        "MaterialImporter"
    }

    fn set_defaults(&mut self) {
        self.settings = MaterialSettings::default();
    }

    fn import(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
        let material = self.resolve(ctx)?;
        let bytes = serde_json::to_vec(&Value::Object(material))
            .map_err(|e| ctx.malformed(e.to_string()))?;
        ctx.write_cache(&bytes)
    }

    fn settings(&self) -> Value {
        serde_json::to_value(&self.settings).unwrap_or(Value::Null)
    }

    fn load_settings(&mut self, settings: &Value) -> ImportResult<()> {
        if settings.is_null() {
            return Ok(());
        }
        self.settings = serde_json::from_value(settings.clone())
            .map_err(|e| ImportError::Unsupported(e.to_string()))?;
        Ok(())
    }

    fn as_any_mut(&mut self) -> Option<&mut dyn std::any::Any> {
        Some(self as &mut dyn std::any::Any)
    }
}
