//! Model importer
//!
//! Mesh and animation decoding belongs to the engine's model tool; this
//! importer owns the settings that drive it and produces the cache
//! artifact the engine loads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{AssetImporter, ImportContext, ImportError, ImportResult};

/// Magic bytes prefixed to model cache artifacts
pub const MODEL_CACHE_MAGIC: &[u8; 4] = b"VMDL";

/// One animation clip extracted from a model source
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationImportInfo {
    pub name: String,
    pub start_time: f32,
    pub end_time: f32,
}

/// Persisted model importer settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub scale: f32,
    pub import_animations: bool,
    pub animations: Vec<AnimationImportInfo>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            scale: 1.0,
            import_animations: false,
            animations: Vec::new(),
        }
    }
}

/// Importer for model resources (`.fbx`, `.obj`, `.mdl`, ...)
#[derive(Clone, Debug, Default)]
pub struct ModelImporter {
    pub settings: ModelSettings,
}

impl ModelImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale(&self) -> f32 {
        self.settings.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        self.settings.scale = scale;
    }

    pub fn import_animations(&self) -> bool {
        self.settings.import_animations
    }

    pub fn set_import_animations(&mut self, import_animations: bool) {
        self.settings.import_animations = import_animations;
    }

    pub fn animation_count(&self) -> usize {
        self.settings.animations.len()
    }

    /// Resize the clip list, naming new clips `Animation<N>`
    pub fn set_animation_count(&mut self, count: usize) {
        let animations = &mut self.settings.animations;
        while animations.len() < count {
            let index = animations.len();
            animations.push(AnimationImportInfo {
                name: format!("Animation{}", index),
                start_time: 0.0,
                end_time: 0.0,
            });
        }
        animations.truncate(count);
    }

    pub fn animation_info(&self, index: usize) -> Option<&AnimationImportInfo> {
        self.settings.animations.get(index)
    }

    pub fn animation_info_mut(&mut self, index: usize) -> Option<&mut AnimationImportInfo> {
        self.settings.animations.get_mut(index)
    }

    fn validate(&self, ctx: &ImportContext<'_>) -> ImportResult<()> {
        if !(self.settings.scale.is_finite() && self.settings.scale > 0.0) {
            return Err(ImportError::Unsupported(format!(
                "model scale must be positive, got {}",
                self.settings.scale
            )));
        }
        if self.settings.import_animations {
            for clip in &self.settings.animations {
                if clip.end_time < clip.start_time {
                    return Err(ctx.malformed(format!(
                        "animation `{}` ends before it starts",
                        clip.name
                    )));
                }
            }
        }
        Ok(())
    }
}

impl AssetImporter for ModelImporter {
    fn importer_type(&self) -> &str {
        "Model"
    }

    fn type_name(&self) -> &str {
        "ModelImporter"
    }

    fn set_defaults(&mut self) {
        self.settings = ModelSettings::default();
    }

    fn import(&mut self, ctx: &mut ImportContext<'_>) -> ImportResult<()> {
        self.validate(ctx)?;

        let source = ctx.read_source()?;
        if source.is_empty() {
            return Err(ctx.malformed("model source is empty"));
        }

        // Header: magic, settings length, settings JSON, then the source payload
        let header = serde_json::to_vec(&self.settings).map_err(|e| ctx.malformed(e.to_string()))?;
        let mut artifact = Vec::with_capacity(MODEL_CACHE_MAGIC.len() + 4 + header.len() + source.len());
        artifact.extend_from_slice(MODEL_CACHE_MAGIC);
        artifact.extend_from_slice(&(header.len() as u32).to_le_bytes());
        artifact.extend_from_slice(&header);
        artifact.extend_from_slice(&source);

        ctx.write_cache(&artifact)
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
