//! Prefab documents written when a scene node is dropped on a folder.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use void_core::FileSystem;

use crate::error::EditorResult;

/// File extension of prefab resources
pub const PREFAB_EXTENSION: &str = "prefab";

/// A prefab is a saved entity template that can be instantiated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Prefab {
    /// Name of the prefab
    pub name: String,
    /// Root entity data
    pub root: PrefabEntity,
    /// Child entities (for hierarchical prefabs)
    #[serde(default)]
    pub children: Vec<PrefabEntity>,
    #[serde(default)]
    pub metadata: PrefabMetadata,
}

/// Entity data stored in a prefab.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefabEntity {
    pub name: String,
    #[serde(default)]
    pub transform: PrefabTransform,
    /// Mesh resource path relative to the resource directory
    #[serde(default)]
    pub mesh: Option<PrefabMesh>,
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabTransform {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

impl Default for PrefabTransform {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.0],
            scale: [1.0, 1.0, 1.0],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabMesh {
    pub model: String,
    #[serde(default)]
    pub material: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrefabMetadata {
    pub version: u32,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

impl Default for PrefabMetadata {
    fn default() -> Self {
        Self {
            version: 1,
            description: None,
            tags: Vec::new(),
        }
    }
}

impl Prefab {
    /// Prefab whose root entity carries the same name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            root: PrefabEntity {
                name: name.clone(),
                ..Default::default()
            },
            name,
            children: Vec::new(),
            metadata: PrefabMetadata::default(),
        }
    }

    /// Prefab built from a scene node and its children
    pub fn from_node(node: &PrefabEntity, children: &[PrefabEntity]) -> Self {
        Self {
            name: node.name.clone(),
            root: node.clone(),
            children: children.to_vec(),
            metadata: PrefabMetadata::default(),
        }
    }

    /// Save prefab as JSON.
    pub fn save(&self, fs: &dyn FileSystem, path: &Path) -> EditorResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs.write(path, json.as_bytes())?;
        log::debug!("Saved prefab {:?} to {:?}", self.name, path);
        Ok(())
    }

    /// Load prefab from JSON.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> EditorResult<Self> {
        let content = fs.read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
