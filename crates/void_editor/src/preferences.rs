//! Editor preferences and settings.
//!
//! Persistent per-user settings that survive editor restarts, stored as
//! TOML under the user config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, EditorResult};

/// Editor preferences and settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    // Projects
    pub recent_projects: Vec<PathBuf>,
    pub max_recent_projects: usize,

    // Content browser
    pub last_content_folder: Option<PathBuf>,

    // Asset pipeline
    pub auto_import: bool,
    pub watch_debounce_ms: u64,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            recent_projects: Vec::new(),
            max_recent_projects: 10,
            last_content_folder: None,
            auto_import: false,
            watch_debounce_ms: 250,
        }
    }
}

impl EditorPreferences {
    /// Load preferences from a file. A missing file yields defaults.
    pub fn load(path: &Path) -> EditorResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No preferences at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(EditorError::Preferences {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let prefs = toml::from_str(&content)?;
        log::info!("Loaded preferences from {:?}", path);
        Ok(prefs)
    }

    /// Save preferences to a file, creating its directory.
    pub fn save(&self, path: &Path) -> EditorResult<()> {
        let content = toml::to_string_pretty(self)?;
        let io_err = |source| EditorError::Preferences {
            path: path.to_path_buf(),
            source,
        };

        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        std::fs::write(path, content).map_err(io_err)?;

        log::info!("Saved preferences to {:?}", path);
        Ok(())
    }

    /// Get the default preferences path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("void_editor");
            p.push("preferences.toml");
            p
        })
    }

    /// Move `project` to the front of the recent list
    pub fn add_recent_project(&mut self, project: impl Into<PathBuf>) {
        let project = project.into();
        self.recent_projects.retain(|p| p != &project);
        self.recent_projects.insert(0, project);
        self.recent_projects.truncate(self.max_recent_projects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = EditorPreferences::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(prefs, EditorPreferences::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("void_editor").join("preferences.toml");

        let mut prefs = EditorPreferences::default();
        prefs.add_recent_project("/games/Demo");
        prefs.last_content_folder = Some(PathBuf::from("/games/Demo/Resources/Scenes"));
        prefs.watch_debounce_ms = 500;
        prefs.save(&path).unwrap();

        let loaded = EditorPreferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        std::fs::write(&path, "auto_import = true\n").unwrap();

        let prefs = EditorPreferences::load(&path).unwrap();
        assert!(prefs.auto_import);
        assert_eq!(prefs.max_recent_projects, 10);
    }

    #[test]
    fn test_recent_projects_are_capped_and_deduplicated() {
        let mut prefs = EditorPreferences {
            max_recent_projects: 2,
            ..Default::default()
        };
        prefs.add_recent_project("/a");
        prefs.add_recent_project("/b");
        prefs.add_recent_project("/a");
        prefs.add_recent_project("/c");

        assert_eq!(
            prefs.recent_projects,
            vec![PathBuf::from("/c"), PathBuf::from("/a")]
        );
    }
}
