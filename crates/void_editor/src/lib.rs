//! Void Engine Editor - content pipeline front end
//!
//! Editor-side consumers of the asset database:
//!
//! - **Project**: opens a project directory and its asset database
//! - **Folder Tree**: folder hierarchy kept in sync from notifications
//! - **Content View**: listing of one folder, emits editor events
//! - **Commands**: create, delete, move and drag-drop resources
//! - **Preferences**: per-user settings in TOML
//!
//! ## Architecture
//!
//! ```text
//! Disk → AssetDatabase::scan → AssetEvent → FolderTree / ContentView → EditorEvent
//!          ↑
//!   ResourceCommand
//! ```

pub mod cli;
pub mod commands;
pub mod content_view;
pub mod error;
pub mod events;
pub mod folder_tree;
pub mod preferences;
pub mod prefab;
pub mod project;

pub use cli::CliArgs;
pub use commands::{
    CommandOutput, CreateComponent, CreateFolder, CreateScene, DeleteResource, DropFiles, DropNode,
    MoveResource, ResourceCommand,
};
pub use content_view::{ContentEntry, ContentIcon, ContentView};
pub use error::{EditorError, EditorResult};
pub use events::EditorEvent;
pub use folder_tree::{FolderItem, FolderTree};
pub use preferences::EditorPreferences;
pub use prefab::{Prefab, PrefabEntity, PrefabMesh, PrefabTransform};
pub use project::{Project, ProjectFile};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::commands::ResourceCommand;
    pub use crate::content_view::ContentView;
    pub use crate::error::{EditorError, EditorResult};
    pub use crate::events::EditorEvent;
    pub use crate::folder_tree::FolderTree;
    pub use crate::project::Project;
}
