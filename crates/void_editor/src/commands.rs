//! Resource commands issued by the project browser.
//!
//! Every command changes the resource directory on disk and leaves the
//! asset database up to date before returning. Commands that create files
//! go through a rescan so GUIDs, sidecars and notifications follow the
//! normal discovery path.

use std::path::{Path, PathBuf};

use void_asset::{AssetDatabase, AssetError};

use crate::error::{EditorError, EditorResult};
use crate::prefab::{Prefab, PrefabEntity, PREFAB_EXTENSION};
use crate::project::COMPONENTS_DIR_NAME;

/// Paths created or changed by a command
pub type CommandOutput = Vec<PathBuf>;

/// A change to the resource directory.
pub trait ResourceCommand {
    /// Human-readable description for menus and logs.
    fn description(&self) -> &str;

    /// Apply the command to disk and bring `db` up to date.
    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput>;
}

/// Run a command, logging its outcome
pub fn execute(db: &mut AssetDatabase, command: &mut dyn ResourceCommand) -> EditorResult<CommandOutput> {
    match command.execute(db) {
        Ok(paths) => {
            log::info!("{}: {:?}", command.description(), paths);
            Ok(paths)
        }
        Err(e) => {
            log::warn!("{} failed: {}", command.description(), e);
            Err(e)
        }
    }
}

/// Reject names that cannot be a single file name inside the project
pub fn validate_name(db: &AssetDatabase, name: &str) -> EditorResult<()> {
    let sidecar_suffix = format!(".{}", db.config().sidecar_extension);
    let invalid = name.trim().is_empty()
        || name != name.trim()
        || name.starts_with('.')
        || name.ends_with(&sidecar_suffix)
        || name.chars().any(|c| matches!(c, '/' | '\\' | ':') || c.is_control());
    if invalid {
        return Err(EditorError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// The resource root or a tracked folder
fn resolve_folder(db: &AssetDatabase, folder: &Path) -> EditorResult<PathBuf> {
    let folder = void_core::path::normalize(folder);
    if folder == db.resource_path() {
        return Ok(folder);
    }
    match db.get_asset_by_path(&folder) {
        Some(asset) if asset.is_folder() => Ok(folder),
        _ => Err(EditorError::NotAFolder(folder)),
    }
}

/// `name` with `extension` appended unless it already ends with it
fn with_extension(name: &str, extension: &str) -> String {
    let suffix = format!(".{}", extension);
    if name.to_lowercase().ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{}{}", name, suffix)
    }
}

fn ensure_free(db: &AssetDatabase, path: &Path) -> EditorResult<()> {
    if db.file_system().exists(path) {
        return Err(EditorError::AlreadyExists(path.to_path_buf()));
    }
    Ok(())
}

/// Create a new folder.
#[derive(Clone, Debug)]
pub struct CreateFolder {
    pub parent: PathBuf,
    pub name: String,
}

impl ResourceCommand for CreateFolder {
    fn description(&self) -> &str {
        "Create Folder"
    }

    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput> {
        validate_name(db, &self.name)?;
        let path = resolve_folder(db, &self.parent)?.join(&self.name);
        ensure_free(db, &path)?;

        db.file_system().create_dir_all(&path)?;
        db.scan()?;
        Ok(vec![path])
    }
}

/// Scene written by [`CreateScene`]
pub const SCENE_TEMPLATE: &str = r#"{
  "version": 1,
  "nodes": [
    { "name": "Zone", "type": "Zone", "children": [] }
  ]
}
"#;

/// Create an empty scene.
#[derive(Clone, Debug)]
pub struct CreateScene {
    pub parent: PathBuf,
    pub name: String,
}

impl ResourceCommand for CreateScene {
    fn description(&self) -> &str {
        "Create Scene"
    }

    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput> {
        validate_name(db, &self.name)?;
        let path = resolve_folder(db, &self.parent)?.join(with_extension(&self.name, "scene"));
        ensure_free(db, &path)?;

        db.file_system().write(&path, SCENE_TEMPLATE.as_bytes())?;
        db.scan()?;
        Ok(vec![path])
    }
}

/// Create a script component in the components folder.
#[derive(Clone, Debug)]
pub struct CreateComponent {
    pub name: String,
}

impl CreateComponent {
    fn source(&self) -> String {
        let class = self.name.trim_end_matches(".js");
        format!(
            "\"atomic component\";\n\n\
             // {class}\n\
             exports.component = function(self) {{\n\
             \x20   self.start = function() {{\n\
             \x20   }};\n\n\
             \x20   self.update = function(timeStep) {{\n\
             \x20   }};\n\
             }};\n"
        )
    }
}

impl ResourceCommand for CreateComponent {
    fn description(&self) -> &str {
        "Create Component"
    }

    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput> {
        validate_name(db, &self.name)?;
        let dir = db.resource_path().join(COMPONENTS_DIR_NAME);
        if db.file_system().exists(&dir) && !db.file_system().is_dir(&dir) {
            return Err(EditorError::NotAFolder(dir));
        }
        let path = dir.join(with_extension(&self.name, "js"));
        ensure_free(db, &path)?;

        db.file_system().create_dir_all(&dir)?;
        db.file_system().write(&path, self.source().as_bytes())?;
        db.scan()?;
        Ok(vec![path])
    }
}

/// Delete a resource (and everything below it) from disk.
#[derive(Clone, Debug)]
pub struct DeleteResource {
    pub path: PathBuf,
}

impl ResourceCommand for DeleteResource {
    fn description(&self) -> &str {
        "Delete Resource"
    }

    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput> {
        let path = void_core::path::normalize(&self.path);
        let guid = db
            .get_asset_by_path(&path)
            .map(|a| a.guid().clone())
            .ok_or_else(|| AssetError::PathNotFound(path.clone()))?;
        db.delete_asset(&guid)?;
        Ok(vec![path])
    }
}

/// Move or rename a resource.
#[derive(Clone, Debug)]
pub struct MoveResource {
    pub from: PathBuf,
    pub to: PathBuf,
}

impl MoveResource {
    /// Move `from` into `folder`, keeping its file name
    pub fn into_folder(from: impl Into<PathBuf>, folder: impl AsRef<Path>) -> Self {
        let from = from.into();
        let to = folder.as_ref().join(void_core::path::file_name(&from));
        Self { from, to }
    }
}

impl ResourceCommand for MoveResource {
    fn description(&self) -> &str {
        "Move Resource"
    }

    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput> {
        let from = void_core::path::normalize(&self.from);
        let guid = db
            .get_asset_by_path(&from)
            .map(|a| a.guid().clone())
            .ok_or_else(|| AssetError::PathNotFound(from.clone()))?;
        validate_name(db, &void_core::path::file_name(&self.to))?;
        db.move_asset(&guid, &self.to)?;
        Ok(vec![void_core::path::normalize(&self.to)])
    }
}

/// Copy external files into a folder.
///
/// The drop is all or nothing: if any destination already exists nothing
/// is copied.
#[derive(Clone, Debug)]
pub struct DropFiles {
    pub target: PathBuf,
    pub files: Vec<PathBuf>,
}

impl ResourceCommand for DropFiles {
    fn description(&self) -> &str {
        "Import Files"
    }

    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput> {
        let target = resolve_folder(db, &self.target)?;
        let fs = db.file_system().clone();

        let mut plan = Vec::with_capacity(self.files.len());
        for src in &self.files {
            if fs.is_dir(src) {
                log::warn!("Skipping dropped directory {:?}", src);
                continue;
            }
            let name = void_core::path::file_name(src);
            validate_name(db, &name)?;
            let dst = target.join(&name);
            ensure_free(db, &dst)?;
            if plan.iter().any(|(_, d)| d == &dst) {
                return Err(EditorError::AlreadyExists(dst));
            }
            plan.push((src.clone(), dst));
        }

        for (src, dst) in &plan {
            fs.copy(src, dst)?;
        }
        db.scan()?;
        Ok(plan.into_iter().map(|(_, dst)| dst).collect())
    }
}

/// Save a scene node as a prefab in a folder.
#[derive(Clone, Debug)]
pub struct DropNode {
    pub target: PathBuf,
    pub node: PrefabEntity,
    pub children: Vec<PrefabEntity>,
}

impl ResourceCommand for DropNode {
    fn description(&self) -> &str {
        "Create Prefab"
    }

    fn execute(&mut self, db: &mut AssetDatabase) -> EditorResult<CommandOutput> {
        validate_name(db, &self.node.name)?;
        let target = resolve_folder(db, &self.target)?;
        let path = target.join(with_extension(&self.node.name, PREFAB_EXTENSION));
        ensure_free(db, &path)?;

        Prefab::from_node(&self.node, &self.children).save(db.file_system().as_ref(), &path)?;
        db.scan()?;
        Ok(vec![path])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use void_asset::AssetDatabaseConfig;
    use void_core::MemoryFileSystem;

    fn database() -> (Arc<MemoryFileSystem>, AssetDatabase) {
        let fs = Arc::new(MemoryFileSystem::new());
        fs.add_dir("/p/Resources/Scenes");
        fs.add_file("/p/Resources/readme.txt", "hi");
        let mut db =
            AssetDatabase::new(AssetDatabaseConfig::new("/p/Resources", "/p/Cache"), fs.clone()).unwrap();
        db.scan().unwrap();
        (fs, db)
    }

    #[test]
    fn test_name_validation() {
        let (_fs, db) = database();
        assert!(validate_name(&db, "Level 1").is_ok());
        for bad in ["", "  ", ".hidden", "a/b", "a\\b", "x.asset", " padded"] {
            assert!(
                matches!(validate_name(&db, bad), Err(EditorError::InvalidName(_))),
                "{:?} accepted",
                bad
            );
        }
    }

    #[test]
    fn test_create_folder_and_scene() {
        let (_fs, mut db) = database();

        let created = execute(
            &mut db,
            &mut CreateFolder {
                parent: "/p/Resources/Scenes".into(),
                name: "Levels".into(),
            },
        )
        .unwrap();
        assert!(db.get_asset_by_path(&created[0]).unwrap().is_folder());

        let scene = execute(
            &mut db,
            &mut CreateScene {
                parent: created[0].clone(),
                name: "One".into(),
            },
        )
        .unwrap();
        assert_eq!(scene, vec![PathBuf::from("/p/Resources/Scenes/Levels/One.scene")]);
        assert_eq!(db.get_asset_by_path(&scene[0]).unwrap().importer_type(), "Scene");

        let again = CreateScene {
            parent: "/p/Resources/Scenes/Levels".into(),
            name: "One.scene".into(),
        }
        .execute(&mut db);
        assert!(matches!(again, Err(EditorError::AlreadyExists(_))));
    }

    #[test]
    fn test_create_in_file_is_rejected() {
        let (_fs, mut db) = database();
        let result = CreateFolder {
            parent: "/p/Resources/readme.txt".into(),
            name: "x".into(),
        }
        .execute(&mut db);
        assert!(matches!(result, Err(EditorError::NotAFolder(_))));
    }

    #[test]
    fn test_create_component() {
        let (fs, mut db) = database();
        let created = CreateComponent { name: "Spinner".into() }.execute(&mut db).unwrap();

        assert_eq!(created, vec![PathBuf::from("/p/Resources/Components/Spinner.js")]);
        assert!(db.get_asset_by_path("/p/Resources/Components").unwrap().is_folder());
        let source = void_core::FileSystem::read_to_string(fs.as_ref(), &created[0]).unwrap();
        assert!(source.contains("// Spinner"));
        assert_eq!(db.get_asset_by_path(&created[0]).unwrap().importer_type(), "JavaScript");
    }

    #[test]
    fn test_delete_and_move() {
        let (_fs, mut db) = database();
        let guid = db.get_asset_by_path("/p/Resources/readme.txt").unwrap().guid().clone();

        MoveResource::into_folder("/p/Resources/readme.txt", "/p/Resources/Scenes")
            .execute(&mut db)
            .unwrap();
        let moved = db.get_asset_by_guid(&guid).unwrap();
        assert_eq!(moved.path(), Path::new("/p/Resources/Scenes/readme.txt"));

        DeleteResource {
            path: "/p/Resources/Scenes".into(),
        }
        .execute(&mut db)
        .unwrap();
        assert!(db.get_asset_by_guid(&guid).is_none());

        let missing = DeleteResource {
            path: "/p/Resources/Scenes".into(),
        }
        .execute(&mut db);
        assert!(matches!(missing, Err(EditorError::Asset(AssetError::PathNotFound(_)))));
    }
}
