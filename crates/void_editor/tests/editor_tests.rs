//! End-to-end tests for the editor front end on a real project directory

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use void_editor::commands::{self, execute};
use void_editor::prelude::*;
use void_editor::{
    ContentIcon, CreateComponent, CreateFolder, CreateScene, DeleteResource, DropFiles, DropNode,
    MoveResource, PrefabEntity,
};

fn project_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("Resources/Textures")).unwrap();
    std::fs::write(dir.path().join("Resources/Textures/stone.png"), b"png").unwrap();
    std::fs::write(
        dir.path().join("Resources/wood.material"),
        r#"{ "technique": "Diff", "textures": { "diffuse": "Textures/stone.png" } }"#,
    )
    .unwrap();
    dir
}

#[test]
fn test_open_scan_and_import() {
    let dir = project_dir();
    let mut project = Project::open(dir.path()).unwrap();

    let report = project.refresh(true).unwrap();
    assert_eq!(report.added, 3);
    assert_eq!(report.imported, 2);
    assert_eq!(report.import_failed, 0);

    let db = project.database();
    assert!(db.assets().all(|a| !a.is_dirty()));
    assert!(dir.path().join("Resources/wood.material.asset").is_file());
    let wood = db.get_asset_by_path(dir.path().join("Resources/wood.material")).unwrap();
    assert!(wood.cache_path().unwrap().is_file());
}

#[test]
fn test_reopen_keeps_guids_and_skips_import() {
    let dir = project_dir();
    let guid = {
        let mut project = Project::open(dir.path()).unwrap();
        project.refresh(true).unwrap();
        project
            .database()
            .get_asset_by_path(dir.path().join("Resources/Textures/stone.png"))
            .unwrap()
            .guid()
            .clone()
    };

    let mut project = Project::open(dir.path()).unwrap();
    let report = project.refresh(false).unwrap();
    assert_eq!(report.added, 3);

    let stone = project
        .database()
        .get_asset_by_path(dir.path().join("Resources/Textures/stone.png"))
        .unwrap();
    assert_eq!(stone.guid(), &guid);
    assert!(!stone.is_dirty());
}

#[test]
fn test_commands_drive_observers() {
    let dir = project_dir();
    let mut project = Project::open(dir.path()).unwrap();
    project.refresh(false).unwrap();
    let root = project.resource_path().to_path_buf();

    let db = project.database_mut();
    let (tree, _) = FolderTree::attach(db);
    let (view, _) = ContentView::attach(db);

    let opened = Rc::new(RefCell::new(Vec::new()));
    let sink = opened.clone();
    view.borrow_mut()
        .subscribe(move |_, event: &EditorEvent| sink.borrow_mut().push(event.clone()));

    execute(
        db,
        &mut CreateFolder {
            parent: root.clone(),
            name: "Scenes".into(),
        },
    )
    .unwrap();
    execute(
        db,
        &mut CreateScene {
            parent: root.join("Scenes"),
            name: "Main".into(),
        },
    )
    .unwrap();
    execute(db, &mut CreateComponent { name: "Spinner".into() }).unwrap();

    assert_eq!(tree.borrow().len(), 3);
    let names: Vec<String> = view.borrow().entries().iter().map(|e| e.name.clone()).collect();
    assert_eq!(names, vec!["Components", "Scenes", "Textures", "wood.material"]);

    let components = db.get_asset_by_path(root.join("Components")).unwrap().guid().clone();
    assert!(view.borrow_mut().activate(db, &components));
    let spinner = view.borrow().entries()[0].clone();
    assert_eq!(spinner.icon, ContentIcon::Component);
    assert!(view.borrow_mut().activate(db, &spinner.guid));

    assert_eq!(
        *opened.borrow(),
        vec![
            EditorEvent::ContentFolderChanged {
                path: root.join("Components")
            },
            EditorEvent::EditResource {
                path: root.join("Components/Spinner.js")
            },
        ]
    );

    // Moving the scene folder under Textures shows up in the tree
    let scenes = db.get_asset_by_path(root.join("Scenes")).unwrap().guid().clone();
    let textures = db.get_asset_by_path(root.join("Textures")).unwrap().guid().clone();
    execute(db, &mut MoveResource::into_folder(root.join("Scenes"), root.join("Textures"))).unwrap();
    assert_eq!(tree.borrow().children(&textures), &[scenes.clone()]);
    assert!(root.join("Textures/Scenes/Main.scene.asset").is_file());

    execute(
        db,
        &mut DeleteResource {
            path: root.join("Textures/Scenes"),
        },
    )
    .unwrap();
    assert!(!tree.borrow().contains(&scenes));
    assert!(!root.join("Textures/Scenes").exists());
    assert!(db.check_consistency().is_empty());
}

#[test]
fn test_drop_files_is_all_or_nothing() {
    let dir = project_dir();
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("grass.png"), b"png").unwrap();
    std::fs::write(outside.path().join("stone.png"), b"other").unwrap();

    let mut project = Project::open(dir.path()).unwrap();
    project.refresh(false).unwrap();
    let textures = project.resource_path().join("Textures");
    let db = project.database_mut();

    let mut drop = DropFiles {
        target: textures.clone(),
        files: vec![outside.path().join("grass.png"), outside.path().join("stone.png")],
    };
    assert!(matches!(drop.execute(db), Err(EditorError::AlreadyExists(_))));
    assert!(!textures.join("grass.png").exists());
    assert_eq!(std::fs::read(textures.join("stone.png")).unwrap(), b"png");

    let mut drop = DropFiles {
        target: textures.clone(),
        files: vec![outside.path().join("grass.png")],
    };
    let copied = commands::execute(db, &mut drop).unwrap();
    assert_eq!(copied, vec![textures.join("grass.png")]);
    assert_eq!(
        db.get_asset_by_path(textures.join("grass.png")).unwrap().importer_type(),
        "Texture"
    );
}

#[test]
fn test_drop_node_writes_importable_prefab() {
    let dir = project_dir();
    let mut project = Project::open(dir.path()).unwrap();
    project.refresh(false).unwrap();
    let root = project.resource_path().to_path_buf();
    let db = project.database_mut();

    let mut drop = DropNode {
        target: root.clone(),
        node: PrefabEntity {
            name: "Lamp".into(),
            ..Default::default()
        },
        children: Vec::new(),
    };
    let created = drop.execute(db).unwrap();
    assert_eq!(created, vec![root.join("Lamp.prefab")]);

    let guid = db.get_asset_by_path(root.join("Lamp.prefab")).unwrap().guid().clone();
    assert!(db.import(&guid).unwrap());
    assert!(!db.get_asset_by_guid(&guid).unwrap().is_dirty());

    assert!(matches!(drop.execute(db), Err(EditorError::AlreadyExists(_))));
}

#[test]
fn test_project_file_on_disk() {
    let dir = project_dir();
    std::fs::write(
        dir.path().join("project.toml"),
        "[project]\nname = \"Stones\"\n\n[assets]\nauto_import = true\n",
    )
    .unwrap();

    let mut project = Project::open(dir.path()).unwrap();
    assert_eq!(project.name(), "Stones");
    let report = project.refresh(false).unwrap();
    assert_eq!(report.imported, 2);
    assert!(Path::new(&dir.path().join("Cache")).is_dir());
}
