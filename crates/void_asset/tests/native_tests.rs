//! Scans against the real file system
//!
//! Covers disk content the in-memory file system cannot produce: unusual
//! file names and linked directories.

#![cfg(unix)]

use std::path::Path;
use std::sync::Arc;

use void_asset::prelude::*;
use void_core::NativeFileSystem;

fn database(project: &Path) -> AssetDatabase {
    let resources = project.join("Resources");
    std::fs::create_dir_all(&resources).unwrap();
    let config = AssetDatabaseConfig::new(resources, project.join("Cache"));
    AssetDatabase::new(config, Arc::new(NativeFileSystem::new())).unwrap()
}

#[test]
fn test_backslash_in_file_name_is_indexed_as_listed() {
    let dir = tempfile::tempdir().unwrap();
    let res = dir.path().join("Resources");
    let mut db = database(dir.path());
    std::fs::write(res.join("ok.txt"), b"ok").unwrap();
    std::fs::write(res.join("odd\\name.txt"), b"odd").unwrap();

    let report = db.scan().unwrap();
    assert_eq!(report.added, 2);

    let odd = db.get_asset_by_path(res.join("odd\\name.txt")).unwrap();
    assert_eq!(odd.name(), "odd\\name.txt");
    assert!(db.get_asset_by_path(res.join("ok.txt")).is_some());
    assert!(res.join("odd\\name.txt.asset").is_file());
    assert!(db.check_consistency().is_empty());

    assert!(db.scan().unwrap().is_structurally_unchanged());
}

#[test]
fn test_linked_directory_cycle_is_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    let res = dir.path().join("Resources");
    let mut db = database(dir.path());
    std::fs::create_dir_all(res.join("A")).unwrap();
    std::fs::write(res.join("A/wood.txt"), b"w").unwrap();
    std::os::unix::fs::symlink(&res, res.join("A/loop")).unwrap();

    let report = db.scan().unwrap();
    assert_eq!(report.added, 2);
    assert_eq!(db.len(), 2);
    assert!(db.get_asset_by_path(res.join("A/loop")).is_none());

    assert!(db.scan().unwrap().is_structurally_unchanged());
    assert!(db.check_consistency().is_empty());
}
