//! Invariant tests for void_asset
//!
//! Drive the database through long sequences of file-system mutations and
//! check the index invariants after every scan.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use void_asset::prelude::*;
use void_core::{EntryKind, FileSystem, MemoryFileSystem};
use void_event::EventChannel;

const RES: &str = "/p/Resources";
const CACHE: &str = "/p/Cache";

/// Small deterministic generator (xorshift)
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const NAMES: &[&str] = &["a.material", "b.fbx", "c.txt", "d.prefab", "e.scene", "Sub", "Deep"];

fn random_dir(fs: &MemoryFileSystem, rng: &mut Rng) -> PathBuf {
    let mut dirs = vec![PathBuf::from(RES)];
    let mut pending = vec![PathBuf::from(RES)];
    while let Some(dir) = pending.pop() {
        for entry in fs.list_directory(&dir).unwrap_or_default() {
            if entry.kind == EntryKind::Directory {
                dirs.push(entry.path.clone());
                pending.push(entry.path);
            }
        }
    }
    dirs.swap_remove(rng.below(dirs.len()))
}

fn mutate(fs: &MemoryFileSystem, rng: &mut Rng) {
    let dir = random_dir(fs, rng);
    let name = NAMES[rng.below(NAMES.len())];
    let path = dir.join(name);

    match rng.below(4) {
        0 | 1 => {
            if fs.exists(&path) {
                fs.touch(&path);
            } else if name.contains('.') {
                fs.add_file(&path, r#"{ "name": "n", "root": {} }"#);
            } else {
                fs.add_dir(&path);
            }
        }
        2 => {
            if fs.exists(&path) {
                let _ = fs.delete(&path);
            }
        }
        _ => {
            let entries = fs.list_directory(&dir).unwrap_or_default();
            if !entries.is_empty() {
                let victim = &entries[rng.below(entries.len())].path;
                let _ = fs.delete(victim);
            }
        }
    }
}

fn assert_invariants(db: &AssetDatabase) {
    let problems = db.check_consistency();
    assert!(problems.is_empty(), "{:?}", problems);

    let mut guids = HashSet::new();
    for asset in db.assets() {
        assert!(guids.insert(asset.guid().clone()), "duplicate GUID {}", asset.guid());

        // GUID and path lookups agree
        let by_path = db.get_asset_by_path(asset.path()).unwrap();
        assert_eq!(by_path.guid(), asset.guid());

        if let Some(parent) = db.get_parent(asset) {
            let by_parent_path = db.get_asset_by_path(parent.path()).unwrap();
            assert!(by_parent_path.is_folder());
            assert_eq!(asset.path().parent(), Some(parent.path()));
        }

        if asset.is_folder() {
            assert!(asset.importer().is_none());
            assert!(asset.cache_path().is_none());
        }
    }
}

/// INVARIANT: GUID and path indexes stay a bijection under any scan sequence
#[test]
fn invariant_indexes_survive_random_mutation() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_dir(RES);
    let mut db = AssetDatabase::new(AssetDatabaseConfig::new(RES, CACHE), fs.clone()).unwrap();
    let mut rng = Rng(0x9E37_79B9_7F4A_7C15);

    for round in 0..200 {
        for _ in 0..rng.below(4) + 1 {
            mutate(&fs, &mut rng);
        }
        db.scan().unwrap();
        assert_invariants(&db);

        if round % 7 == 0 {
            db.import_dirty().unwrap();
            assert_invariants(&db);
        }
    }
}

/// INVARIANT: a scan with no file-system change emits no structural events
#[test]
fn invariant_rescan_is_idempotent() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_dir(RES);
    let mut db = AssetDatabase::new(AssetDatabaseConfig::new(RES, CACHE), fs.clone()).unwrap();
    let events = Arc::new(EventChannel::new());
    db.forward_to(events.clone());
    let mut rng = Rng(42);

    for _ in 0..50 {
        mutate(&fs, &mut rng);
        db.scan().unwrap();
        db.import_dirty().unwrap();
        events.drain();

        let dirty_before: Vec<(Guid, bool)> =
            db.assets().map(|a| (a.guid().clone(), a.is_dirty())).collect();

        let report = db.scan().unwrap();
        assert!(report.is_structurally_unchanged());
        assert!(events
            .drain()
            .iter()
            .all(|e| !matches!(e, AssetEvent::ResourceAdded { .. } | AssetEvent::ResourceRemoved { .. })));

        for (guid, dirty) in dirty_before {
            assert_eq!(db.get_asset_by_guid(&guid).unwrap().is_dirty(), dirty);
        }
    }
}

/// INVARIANT: every removal notification refers to a GUID that is gone
#[test]
fn invariant_removed_guids_are_unreachable() {
    let fs = Arc::new(MemoryFileSystem::new());
    fs.add_dir(RES);
    let mut db = AssetDatabase::new(AssetDatabaseConfig::new(RES, CACHE), fs.clone()).unwrap();
    let events = Arc::new(EventChannel::new());
    db.forward_to(events.clone());
    let mut rng = Rng(7);

    for _ in 0..100 {
        mutate(&fs, &mut rng);
        db.scan().unwrap();

        for event in events.drain() {
            match event {
                AssetEvent::ResourceRemoved { guid } => {
                    if let Some(asset) = db.get_asset_by_guid(&guid) {
                        // Re-created at the same path in a later step of the same scan
                        assert!(fs.exists(asset.path()));
                    }
                }
                AssetEvent::ResourceAdded { guid } => {
                    let asset = db.get_asset_by_guid(&guid);
                    assert!(asset.is_none() || fs.exists(asset.unwrap().path()));
                }
                AssetEvent::ResourceChanged { .. } => {}
            }
        }
    }
}
