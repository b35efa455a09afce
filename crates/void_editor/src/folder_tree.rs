//! Folder tree observer
//!
//! Mirrors the folder hierarchy of the resource directory from asset
//! notifications alone. Notifications may arrive out of order: a folder
//! whose parent item does not exist yet is parked under that parent's GUID
//! and attached as soon as the parent shows up.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use void_asset::{Asset, AssetDatabase, AssetEvent, ChangeReason, Guid};
use void_event::SubscriberId;

/// One folder in the tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderItem {
    pub guid: Guid,
    pub name: String,
    /// `None` for folders directly under the resource root
    pub parent: Option<Guid>,
    pub children: Vec<Guid>,
}

/// Tree of folder GUIDs rooted at the resource directory
#[derive(Debug, Default)]
pub struct FolderTree {
    items: HashMap<Guid, FolderItem>,
    roots: Vec<Guid>,
    /// Folders waiting for their parent item, keyed by parent GUID
    parked: HashMap<Guid, Vec<Guid>>,
    selected: Option<Guid>,
}

impl FolderTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree and keep it in sync with `db`
    pub fn attach(db: &mut AssetDatabase) -> (Rc<RefCell<Self>>, SubscriberId) {
        let tree = Rc::new(RefCell::new(Self::new()));
        tree.borrow_mut().rebuild(db);

        let observer = tree.clone();
        let id = db.subscribe(move |db, event| observer.borrow_mut().handle_event(db, event));
        (tree, id)
    }

    /// Discard everything and rebuild from the current database state
    pub fn rebuild(&mut self, db: &AssetDatabase) {
        self.items.clear();
        self.roots.clear();
        self.parked.clear();

        let mut folders: Vec<&Asset> = db.assets().filter(|a| a.is_folder()).collect();
        folders.sort_by(|a, b| a.path().cmp(b.path()));
        for folder in folders {
            self.insert(folder);
        }

        if let Some(selected) = &self.selected {
            if !self.items.contains_key(selected) {
                self.selected = None;
            }
        }
    }

    /// Apply one asset notification
    pub fn handle_event(&mut self, db: &AssetDatabase, event: &AssetEvent) {
        match event {
            AssetEvent::ResourceAdded { guid } => {
                // Gone again by the time the event is handled
                let Some(asset) = db.get_asset_by_guid(guid) else {
                    return;
                };
                if asset.is_folder() && !self.items.contains_key(guid) {
                    self.insert(asset);
                }
            }
            AssetEvent::ResourceRemoved { guid } => self.remove(guid),
            AssetEvent::ResourceChanged {
                guid,
                reason: ChangeReason::Moved | ChangeReason::Reparented,
            } => {
                if let Some(asset) = db.get_asset_by_guid(guid).filter(|a| a.is_folder()) {
                    self.detach(guid);
                    self.items.remove(guid);
                    self.insert_keeping_children(asset);
                }
            }
            AssetEvent::ResourceChanged { .. } => {}
        }
    }

    pub fn get(&self, guid: &Guid) -> Option<&FolderItem> {
        self.items.get(guid)
    }

    pub fn contains(&self, guid: &Guid) -> bool {
        self.items.contains_key(guid)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Top-level folders, by name
    pub fn roots(&self) -> &[Guid] {
        &self.roots
    }

    /// Child folders of `guid`, by name
    pub fn children(&self, guid: &Guid) -> &[Guid] {
        self.items
            .get(guid)
            .map(|item| item.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of folders still waiting for their parent
    pub fn parked_count(&self) -> usize {
        self.parked.values().map(Vec::len).sum()
    }

    /// Select a folder; `None` selects the resource root
    pub fn select(&mut self, guid: Option<Guid>) -> bool {
        match guid {
            Some(guid) if !self.items.contains_key(&guid) => false,
            guid => {
                self.selected = guid;
                true
            }
        }
    }

    pub fn selected(&self) -> Option<&Guid> {
        self.selected.as_ref()
    }

    /// Folder names from the root down to `guid`
    pub fn breadcrumbs(&self, guid: &Guid) -> Vec<&str> {
        let mut names = Vec::new();
        let mut current = self.items.get(guid);
        while let Some(item) = current {
            names.push(item.name.as_str());
            current = item.parent.as_ref().and_then(|p| self.items.get(p));
        }
        names.reverse();
        names
    }

    fn insert(&mut self, asset: &Asset) {
        self.insert_item(FolderItem {
            guid: asset.guid().clone(),
            name: asset.name().to_string(),
            parent: asset.parent().cloned(),
            children: Vec::new(),
        });
    }

    /// Re-insert a moved folder, keeping the child list it already had
    fn insert_keeping_children(&mut self, asset: &Asset) {
        let children: Vec<Guid> = self
            .items
            .values()
            .filter(|item| item.parent.as_ref() == Some(asset.guid()))
            .map(|item| item.guid.clone())
            .collect();
        self.insert_item(FolderItem {
            guid: asset.guid().clone(),
            name: asset.name().to_string(),
            parent: asset.parent().cloned(),
            children: Vec::new(),
        });
        for child in children {
            self.link(asset.guid(), child);
        }
    }

    fn insert_item(&mut self, item: FolderItem) {
        let guid = item.guid.clone();
        let parent = item.parent.clone();
        self.items.insert(guid.clone(), item);

        match parent {
            None => {
                self.roots.push(guid.clone());
                self.sort_siblings(None);
            }
            Some(parent) if self.items.contains_key(&parent) => self.link(&parent, guid.clone()),
            Some(parent) => {
                log::debug!("Folder {} waits for parent {}", guid, parent);
                self.parked.entry(parent).or_default().push(guid.clone());
            }
        }

        if let Some(waiting) = self.parked.remove(&guid) {
            for child in waiting {
                if self.items.contains_key(&child) {
                    self.link(&guid, child);
                }
            }
        }
    }

    fn link(&mut self, parent: &Guid, child: Guid) {
        if let Some(item) = self.items.get_mut(parent) {
            if !item.children.contains(&child) {
                item.children.push(child);
            }
        }
        self.sort_siblings(Some(parent));
    }

    fn sort_siblings(&mut self, parent: Option<&Guid>) {
        let mut siblings = match parent {
            None => std::mem::take(&mut self.roots),
            Some(p) => match self.items.get_mut(p) {
                Some(item) => std::mem::take(&mut item.children),
                None => return,
            },
        };

        siblings.sort_by_cached_key(|g| {
            self.items
                .get(g)
                .map(|i| i.name.to_lowercase())
                .unwrap_or_default()
        });

        match parent {
            None => self.roots = siblings,
            Some(p) => {
                if let Some(item) = self.items.get_mut(p) {
                    item.children = siblings;
                }
            }
        }
    }

    /// Unlink `guid` from its parent's child list (or the roots / parking)
    fn detach(&mut self, guid: &Guid) {
        let parent = self.items.get(guid).and_then(|item| item.parent.clone());
        match parent {
            None => self.roots.retain(|g| g != guid),
            Some(parent) => {
                if let Some(item) = self.items.get_mut(&parent) {
                    item.children.retain(|g| g != guid);
                }
            }
        }
        for waiting in self.parked.values_mut() {
            waiting.retain(|g| g != guid);
        }
        self.parked.retain(|_, waiting| !waiting.is_empty());
    }

    fn remove(&mut self, guid: &Guid) {
        if !self.items.contains_key(guid) {
            return;
        }
        self.detach(guid);

        // Children that are still alive get re-parked until re-linked
        if let Some(item) = self.items.remove(guid) {
            if !item.children.is_empty() {
                self.parked.insert(guid.clone(), item.children);
            }
        }
        if self.selected.as_ref() == Some(guid) {
            self.selected = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use void_asset::AssetDatabaseConfig;
    use void_core::{FileSystem, MemoryFileSystem};

    fn database(fs: &Arc<MemoryFileSystem>) -> AssetDatabase {
        fs.add_dir("/p/Resources");
        AssetDatabase::new(AssetDatabaseConfig::new("/p/Resources", "/p/Cache"), fs.clone()).unwrap()
    }

    fn guid(db: &AssetDatabase, path: &str) -> Guid {
        db.get_asset_by_path(Path::new("/p/Resources").join(path))
            .unwrap()
            .guid()
            .clone()
    }

    #[test]
    fn test_tree_follows_scan() {
        let fs = Arc::new(MemoryFileSystem::new());
        let mut db = database(&fs);
        let (tree, _) = FolderTree::attach(&mut db);

        fs.add_file("/p/Resources/Scenes/Levels/one.scene", "1");
        fs.add_dir("/p/Resources/materials");
        db.scan().unwrap();

        let tree = tree.borrow();
        assert_eq!(tree.len(), 3);
        let scenes = guid(&db, "Scenes");
        let levels = guid(&db, "Scenes/Levels");
        assert_eq!(tree.roots(), &[guid(&db, "materials"), scenes.clone()]);
        assert_eq!(tree.children(&scenes), &[levels.clone()]);
        assert_eq!(tree.breadcrumbs(&levels), vec!["Scenes", "Levels"]);
        assert_eq!(tree.parked_count(), 0);
    }

    #[test]
    fn test_out_of_order_children_are_parked() {
        let fs = Arc::new(MemoryFileSystem::new());
        let mut db = database(&fs);
        fs.add_dir("/p/Resources/A/B/C");
        db.scan().unwrap();

        let a = guid(&db, "A");
        let b = guid(&db, "A/B");
        let c = guid(&db, "A/B/C");

        let mut tree = FolderTree::new();
        tree.handle_event(&db, &AssetEvent::ResourceAdded { guid: c.clone() });
        tree.handle_event(&db, &AssetEvent::ResourceAdded { guid: b.clone() });
        assert_eq!(tree.parked_count(), 1);
        assert!(tree.roots().is_empty());

        tree.handle_event(&db, &AssetEvent::ResourceAdded { guid: a.clone() });
        assert_eq!(tree.parked_count(), 0);
        assert_eq!(tree.roots(), &[a.clone()]);
        assert_eq!(tree.children(&a), &[b.clone()]);
        assert_eq!(tree.children(&b), &[c]);

        // Duplicate delivery is harmless
        tree.handle_event(&db, &AssetEvent::ResourceAdded { guid: a.clone() });
        assert_eq!(tree.roots(), &[a]);
    }

    #[test]
    fn test_removal_and_move() {
        let fs = Arc::new(MemoryFileSystem::new());
        let mut db = database(&fs);
        fs.add_dir("/p/Resources/Art/Wood");
        fs.add_dir("/p/Resources/Library");
        db.scan().unwrap();
        let (tree, _) = FolderTree::attach(&mut db);

        let wood = guid(&db, "Art/Wood");
        let library = guid(&db, "Library");
        db.move_asset(&wood, "/p/Resources/Library/Wood").unwrap();
        {
            let tree = tree.borrow();
            assert_eq!(tree.children(&library), &[wood.clone()]);
            assert!(tree.children(&guid(&db, "Art")).is_empty());
        }

        assert!(tree.borrow_mut().select(Some(wood.clone())));
        let art = guid(&db, "Art");
        fs.delete(Path::new("/p/Resources/Art")).unwrap();
        db.scan().unwrap();

        let tree = tree.borrow();
        assert!(!tree.contains(&art));
        assert!(tree.contains(&wood));
        assert_eq!(tree.selected(), Some(&wood));
        assert_eq!(tree.roots(), &[library]);
    }
}
