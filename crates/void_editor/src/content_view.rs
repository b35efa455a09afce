//! Content view observer
//!
//! Lists the immediate children of one folder. Activating a folder entry
//! navigates into it (`ContentFolderChanged`); activating anything else
//! asks for the resource to be opened (`EditResource`).

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use void_asset::{Asset, AssetDatabase, AssetEvent, Guid};
use void_event::{EventBus, EventChannel, SubscriberId};

use crate::events::EditorEvent;
use crate::project::COMPONENTS_DIR_NAME;

/// Icon shown next to a content entry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentIcon {
    Folder,
    File,
    Component,
    JavaScript,
}

impl ContentIcon {
    /// Skin image name
    pub fn bitmap(&self) -> &'static str {
        match self {
            ContentIcon::Folder => "Folder.icon",
            ContentIcon::File => "FileBitmap",
            ContentIcon::Component => "ComponentBitmap",
            ContentIcon::JavaScript => "JavascriptBitmap",
        }
    }

    fn for_asset(asset: &Asset, components_dir: &Path) -> Self {
        if asset.is_folder() {
            return ContentIcon::Folder;
        }
        match void_core::path::extension(asset.path()).as_deref() {
            Some("js") if asset.path().starts_with(components_dir) => ContentIcon::Component,
            Some("js") => ContentIcon::JavaScript,
            _ => ContentIcon::File,
        }
    }
}

/// One row of the content view
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentEntry {
    pub guid: Guid,
    pub name: String,
    pub path: PathBuf,
    pub icon: ContentIcon,
}

impl ContentEntry {
    pub fn is_folder(&self) -> bool {
        self.icon == ContentIcon::Folder
    }
}

/// Listing of one folder of the resource tree
pub struct ContentView {
    /// Folder on display; the resource root when nothing else was chosen
    folder: PathBuf,
    components_dir: PathBuf,
    entries: Vec<ContentEntry>,
    events: EventBus<EditorEvent>,
    refresh_count: u64,
}

impl ContentView {
    /// View showing the resource root of `db`
    pub fn new(db: &AssetDatabase) -> Self {
        let mut view = Self {
            folder: db.resource_path().to_path_buf(),
            components_dir: db.resource_path().join(COMPONENTS_DIR_NAME),
            entries: Vec::new(),
            events: EventBus::new(),
            refresh_count: 0,
        };
        view.refresh(db);
        view
    }

    /// Create a view and keep it in sync with `db`
    pub fn attach(db: &mut AssetDatabase) -> (Rc<RefCell<Self>>, SubscriberId) {
        let view = Rc::new(RefCell::new(Self::new(db)));
        let observer = view.clone();
        let id = db.subscribe(move |db, event| observer.borrow_mut().handle_event(db, event));
        (view, id)
    }

    /// Subscribe to editor events sent by this view
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&(), &EditorEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    /// Queue editor events into `channel`
    pub fn forward_to(&mut self, channel: std::sync::Arc<EventChannel<EditorEvent>>) -> SubscriberId {
        self.events.forward_to(channel)
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn entries(&self) -> &[ContentEntry] {
        &self.entries
    }

    /// How many times the listing was rebuilt
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Show another folder. Returns false if `folder` is not a folder asset
    /// or the resource root.
    pub fn set_folder(&mut self, db: &AssetDatabase, folder: impl AsRef<Path>) -> bool {
        let folder = void_core::path::normalize(folder);
        let is_folder = folder == db.resource_path()
            || db.get_asset_by_path(&folder).map(Asset::is_folder).unwrap_or(false);
        if !is_folder {
            return false;
        }

        if folder != self.folder {
            self.folder = folder.clone();
            self.events
                .publish(&(), &EditorEvent::ContentFolderChanged { path: folder });
        }
        self.refresh(db);
        true
    }

    /// Activate an entry: enter folders, request editing for everything else
    pub fn activate(&mut self, db: &AssetDatabase, guid: &Guid) -> bool {
        let Some(asset) = db.get_asset_by_guid(guid) else {
            return false;
        };
        if asset.is_folder() {
            let path = asset.path().to_path_buf();
            self.set_folder(db, path)
        } else {
            self.events.publish(
                &(),
                &EditorEvent::EditResource {
                    path: asset.path().to_path_buf(),
                },
            );
            true
        }
    }

    /// Rebuild the listing from the database
    pub fn refresh(&mut self, db: &AssetDatabase) {
        self.entries = db
            .get_folder_assets(&self.folder)
            .into_iter()
            .map(|asset| ContentEntry {
                guid: asset.guid().clone(),
                name: asset.name().to_string(),
                path: asset.path().to_path_buf(),
                icon: ContentIcon::for_asset(asset, &self.components_dir),
            })
            .collect();
        self.refresh_count += 1;
    }

    /// Apply one asset notification; refreshes only when it touches the
    /// folder on display
    pub fn handle_event(&mut self, db: &AssetDatabase, event: &AssetEvent) {
        let guid = event.guid();

        // Displayed folder itself went away: fall back to the root
        if let AssetEvent::ResourceRemoved { .. } = event {
            let shown = db.get_asset_by_path(&self.folder);
            if self.folder != db.resource_path() && shown.is_none() {
                let root = db.resource_path().to_path_buf();
                self.set_folder(db, root);
                return;
            }
        }

        let listed = self.entries.iter().any(|e| &e.guid == guid);
        let inside = db
            .get_asset_by_guid(guid)
            .map(|a| void_core::path::is_direct_child(&self.folder, a.path()))
            .unwrap_or(false);

        if listed || inside {
            self.refresh(db);
        }
    }
}

impl std::fmt::Debug for ContentView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentView")
            .field("folder", &self.folder)
            .field("entries", &self.entries.len())
            .finish()
    }
}
