//! Asset database
//!
//! Owns every [`Asset`], indexed by GUID and by path, and keeps that
//! collection in step with the resource directory:
//!
//! ```text
//! scan()  : list tree -> folders (parents first) -> files -> drop vanished paths
//! import(): importer.preload + importer.import -> clear dirty, stamp, cache path
//! ```
//!
//! Every committed change is published synchronously to subscribers as an
//! [`AssetEvent`]. Handlers get a shared reference to the database so they
//! can resolve the GUID they were handed, but can never mutate it.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use void_core::path as vpath;
use void_core::{EntryKind, FileSystem, FsError, TEMP_EXTENSION};
use void_event::{EventBus, EventChannel, Priority, SubscriberId};

use crate::asset::Asset;
use crate::config::AssetDatabaseConfig;
use crate::error::{AssetError, AssetResult};
use crate::events::{AssetEvent, ChangeReason};
use crate::guid::{Guid, GuidRegistry};
use crate::importer::{AssetImporter, ImportContext, ImportError, ImportResult, ImporterRegistry};
use crate::sidecar::SidecarRecord;

/// Counts of what a scan (or an import pass) changed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
    pub imported: usize,
    pub import_failed: usize,
}

impl ScanReport {
    /// True if the scan neither added nor removed anything
    pub fn is_structurally_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

impl fmt::Display for ScanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} changed, {} imported, {} failed",
            self.added, self.removed, self.changed, self.imported, self.import_failed
        )
    }
}

/// Paths found on disk by one enumeration pass
struct Listing {
    /// Sorted parents first
    folders: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

/// Database of every tracked resource in a project
pub struct AssetDatabase {
    config: AssetDatabaseConfig,
    fs: Arc<dyn FileSystem>,
    importers: ImporterRegistry,
    guids: GuidRegistry,
    assets: HashMap<Guid, Asset>,
    path_index: HashMap<PathBuf, Guid>,
    events: EventBus<AssetEvent, AssetDatabase>,
}

impl AssetDatabase {
    /// Create a database with the built-in importers
    pub fn new(config: AssetDatabaseConfig, fs: Arc<dyn FileSystem>) -> AssetResult<Self> {
        Self::with_importers(config, fs, ImporterRegistry::with_defaults())
    }

    /// Create a database with a custom importer registry
    pub fn with_importers(
        config: AssetDatabaseConfig,
        fs: Arc<dyn FileSystem>,
        importers: ImporterRegistry,
    ) -> AssetResult<Self> {
        let config = config.validated()?;
        log::info!(
            "Asset database on {:?} (cache {:?})",
            config.resource_dir,
            config.cache_dir
        );
        Ok(Self {
            config,
            fs,
            importers,
            guids: GuidRegistry::new(),
            assets: HashMap::new(),
            path_index: HashMap::new(),
            events: EventBus::new(),
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn config(&self) -> &AssetDatabaseConfig {
        &self.config
    }

    /// Root of the resource tree
    pub fn resource_path(&self) -> &Path {
        &self.config.resource_dir
    }

    /// Directory holding import artifacts
    pub fn cache_path(&self) -> &Path {
        &self.config.cache_dir
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Register additional importer types at runtime
    pub fn importers_mut(&mut self) -> &mut ImporterRegistry {
        &mut self.importers
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All live assets, in no particular order
    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn get_asset_by_guid(&self, guid: &Guid) -> Option<&Asset> {
        self.assets.get(guid)
    }

    pub fn get_asset_by_path(&self, path: impl AsRef<Path>) -> Option<&Asset> {
        let path = vpath::normalize(path);
        self.path_index.get(&path).and_then(|guid| self.assets.get(guid))
    }

    /// Enclosing folder of an asset
    pub fn get_parent(&self, asset: &Asset) -> Option<&Asset> {
        asset.parent().and_then(|guid| self.assets.get(guid))
    }

    /// Immediate children of a folder: folders first, then files, by name.
    ///
    /// Pass the resource root to list top-level assets.
    pub fn get_folder_assets(&self, folder: impl AsRef<Path>) -> Vec<&Asset> {
        let folder = vpath::normalize(folder);
        let mut children: Vec<&Asset> = self
            .assets
            .values()
            .filter(|a| vpath::is_direct_child(&folder, &a.path))
            .collect();
        children.sort_by(|a, b| {
            b.is_folder()
                .cmp(&a.is_folder())
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
                .then_with(|| a.path.cmp(&b.path))
        });
        children
    }

    /// Every asset using the given importer type, by path
    pub fn get_assets_by_importer_type(&self, importer_type: &str) -> Vec<&Asset> {
        let mut found: Vec<&Asset> = self
            .assets
            .values()
            .filter(|a| a.importer_type == importer_type)
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        found
    }

    /// Canonical sidecar location for a resource path
    pub fn get_dot_asset_filename(&self, path: impl AsRef<Path>) -> PathBuf {
        vpath::with_appended_extension(vpath::normalize(path), &self.config.sidecar_extension)
    }

    // ------------------------------------------------------------------
    // GUIDs
    // ------------------------------------------------------------------

    /// Mint a fresh GUID and mark it in use
    pub fn generate_asset_guid(&mut self) -> Guid {
        self.guids.generate()
    }

    /// Mark an externally supplied GUID as in use.
    ///
    /// A scan that later finds a sidecar carrying this GUID adopts it for
    /// the resource instead of minting a new one.
    pub fn register_guid(&mut self, guid: Guid) -> AssetResult<()> {
        self.guids.register(guid)
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// Subscribe to change notifications
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: FnMut(&AssetDatabase, &AssetEvent) + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn subscribe_with_priority<F>(&mut self, handler: F, priority: Priority) -> SubscriberId
    where
        F: FnMut(&AssetDatabase, &AssetEvent) + 'static,
    {
        self.events.subscribe_with_priority(handler, priority)
    }

    /// Queue every notification into `channel` for later draining
    pub fn forward_to(&mut self, channel: Arc<EventChannel<AssetEvent>>) -> SubscriberId {
        self.events.forward_to(channel)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    fn notify(&mut self, event: AssetEvent) {
        log::trace!("{} {}", event.name(), event.guid());
        // Detach the bus so handlers can borrow the database
        let mut events = std::mem::take(&mut self.events);
        events.publish(self, &event);
        self.events = events;
    }

    // ------------------------------------------------------------------
    // Scan
    // ------------------------------------------------------------------

    /// Reconcile the asset collection with the resource directory.
    ///
    /// Folders are created before files, parents before children. Paths that
    /// vanished are destroyed deepest first. An I/O failure aborts the scan;
    /// everything committed before it stays committed.
    pub fn scan(&mut self) -> AssetResult<ScanReport> {
        let root = self.config.resource_dir.clone();
        if !self.fs.is_dir(&root) {
            return Err(FsError::NotFound { op: "scan", path: root }.into());
        }

        let listing = self.enumerate(&root)?;
        let mut report = ScanReport::default();
        let mut seen: HashSet<PathBuf> =
            HashSet::with_capacity(listing.folders.len() + listing.files.len());

        for folder in &listing.folders {
            seen.insert(folder.clone());
            self.reconcile(folder, EntryKind::Directory, &mut report)?;
        }

        for file in &listing.files {
            seen.insert(file.clone());
            self.reconcile(file, EntryKind::File, &mut report)?;
        }

        let mut stale: Vec<(usize, PathBuf, Guid)> = self
            .assets
            .values()
            .filter(|a| !seen.contains(&a.path))
            .map(|a| (vpath::depth(&a.path), a.path.clone(), a.guid.clone()))
            .collect();
        stale.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

        for (_, path, guid) in stale {
            if self.destroy(&guid) {
                report.removed += 1;
            }
            self.delete_orphaned_sidecar(&path)?;
        }

        if self.config.auto_import {
            let imported = self.import_dirty()?;
            report.imported += imported.imported;
            report.import_failed += imported.import_failed;
        }

        log::info!("Scanned {:?}: {}", root, report);
        Ok(report)
    }

    fn is_ignored(&self, path: &Path, kind: EntryKind) -> bool {
        if self.config.ignore_hidden && vpath::is_hidden(path) {
            return true;
        }
        if kind != EntryKind::File {
            return false;
        }
        match vpath::extension(path).as_deref() {
            Some(ext) => ext == self.config.sidecar_extension || ext == TEMP_EXTENSION,
            None => false,
        }
    }

    /// Remove the sidecar of a resource that vanished from disk, so a new
    /// file created later at the same path starts with a fresh GUID
    fn delete_orphaned_sidecar(&self, path: &Path) -> AssetResult<()> {
        if self.fs.exists(path) {
            return Ok(());
        }
        let dot = self.get_dot_asset_filename(path);
        if self.fs.exists(&dot) {
            self.fs.delete(&dot)?;
            log::debug!("Deleted orphaned sidecar {:?}", dot);
        }
        Ok(())
    }

    fn enumerate(&self, root: &Path) -> AssetResult<Listing> {
        let mut folders = Vec::new();
        let mut files = Vec::new();
        let mut pending = vec![root.to_path_buf()];

        while let Some(dir) = pending.pop() {
            let mut kinds: HashMap<PathBuf, EntryKind> = HashMap::new();

            for entry in self.fs.list_directory(&dir)? {
                // Listed paths are used as given; rewriting them could name a
                // file that does not exist
                let path = entry.path;
                if self.is_ignored(&path, entry.kind) {
                    continue;
                }

                if let Some(previous) = kinds.insert(path.clone(), entry.kind) {
                    if previous != entry.kind {
                        return Err(AssetError::PathConflict(path));
                    }
                    continue;
                }

                match entry.kind {
                    EntryKind::Directory => {
                        folders.push(path.clone());
                        pending.push(path);
                    }
                    EntryKind::File => files.push(path),
                }
            }
        }

        folders.sort_by(|a, b| {
            vpath::depth(a)
                .cmp(&vpath::depth(b))
                .then_with(|| a.cmp(b))
        });
        files.sort();

        Ok(Listing { folders, files })
    }

    fn reconcile(&mut self, path: &Path, kind: EntryKind, report: &mut ScanReport) -> AssetResult<()> {
        let Some(guid) = self.path_index.get(path).cloned() else {
            return self.discover(path, kind, report);
        };

        let is_folder = self.assets.get(&guid).map(Asset::is_folder).unwrap_or(false);
        if is_folder != (kind == EntryKind::Directory) {
            log::info!("{:?} switched between file and folder, re-creating it", path);
            if self.destroy(&guid) {
                report.removed += 1;
            }
            let dot = self.get_dot_asset_filename(path);
            if self.fs.exists(&dot) {
                self.fs.delete(&dot)?;
            }
            return self.discover(path, kind, report);
        }

        self.relink(&guid, report);
        if kind == EntryKind::File {
            self.refresh_file(&guid, report)?;
        }
        Ok(())
    }

    /// Register a path seen for the first time
    fn discover(&mut self, path: &Path, kind: EntryKind, report: &mut ScanReport) -> AssetResult<()> {
        // Read everything fallible before touching the GUID registry
        let source_time = match kind {
            EntryKind::File => Some(self.fs.modification_time(path)?),
            EntryKind::Directory => None,
        };

        let dot = self.get_dot_asset_filename(path);
        let record = match SidecarRecord::load(self.fs.as_ref(), &dot) {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Ignoring sidecar of {:?}: {}", path, e);
                None
            }
        };
        // Folder records carry no importer
        let record = record.filter(|r| {
            let stale = kind == EntryKind::Directory && !r.importer.is_empty();
            if stale {
                log::debug!("Sidecar of {:?} belongs to a file, ignoring it", path);
            }
            !stale
        });

        if let Some(record) = &record {
            if self.try_relocate(&record.guid, path, kind) {
                report.changed += 1;
                if kind == EntryKind::File {
                    self.refresh_file(&record.guid, report)?;
                }
                return Ok(());
            }
        }

        let mut persist = record.is_none();
        let mut adopted = None;
        let guid = match record.as_ref().map(|r| r.guid.clone()) {
            Some(guid) if self.assets.contains_key(&guid) => {
                // Copied resource carrying its original's sidecar
                log::warn!("{} (sidecar of {:?}), minting a new one", AssetError::DuplicateGuid(guid), path);
                persist = true;
                self.guids.generate()
            }
            Some(guid) => {
                if !self.guids.is_registered(&guid) {
                    self.guids.register(guid.clone())?;
                }
                adopted = record.as_ref();
                guid
            }
            None => self.guids.generate(),
        };

        let mut asset = match kind {
            EntryKind::Directory => Asset::folder(guid.clone(), path.to_path_buf(), dot),
            EntryKind::File => {
                let mut importer = self.importers.create_for_path(path);
                match &record {
                    Some(r) if r.importer == importer.type_name() => {
                        if let Err(e) = importer.load_settings(&r.settings) {
                            log::warn!("Resetting importer settings of {:?}: {}", path, e);
                            importer.set_defaults();
                            persist = true;
                        }
                    }
                    Some(_) => {
                        // Importer type changed since the sidecar was written
                        adopted = None;
                        persist = true;
                    }
                    None => {}
                }
                let mut asset = Asset::file(guid.clone(), path.to_path_buf(), dot, importer);
                if let (Some(r), Some(source_time)) = (adopted, source_time) {
                    self.restore_import_state(&mut asset, r, source_time);
                }
                asset
            }
        };

        asset.parent = self.resolve_parent(path);
        if asset.parent.is_none() && path.parent() != Some(self.config.resource_dir.as_path()) {
            log::debug!("Parent of {:?} not registered yet, linking it to the root for now", path);
        }

        log::debug!("Added {} {:?}", guid, path);
        self.path_index.insert(path.to_path_buf(), guid.clone());
        self.assets.insert(guid.clone(), asset);
        report.added += 1;
        self.notify(AssetEvent::ResourceAdded { guid: guid.clone() });

        if persist && self.config.write_sidecars {
            self.save_sidecar(&guid)?;
        }
        Ok(())
    }

    /// Trust a sidecar's import stamp if the source and artifact still match it
    fn restore_import_state(&self, asset: &mut Asset, record: &SidecarRecord, source_time: SystemTime) {
        let Some(stamp) = record.timestamp else {
            return;
        };
        asset.timestamp = Some(stamp);

        let cache_name = record.cache.clone().unwrap_or_else(|| asset.guid.to_string());
        let cache = self.config.cache_dir.join(cache_name);
        let requires_cache = asset.requires_cache_file();
        if source_time <= stamp && (!requires_cache || self.fs.exists(&cache)) {
            asset.dirty = false;
            asset.cache_path = requires_cache.then_some(cache);
        }
    }

    /// Follow a resource moved on disk together with its sidecar
    fn try_relocate(&mut self, guid: &Guid, new_path: &Path, kind: EntryKind) -> bool {
        let Some(owner) = self.assets.get(guid) else {
            return false;
        };
        if owner.is_folder() != (kind == EntryKind::Directory) || self.fs.exists(&owner.path) {
            return false;
        }
        let old_path = owner.path.clone();
        if self.subtree_conflict(&old_path, new_path).is_some() {
            return false;
        }

        log::info!("{:?} moved to {:?}", old_path, new_path);
        for moved in self.reindex_subtree(guid, new_path) {
            self.notify(AssetEvent::ResourceChanged {
                guid: moved,
                reason: ChangeReason::Moved,
            });
        }
        true
    }

    fn refresh_file(&mut self, guid: &Guid, report: &mut ScanReport) -> AssetResult<()> {
        let Some(path) = self.assets.get(guid).map(|a| a.path.clone()) else {
            return Ok(());
        };
        let source_time = self.fs.modification_time(&path)?;

        let Some(asset) = self.assets.get_mut(guid) else {
            return Ok(());
        };
        if asset.dirty {
            return Ok(());
        }

        let reason = if asset.timestamp.map(|t| source_time > t).unwrap_or(true) {
            Some(ChangeReason::SourceModified)
        } else if asset.requires_cache_file()
            && !asset
                .cache_path
                .as_ref()
                .map(|p| self.fs.exists(p))
                .unwrap_or(false)
        {
            Some(ChangeReason::CacheMissing)
        } else {
            None
        };

        if let Some(reason) = reason {
            asset.dirty = true;
            log::debug!("{:?} is dirty ({:?})", path, reason);
            report.changed += 1;
            self.notify(AssetEvent::ResourceChanged {
                guid: guid.clone(),
                reason,
            });
        }
        Ok(())
    }

    /// Re-resolve the parent link of an existing asset
    fn relink(&mut self, guid: &Guid, report: &mut ScanReport) {
        let Some(path) = self.assets.get(guid).map(|a| a.path.clone()) else {
            return;
        };
        let expected = self.resolve_parent(&path);

        let Some(asset) = self.assets.get_mut(guid) else {
            return;
        };
        if asset.parent != expected {
            asset.parent = expected;
            report.changed += 1;
            self.notify(AssetEvent::ResourceChanged {
                guid: guid.clone(),
                reason: ChangeReason::Reparented,
            });
        }
    }

    fn resolve_parent(&self, path: &Path) -> Option<Guid> {
        let dir = path.parent()?;
        if dir == self.config.resource_dir {
            return None;
        }
        let guid = self.path_index.get(dir)?;
        self.assets
            .get(guid)
            .filter(|a| a.is_folder())
            .map(|a| a.guid.clone())
    }

    /// Remove an asset from every index, then release its GUID.
    ///
    /// Children still pointing at it become root-parented until a later
    /// scan re-links them.
    fn destroy(&mut self, guid: &Guid) -> bool {
        if !self.assets.contains_key(guid) {
            return false;
        }

        for child in self.assets.values_mut() {
            if child.parent.as_ref() == Some(guid) {
                child.parent = None;
            }
        }

        let Some(asset) = self.assets.remove(guid) else {
            return false;
        };
        if self.path_index.get(&asset.path) == Some(guid) {
            self.path_index.remove(&asset.path);
        }

        if let Some(cache) = &asset.cache_path {
            if self.fs.exists(cache) {
                if let Err(e) = self.fs.delete(cache) {
                    log::warn!("Could not delete cache artifact {:?}: {}", cache, e);
                }
            }
        }

        self.guids.release(guid);
        log::debug!("Removed {} {:?}", guid, asset.path);
        self.notify(AssetEvent::ResourceRemoved { guid: guid.clone() });
        true
    }

    // ------------------------------------------------------------------
    // Import
    // ------------------------------------------------------------------

    /// Run the asset's importer.
    ///
    /// Returns `Ok(false)` when the importer fails: the asset stays dirty,
    /// any previous artifact is kept and observers get a `ResourceChanged`
    /// with reason `ImportFailed`. File-system failures outside the
    /// importer are returned as errors.
    pub fn import(&mut self, guid: &Guid) -> AssetResult<bool> {
        let asset = self
            .assets
            .get(guid)
            .ok_or_else(|| AssetError::AssetNotFound(guid.clone()))?;
        if asset.is_folder() {
            return Ok(true);
        }
        let path = asset.path.clone();

        // Stamp taken before the importer runs, so an edit made during the
        // import leaves the source newer than the stamp
        let source_time = self.fs.modification_time(&path)?;
        self.fs.create_dir_all(&self.config.cache_dir)?;
        let cache_path = self.config.cache_dir.join(guid.as_str());

        let (outcome, requires_cache) = {
            let Some(asset) = self.assets.get_mut(guid) else {
                return Err(AssetError::AssetNotFound(guid.clone()));
            };
            let Some(importer) = asset.importer.as_mut() else {
                return Err(AssetError::NotImportable(guid.clone()));
            };
            let mut ctx = ImportContext::new(
                &asset.guid,
                &asset.path,
                &cache_path,
                &self.config.resource_dir,
                self.fs.as_ref(),
            );
            let outcome = run_importer(&mut **importer, &mut ctx, self.fs.as_ref());
            (outcome, importer.requires_cache_file())
        };

        match outcome {
            Ok(()) => {
                if let Some(asset) = self.assets.get_mut(guid) {
                    asset.dirty = false;
                    asset.timestamp = Some(source_time);
                    asset.cache_path = requires_cache.then_some(cache_path);
                }
                log::info!("Imported {:?}", path);
                self.notify(AssetEvent::ResourceChanged {
                    guid: guid.clone(),
                    reason: ChangeReason::Imported,
                });
                if self.config.write_sidecars {
                    self.save_sidecar(guid)?;
                }
                Ok(true)
            }
            Err(e) => {
                log::warn!("Import of {:?} failed: {}", path, e);
                if let Some(asset) = self.assets.get_mut(guid) {
                    asset.dirty = true;
                }
                self.notify(AssetEvent::ResourceChanged {
                    guid: guid.clone(),
                    reason: ChangeReason::ImportFailed,
                });
                Ok(false)
            }
        }
    }

    /// Run only the importer's `preload` step
    pub fn preload(&mut self, guid: &Guid) -> AssetResult<bool> {
        let cache_path = self.config.cache_dir.join(guid.as_str());
        let asset = self
            .assets
            .get_mut(guid)
            .ok_or_else(|| AssetError::AssetNotFound(guid.clone()))?;
        let Some(importer) = asset.importer.as_mut() else {
            return Ok(true);
        };

        let mut ctx = ImportContext::new(
            &asset.guid,
            &asset.path,
            &cache_path,
            &self.config.resource_dir,
            self.fs.as_ref(),
        );
        match importer.preload(&mut ctx) {
            Ok(()) => Ok(true),
            Err(e) => {
                log::warn!("Preload of {:?} failed: {}", asset.path, e);
                Ok(false)
            }
        }
    }

    /// Import every dirty asset once, by path
    pub fn import_dirty(&mut self) -> AssetResult<ScanReport> {
        let mut dirty: Vec<(PathBuf, Guid)> = self
            .assets
            .values()
            .filter(|a| a.dirty && !a.is_folder())
            .map(|a| (a.path.clone(), a.guid.clone()))
            .collect();
        dirty.sort();

        let mut report = ScanReport::default();
        for (_, guid) in dirty {
            if self.import(&guid)? {
                report.imported += 1;
            } else {
                report.import_failed += 1;
            }
        }
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Explicit mutations
    // ------------------------------------------------------------------

    /// Edit an asset's importer settings; the asset becomes dirty
    pub fn update_importer<F>(&mut self, guid: &Guid, edit: F) -> AssetResult<()>
    where
        F: FnOnce(&mut dyn AssetImporter),
    {
        let asset = self
            .assets
            .get_mut(guid)
            .ok_or_else(|| AssetError::AssetNotFound(guid.clone()))?;
        let importer = asset
            .importer
            .as_mut()
            .ok_or_else(|| AssetError::NotImportable(guid.clone()))?;

        edit(&mut **importer);
        asset.dirty = true;

        self.notify(AssetEvent::ResourceChanged {
            guid: guid.clone(),
            reason: ChangeReason::SettingsChanged,
        });
        if self.config.write_sidecars {
            self.save_sidecar(guid)?;
        }
        Ok(())
    }

    /// Rename or move a resource (and its sidecar) on disk and re-index it.
    ///
    /// Moving a folder moves everything below it; every moved asset gets a
    /// `ResourceChanged` with reason `Moved`, parents first.
    pub fn move_asset(&mut self, guid: &Guid, new_path: impl AsRef<Path>) -> AssetResult<()> {
        let new_path = vpath::normalize(new_path);
        let old_path = self
            .assets
            .get(guid)
            .map(|a| a.path.clone())
            .ok_or_else(|| AssetError::AssetNotFound(guid.clone()))?;
        if old_path == new_path {
            return Ok(());
        }

        self.check_inside_resources(&new_path)?;
        if new_path.starts_with(&old_path) {
            return Err(AssetError::PathConflict(new_path));
        }
        if let Some(dir) = new_path.parent() {
            let dir_ok = dir == self.config.resource_dir
                || self.get_asset_by_path(dir).map(Asset::is_folder).unwrap_or(false);
            if !dir_ok {
                return Err(AssetError::PathNotFound(dir.to_path_buf()));
            }
        }
        if self.fs.exists(&new_path) {
            return Err(AssetError::PathConflict(new_path));
        }
        if let Some(conflict) = self.subtree_conflict(&old_path, &new_path) {
            return Err(AssetError::PathConflict(conflict));
        }

        self.fs.rename(&old_path, &new_path)?;
        log::info!("Moved {:?} to {:?}", old_path, new_path);

        for moved in self.reindex_subtree(guid, &new_path) {
            self.notify(AssetEvent::ResourceChanged {
                guid: moved,
                reason: ChangeReason::Moved,
            });
        }

        let old_dot = self.get_dot_asset_filename(&old_path);
        if self.fs.exists(&old_dot) {
            let new_dot = self.get_dot_asset_filename(&new_path);
            self.fs.rename(&old_dot, &new_dot)?;
        }
        Ok(())
    }

    /// Delete a resource and its sidecar from disk and destroy it.
    ///
    /// Deleting a folder destroys everything below it, deepest first.
    pub fn delete_asset(&mut self, guid: &Guid) -> AssetResult<()> {
        let path = self
            .assets
            .get(guid)
            .map(|a| a.path.clone())
            .ok_or_else(|| AssetError::AssetNotFound(guid.clone()))?;

        self.fs.delete(&path)?;
        log::info!("Deleted {:?}", path);

        let mut doomed: Vec<(usize, PathBuf, Guid)> = self
            .assets
            .values()
            .filter(|a| a.path.starts_with(&path))
            .map(|a| (vpath::depth(&a.path), a.path.clone(), a.guid.clone()))
            .collect();
        doomed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        for (_, _, doomed_guid) in doomed {
            self.destroy(&doomed_guid);
        }

        let dot = self.get_dot_asset_filename(&path);
        if self.fs.exists(&dot) {
            self.fs.delete(&dot)?;
        }
        Ok(())
    }

    /// Write an asset's sidecar record
    pub fn save_sidecar(&self, guid: &Guid) -> AssetResult<()> {
        let asset = self
            .assets
            .get(guid)
            .ok_or_else(|| AssetError::AssetNotFound(guid.clone()))?;
        SidecarRecord::from_asset(asset).save(self.fs.as_ref(), &asset.dot_asset_filename)
    }

    fn check_inside_resources(&self, path: &Path) -> AssetResult<()> {
        if path.starts_with(&self.config.resource_dir) && path != self.config.resource_dir {
            Ok(())
        } else {
            Err(AssetError::OutsideResources(path.to_path_buf()))
        }
    }

    /// First registered path under `new_root` that does not belong to the
    /// subtree being moved there
    fn subtree_conflict(&self, old_root: &Path, new_root: &Path) -> Option<PathBuf> {
        self.path_index
            .keys()
            .find(|p| p.starts_with(new_root) && !p.starts_with(old_root))
            .cloned()
    }

    /// Re-key the asset at `guid` and everything below it under `new_root`.
    ///
    /// Returns the moved GUIDs, parents first.
    fn reindex_subtree(&mut self, guid: &Guid, new_root: &Path) -> Vec<Guid> {
        let Some(old_root) = self.assets.get(guid).map(|a| a.path.clone()) else {
            return Vec::new();
        };

        let mut moved: Vec<(usize, Guid, PathBuf)> = self
            .assets
            .values()
            .filter_map(|a| {
                vpath::rebase(&a.path, &old_root, new_root)
                    .map(|p| (vpath::depth(&a.path), a.guid.clone(), p))
            })
            .collect();
        moved.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.2.cmp(&b.2)));

        for (_, moved_guid, _) in &moved {
            if let Some(asset) = self.assets.get(moved_guid) {
                self.path_index.remove(&asset.path);
            }
        }
        for (_, moved_guid, new_path) in &moved {
            let dot = self.get_dot_asset_filename(new_path);
            if let Some(asset) = self.assets.get_mut(moved_guid) {
                asset.set_path(new_path.clone(), dot);
            }
            self.path_index.insert(new_path.clone(), moved_guid.clone());
        }

        // Descendants keep their parent GUIDs; only the moved root changes folder
        let parent = self.resolve_parent(new_root);
        if let Some(asset) = self.assets.get_mut(guid) {
            asset.parent = parent;
        }

        moved.into_iter().map(|(_, g, _)| g).collect()
    }

    // ------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------

    /// Describe every broken index invariant; empty when consistent
    pub fn check_consistency(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.path_index.len() != self.assets.len() {
            problems.push(format!(
                "{} paths indexed for {} assets",
                self.path_index.len(),
                self.assets.len()
            ));
        }

        for (path, guid) in &self.path_index {
            match self.assets.get(guid) {
                Some(asset) if &asset.path == path => {}
                Some(asset) => problems.push(format!("{:?} indexes {} at {:?}", path, guid, asset.path)),
                None => problems.push(format!("{:?} indexes dead GUID {}", path, guid)),
            }
        }

        for (guid, asset) in &self.assets {
            if &asset.guid != guid {
                problems.push(format!("{} stored under {}", asset.guid, guid));
            }
            if !self.guids.is_registered(guid) {
                problems.push(format!("{} is live but not registered", guid));
            }
            if self.path_index.get(&asset.path) != Some(guid) {
                problems.push(format!("{:?} not indexed for {}", asset.path, guid));
            }
            if asset.is_folder() && asset.cache_path.is_some() {
                problems.push(format!("folder {:?} has a cache path", asset.path));
            }
            if let Some(parent_guid) = &asset.parent {
                match self.assets.get(parent_guid) {
                    Some(parent) if parent.is_folder() && vpath::is_direct_child(&parent.path, &asset.path) => {}
                    Some(parent) => problems.push(format!(
                        "{:?} has parent {:?} which is not its folder",
                        asset.path, parent.path
                    )),
                    None => problems.push(format!("{:?} has dangling parent {}", asset.path, parent_guid)),
                }
            }
        }

        problems
    }
}

impl fmt::Debug for AssetDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetDatabase")
            .field("resource_dir", &self.config.resource_dir)
            .field("cache_dir", &self.config.cache_dir)
            .field("assets", &self.assets.len())
            .field("events", &self.events)
            .finish()
    }
}

fn run_importer(
    importer: &mut dyn AssetImporter,
    ctx: &mut ImportContext<'_>,
    fs: &dyn FileSystem,
) -> ImportResult<()> {
    importer.preload(ctx)?;
    importer.import(ctx)?;
    if importer.requires_cache_file() && !fs.exists(ctx.cache_path) {
        return Err(ImportError::Unsupported(format!(
            "{} produced no cache artifact",
            importer.type_name()
        )));
    }
    Ok(())
}
