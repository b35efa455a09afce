//! # void_asset - Editor Asset Database
//!
//! Tracks every file and folder under a project's resource directory:
//! - Stable GUID per resource, persisted in a sidecar record next to it
//! - Path and GUID lookups, folder listings, importer-type queries
//! - Dirty tracking against source modification times
//! - Pluggable importers that write one cache artifact per GUID
//! - Synchronous change notifications (`ResourceAdded`, `ResourceRemoved`,
//!   `ResourceChanged`)
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use void_asset::prelude::*;
//! use void_core::NativeFileSystem;
//!
//! let config = AssetDatabaseConfig::for_project("MyGame");
//! let mut db = AssetDatabase::new(config, Arc::new(NativeFileSystem::new()))?;
//!
//! db.subscribe(|db, event| {
//!     if let Some(asset) = db.get_asset_by_guid(event.guid()) {
//!         println!("{} {:?}", event.name(), asset.path());
//!     }
//! });
//!
//! db.scan()?;
//! db.import_dirty()?;
//! ```

pub mod asset;
pub mod config;
pub mod database;
pub mod error;
pub mod events;
pub mod guid;
pub mod importer;
pub mod sidecar;
#[cfg(feature = "hot-reload")]
pub mod watcher;

pub use asset::Asset;
pub use config::AssetDatabaseConfig;
pub use database::{AssetDatabase, ScanReport};
pub use error::{AssetError, AssetResult};
pub use events::{AssetEvent, ChangeReason};
pub use guid::{Guid, GuidRegistry};
pub use importer::{
    AssetImporter, ImportContext, ImportError, ImportResult, ImporterRegistry, FOLDER_IMPORTER_TYPE,
};
pub use sidecar::SidecarRecord;

#[cfg(feature = "hot-reload")]
pub use watcher::{ResourceChange, ResourceChangeKind, ResourceWatcher, WatchError};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::asset::Asset;
    pub use crate::config::AssetDatabaseConfig;
    pub use crate::database::{AssetDatabase, ScanReport};
    pub use crate::error::{AssetError, AssetResult};
    pub use crate::events::{AssetEvent, ChangeReason};
    pub use crate::guid::Guid;
    pub use crate::importer::{AssetImporter, ImportContext, ImportError, ImporterRegistry};
}
