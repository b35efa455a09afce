//! Change notifications published by the asset database

use crate::guid::Guid;

/// Why a `ResourceChanged` notification was sent
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChangeReason {
    /// Source file is newer than the last successful import
    SourceModified,
    /// Cache artifact disappeared
    CacheMissing,
    /// Import succeeded; the cache artifact is ready
    Imported,
    /// Import failed; the asset stays dirty
    ImportFailed,
    /// Asset path changed
    Moved,
    /// Parent link was resolved or dropped
    Reparented,
    /// Importer settings were edited
    SettingsChanged,
}

/// Notification emitted after a committed change
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AssetEvent {
    ResourceAdded { guid: Guid },
    ResourceRemoved { guid: Guid },
    ResourceChanged { guid: Guid, reason: ChangeReason },
}

impl AssetEvent {
    /// GUID of the affected asset
    pub fn guid(&self) -> &Guid {
        match self {
            Self::ResourceAdded { guid }
            | Self::ResourceRemoved { guid }
            | Self::ResourceChanged { guid, .. } => guid,
        }
    }

    /// Event name as shown in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::ResourceAdded { .. } => "ResourceAdded",
            Self::ResourceRemoved { .. } => "ResourceRemoved",
            Self::ResourceChanged { .. } => "ResourceChanged",
        }
    }

    /// True for a `ResourceChanged` signalling a ready cache artifact
    pub fn is_cache_ready(&self) -> bool {
        matches!(
            self,
            Self::ResourceChanged {
                reason: ChangeReason::Imported,
                ..
            }
        )
    }
}
