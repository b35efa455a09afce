//! GUID registry
//!
//! Mints collision-free asset identifiers and tracks which ones are bound.
//! A released GUID is never minted again by the same registry, but an
//! explicit [`GuidRegistry::register`] may claim it back (for instance when
//! a sidecar record carrying it is rediscovered).

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AssetError, AssetResult};

/// Opaque, globally unique asset identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(String);

impl Guid {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Guid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Guid {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// In-memory bookkeeping of GUIDs for one database instance.
#[derive(Debug, Default)]
pub struct GuidRegistry {
    in_use: HashSet<Guid>,
    /// Released GUIDs; never minted again
    retired: HashSet<Guid>,
}

impl GuidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a GUID distinct from every registered or retired one and mark it in use.
    pub fn generate(&mut self) -> Guid {
        loop {
            let guid = Guid(Uuid::new_v4().simple().to_string());
            if !self.in_use.contains(&guid) && !self.retired.contains(&guid) {
                self.in_use.insert(guid.clone());
                return guid;
            }
        }
    }

    /// Mark an externally supplied GUID as in use.
    pub fn register(&mut self, guid: Guid) -> AssetResult<()> {
        if self.in_use.contains(&guid) {
            return Err(AssetError::DuplicateGuid(guid));
        }
        self.retired.remove(&guid);
        self.in_use.insert(guid);
        Ok(())
    }

    /// Release a GUID. Returns false if it was not registered.
    pub fn release(&mut self, guid: &Guid) -> bool {
        if self.in_use.remove(guid) {
            self.retired.insert(guid.clone());
            true
        } else {
            false
        }
    }

    pub fn is_registered(&self, guid: &Guid) -> bool {
        self.in_use.contains(guid)
    }

    /// Number of GUIDs currently in use
    pub fn len(&self) -> usize {
        self.in_use.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_use.is_empty()
    }
}
