//! # void_core - Editor Core Primitives
//!
//! Leaf crate shared by the asset pipeline and the editor:
//! - **Path utilities**: normalization and decomposition of resource paths
//! - **File-system capability**: a synchronous [`FileSystem`] trait with a
//!   native implementation and a deterministic in-memory one
//!
//! Nothing in here holds project state.

pub mod error;
pub mod fs;
pub mod memory;
pub mod path;

pub use error::{FsError, FsResult};
pub use fs::{DirEntry, EntryKind, FileSystem, NativeFileSystem, TEMP_EXTENSION};
pub use memory::MemoryFileSystem;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{FsError, FsResult};
    pub use crate::fs::{DirEntry, EntryKind, FileSystem, NativeFileSystem};
    pub use crate::memory::MemoryFileSystem;
    pub use crate::path::{normalize, split_path, SplitPath};
}
