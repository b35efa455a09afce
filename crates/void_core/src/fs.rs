//! File-system capability
//!
//! The asset pipeline never touches `std::fs` directly. Everything goes
//! through [`FileSystem`] so the database can run against the real disk
//! ([`NativeFileSystem`]) or a deterministic in-memory tree
//! ([`MemoryFileSystem`](crate::memory::MemoryFileSystem)).
//!
//! All operations are synchronous and fail with a distinct [`FsError`].

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{FsError, FsResult};

/// Extension appended to a file while [`FileSystem::write_atomic`] builds it
pub const TEMP_EXTENSION: &str = "tmp";

/// Kind of a directory entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

/// A single entry returned by [`FileSystem::list_directory`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Synchronous file-system primitives used by the asset pipeline.
pub trait FileSystem {
    /// True if anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// True if `path` is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Last modification time of a file or directory
    fn modification_time(&self, path: &Path) -> FsResult<SystemTime>;

    /// Immediate children of a directory, sorted by path
    fn list_directory(&self, path: &Path) -> FsResult<Vec<DirEntry>>;

    /// Copy a file, overwriting `dst`
    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()>;

    /// Delete a file, or a directory and everything below it
    fn delete(&self, path: &Path) -> FsResult<()>;

    /// Move a file or directory; fails if `dst` exists
    fn rename(&self, src: &Path, dst: &Path) -> FsResult<()>;

    /// Move a file onto `dst` in one step, replacing any file already there.
    ///
    /// On failure `dst` is left as it was.
    fn replace(&self, src: &Path, dst: &Path) -> FsResult<()>;

    /// Create a directory and any missing parents
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Read a whole file
    fn read(&self, path: &Path) -> FsResult<Vec<u8>>;

    /// Create or truncate a file with `data`
    fn write(&self, path: &Path, data: &[u8]) -> FsResult<()>;

    /// Read a whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> FsResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|e| FsError::Io {
            op: "read_to_string",
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    /// Write `data` next to `path` and move it into place.
    ///
    /// A failed write leaves any previous file at `path` untouched and
    /// removes the temporary file.
    fn write_atomic(&self, path: &Path, data: &[u8]) -> FsResult<()> {
        let tmp = crate::path::with_appended_extension(path, TEMP_EXTENSION);
        let result = self.write(&tmp, data).and_then(|()| self.replace(&tmp, path));
        if result.is_err() && self.exists(&tmp) {
            if let Err(e) = self.delete(&tmp) {
                log::warn!("Could not remove temporary file {:?}: {}", tmp, e);
            }
        }
        result
    }
}

/// [`FileSystem`] backed by `std::fs`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeFileSystem;

impl NativeFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for NativeFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn modification_time(&self, path: &Path) -> FsResult<SystemTime> {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| FsError::from_io("modification_time", path, e))
    }

    fn list_directory(&self, path: &Path) -> FsResult<Vec<DirEntry>> {
        if path.exists() && !path.is_dir() {
            return Err(FsError::NotADirectory {
                op: "list_directory",
                path: path.to_path_buf(),
            });
        }

        let read_dir =
            std::fs::read_dir(path).map_err(|e| FsError::from_io("list_directory", path, e))?;

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|e| FsError::from_io("list_directory", path, e))?;
            let entry_path = entry.path();
            let file_type = entry
                .file_type()
                .map_err(|e| FsError::from_io("list_directory", &entry_path, e))?;

            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_symlink() && entry_path.is_dir() {
                // Linked folders are not followed; they can point back up the tree
                log::debug!("Skipping linked directory {:?}", entry_path);
                continue;
            } else {
                EntryKind::File
            };
            entries.push(DirEntry { path: entry_path, kind });
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()> {
        std::fs::copy(src, dst)
            .map(|_| ())
            .map_err(|e| FsError::from_io("copy", src, e))
    }

    fn delete(&self, path: &Path) -> FsResult<()> {
        let result = if path.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };
        result.map_err(|e| FsError::from_io("delete", path, e))
    }

    fn rename(&self, src: &Path, dst: &Path) -> FsResult<()> {
        if dst.exists() {
            return Err(FsError::AlreadyExists {
                op: "rename",
                path: dst.to_path_buf(),
            });
        }
        std::fs::rename(src, dst).map_err(|e| FsError::from_io("rename", src, e))
    }

    fn replace(&self, src: &Path, dst: &Path) -> FsResult<()> {
        if dst.is_dir() {
            return Err(FsError::AlreadyExists {
                op: "replace",
                path: dst.to_path_buf(),
            });
        }
        std::fs::rename(src, dst).map_err(|e| FsError::from_io("replace", src, e))
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| FsError::from_io("create_dir_all", path, e))
    }

    fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| FsError::from_io("read", path, e))
    }

    fn write(&self, path: &Path, data: &[u8]) -> FsResult<()> {
        std::fs::write(path, data).map_err(|e| FsError::from_io("write", path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_list_directory_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::new();

        fs.write(&dir.path().join("b.txt"), b"b").unwrap();
        fs.create_dir_all(&dir.path().join("a")).unwrap();

        let entries = fs.list_directory(dir.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, dir.path().join("a"));
        assert!(entries[0].is_dir());
        assert_eq!(entries[1].kind, EntryKind::File);
    }

    #[test]
    fn test_native_errors_are_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::new();
        let missing = dir.path().join("missing.txt");

        assert!(fs.read(&missing).unwrap_err().is_not_found());
        assert!(fs.modification_time(&missing).unwrap_err().is_not_found());

        fs.write(&dir.path().join("file"), b"x").unwrap();
        let err = fs.list_directory(&dir.path().join("file")).unwrap_err();
        assert!(matches!(err, FsError::NotADirectory { .. }));
    }

    #[test]
    fn test_native_write_atomic_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::new();
        let target = dir.path().join("cache.bin");

        fs.write_atomic(&target, b"one").unwrap();
        fs.write_atomic(&target, b"two").unwrap();

        assert_eq!(fs.read(&target).unwrap(), b"two");
        assert!(!fs.exists(&dir.path().join("cache.bin.tmp")));
    }

    #[test]
    fn test_native_write_atomic_keeps_previous_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::new();
        let target = dir.path().join("cache.bin");
        fs.write(&target, b"old").unwrap();

        // A directory squatting on the temp name makes the write fail
        fs.create_dir_all(&dir.path().join("cache.bin.tmp")).unwrap();
        assert!(fs.write_atomic(&target, b"new").is_err());
        assert_eq!(fs.read(&target).unwrap(), b"old");
    }

    #[cfg(unix)]
    #[test]
    fn test_native_linked_directories_are_not_listed() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::new();
        fs.create_dir_all(&dir.path().join("A")).unwrap();
        fs.write(&dir.path().join("real.txt"), b"x").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("A").join("loop")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("link.txt")).unwrap();

        assert!(fs.list_directory(&dir.path().join("A")).unwrap().is_empty());

        let entries = fs.list_directory(dir.path()).unwrap();
        let link = entries.iter().find(|e| e.path.ends_with("link.txt")).unwrap();
        assert_eq!(link.kind, EntryKind::File);
    }
}
