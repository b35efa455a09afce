//! In-memory file system
//!
//! Deterministic [`FileSystem`] used by tests and headless tools. Every
//! mutation advances a logical clock by one second, so modification times
//! are strictly increasing and never depend on the host clock resolution.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use parking_lot::RwLock;

use crate::error::{FsError, FsResult};
use crate::fs::{DirEntry, EntryKind, FileSystem};

#[derive(Clone, Debug)]
enum Node {
    Dir { modified: SystemTime },
    File { data: Vec<u8>, modified: SystemTime },
}

impl Node {
    fn modified(&self) -> SystemTime {
        match self {
            Node::Dir { modified } | Node::File { modified, .. } => *modified,
        }
    }

    fn kind(&self) -> EntryKind {
        match self {
            Node::Dir { .. } => EntryKind::Directory,
            Node::File { .. } => EntryKind::File,
        }
    }
}

#[derive(Default)]
struct State {
    nodes: BTreeMap<PathBuf, Node>,
    clock: u64,
    /// Paths below which every mutating call fails
    failing: BTreeSet<PathBuf>,
    /// Paths below which one named operation fails
    failing_ops: BTreeSet<(&'static str, PathBuf)>,
    /// Listing entries reported without backing nodes
    phantoms: Vec<DirEntry>,
}

impl State {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.clock)
    }

    fn check_writable(&self, op: &'static str, path: &Path) -> FsResult<()> {
        let op_fails = self
            .failing_ops
            .iter()
            .any(|(failing_op, p)| *failing_op == op && path.starts_with(p));
        if op_fails || self.failing.iter().any(|p| path.starts_with(p)) {
            return Err(FsError::Io {
                op,
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "injected failure"),
            });
        }
        Ok(())
    }

    fn require_parent(&self, op: &'static str, path: &Path) -> FsResult<()> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() && parent != Path::new("/") => {
                match self.nodes.get(parent) {
                    Some(Node::Dir { .. }) => Ok(()),
                    Some(Node::File { .. }) => Err(FsError::NotADirectory {
                        op,
                        path: parent.to_path_buf(),
                    }),
                    None => Err(FsError::NotFound {
                        op,
                        path: parent.to_path_buf(),
                    }),
                }
            }
            _ => Ok(()),
        }
    }

    fn subtree(&self, path: &Path) -> Vec<PathBuf> {
        self.nodes
            .keys()
            .filter(|p| p.starts_with(path))
            .cloned()
            .collect()
    }
}

/// Thread-safe in-memory [`FileSystem`].
#[derive(Default)]
pub struct MemoryFileSystem {
    state: RwLock<State>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory (and parents) without going through the trait.
    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let _ = self.create_dir_all(path.as_ref());
    }

    /// Create a file, creating missing parent directories.
    pub fn add_file(&self, path: impl AsRef<Path>, data: impl AsRef<[u8]>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        let _ = self.write(path, data.as_ref());
    }

    /// Bump the modification time of an existing entry.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.state.write();
        let now = state.tick();
        if let Some(node) = state.nodes.get_mut(path.as_ref()) {
            match node {
                Node::Dir { modified } | Node::File { modified, .. } => *modified = now,
            }
        }
    }

    /// Make every mutating call at or below `path` fail with an I/O error.
    pub fn fail_writes_under(&self, path: impl AsRef<Path>) {
        self.state.write().failing.insert(path.as_ref().to_path_buf());
    }

    /// Make one operation (`"write"`, `"replace"`, ...) fail at or below `path`.
    pub fn fail_op_under(&self, op: &'static str, path: impl AsRef<Path>) {
        self.state
            .write()
            .failing_ops
            .insert((op, path.as_ref().to_path_buf()));
    }

    /// Undo every injected failure.
    pub fn clear_failures(&self) {
        let mut state = self.state.write();
        state.failing.clear();
        state.failing_ops.clear();
    }

    /// Report an extra entry in its parent's listing without storing it.
    ///
    /// Listing the same name twice with different kinds reproduces a file
    /// and a folder colliding on one path.
    pub fn inject_entry(&self, path: impl AsRef<Path>, kind: EntryKind) {
        self.state.write().phantoms.push(DirEntry {
            path: path.as_ref().to_path_buf(),
            kind,
        });
    }

    /// Drop every entry added with [`inject_entry`](Self::inject_entry).
    pub fn clear_injected_entries(&self) {
        self.state.write().phantoms.clear();
    }

    /// Number of files and directories stored
    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }
}

impl FileSystem for MemoryFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.state.read().nodes.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.state.read().nodes.get(path), Some(Node::Dir { .. }))
    }

    fn modification_time(&self, path: &Path) -> FsResult<SystemTime> {
        self.state
            .read()
            .nodes
            .get(path)
            .map(Node::modified)
            .ok_or_else(|| FsError::NotFound {
                op: "modification_time",
                path: path.to_path_buf(),
            })
    }

    fn list_directory(&self, path: &Path) -> FsResult<Vec<DirEntry>> {
        let state = self.state.read();
        match state.nodes.get(path) {
            Some(Node::Dir { .. }) => {}
            Some(Node::File { .. }) => {
                return Err(FsError::NotADirectory {
                    op: "list_directory",
                    path: path.to_path_buf(),
                })
            }
            None => {
                return Err(FsError::NotFound {
                    op: "list_directory",
                    path: path.to_path_buf(),
                })
            }
        }

        let mut entries: Vec<DirEntry> = state
            .nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .map(|(p, node)| DirEntry {
                path: p.clone(),
                kind: node.kind(),
            })
            .collect();
        entries.extend(
            state
                .phantoms
                .iter()
                .filter(|e| e.path.parent() == Some(path))
                .cloned(),
        );
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn copy(&self, src: &Path, dst: &Path) -> FsResult<()> {
        let mut state = self.state.write();
        state.check_writable("copy", dst)?;
        let data = match state.nodes.get(src) {
            Some(Node::File { data, .. }) => data.clone(),
            Some(Node::Dir { .. }) => {
                return Err(FsError::Io {
                    op: "copy",
                    path: src.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "source is a directory"),
                })
            }
            None => {
                return Err(FsError::NotFound {
                    op: "copy",
                    path: src.to_path_buf(),
                })
            }
        };
        state.require_parent("copy", dst)?;
        let modified = state.tick();
        state.nodes.insert(dst.to_path_buf(), Node::File { data, modified });
        Ok(())
    }

    fn delete(&self, path: &Path) -> FsResult<()> {
        let mut state = self.state.write();
        state.check_writable("delete", path)?;
        if !state.nodes.contains_key(path) {
            return Err(FsError::NotFound {
                op: "delete",
                path: path.to_path_buf(),
            });
        }
        for p in state.subtree(path) {
            state.nodes.remove(&p);
        }
        Ok(())
    }

    fn rename(&self, src: &Path, dst: &Path) -> FsResult<()> {
        let mut state = self.state.write();
        state.check_writable("rename", src)?;
        state.check_writable("rename", dst)?;
        if !state.nodes.contains_key(src) {
            return Err(FsError::NotFound {
                op: "rename",
                path: src.to_path_buf(),
            });
        }
        if state.nodes.contains_key(dst) {
            return Err(FsError::AlreadyExists {
                op: "rename",
                path: dst.to_path_buf(),
            });
        }
        state.require_parent("rename", dst)?;

        for old in state.subtree(src) {
            if let Some(node) = state.nodes.remove(&old) {
                let new = crate::path::rebase(&old, src, dst).unwrap_or_else(|| dst.to_path_buf());
                state.nodes.insert(new, node);
            }
        }
        Ok(())
    }

    fn replace(&self, src: &Path, dst: &Path) -> FsResult<()> {
        let mut state = self.state.write();
        state.check_writable("replace", src)?;
        state.check_writable("replace", dst)?;
        match state.nodes.get(src) {
            Some(Node::File { .. }) => {}
            Some(Node::Dir { .. }) => {
                return Err(FsError::Io {
                    op: "replace",
                    path: src.to_path_buf(),
                    source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "source is a directory"),
                })
            }
            None => {
                return Err(FsError::NotFound {
                    op: "replace",
                    path: src.to_path_buf(),
                })
            }
        }
        if let Some(Node::Dir { .. }) = state.nodes.get(dst) {
            return Err(FsError::AlreadyExists {
                op: "replace",
                path: dst.to_path_buf(),
            });
        }
        state.require_parent("replace", dst)?;

        if let Some(node) = state.nodes.remove(src) {
            state.nodes.insert(dst.to_path_buf(), node);
        }
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        let mut state = self.state.write();
        state.check_writable("create_dir_all", path)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if current == Path::new("/") {
                continue;
            }
            match state.nodes.get(&current) {
                Some(Node::Dir { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(FsError::NotADirectory {
                        op: "create_dir_all",
                        path: current,
                    })
                }
                None => {
                    let modified = state.tick();
                    state.nodes.insert(current.clone(), Node::Dir { modified });
                }
            }
        }
        Ok(())
    }

    fn read(&self, path: &Path) -> FsResult<Vec<u8>> {
        match self.state.read().nodes.get(path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Dir { .. }) => Err(FsError::Io {
                op: "read",
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "is a directory"),
            }),
            None => Err(FsError::NotFound {
                op: "read",
                path: path.to_path_buf(),
            }),
        }
    }

    fn write(&self, path: &Path, data: &[u8]) -> FsResult<()> {
        let mut state = self.state.write();
        state.check_writable("write", path)?;
        if let Some(Node::Dir { .. }) = state.nodes.get(path) {
            return Err(FsError::Io {
                op: "write",
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "is a directory"),
            });
        }
        state.require_parent("write", path)?;
        let modified = state.tick();
        state.nodes.insert(
            path.to_path_buf(),
            Node::File {
                data: data.to_vec(),
                modified,
            },
        );
        Ok(())
    }
}
