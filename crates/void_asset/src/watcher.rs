//! Resource directory watcher
//!
//! Collects raw file-system notifications and turns them into debounced
//! [`ResourceChange`]s. The database is never touched from the watcher
//! thread: the owner polls, and rescans when anything came back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use notify::{Event, EventKind, RecursiveMode, Watcher};
use thiserror::Error;

/// Kind of change seen under the resource directory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceChangeKind {
    Created,
    Modified,
    Removed,
}

/// A debounced change to one path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceChange {
    pub path: PathBuf,
    pub kind: ResourceChangeKind,
}

/// Watcher setup failure
#[derive(Debug, Error)]
#[error("failed to watch {path:?}: {source}")]
pub struct WatchError {
    pub path: PathBuf,
    #[source]
    pub source: notify::Error,
}

/// Recursive watcher over one resource directory
pub struct ResourceWatcher {
    _watcher: notify::RecommendedWatcher,
    rx: crossbeam_channel::Receiver<notify::Result<Event>>,
    root: PathBuf,
    sidecar_extension: String,
    debounce: HashMap<PathBuf, Instant>,
    debounce_duration: Duration,
}

impl ResourceWatcher {
    /// Start watching `root` recursively.
    ///
    /// Changes to sidecar files (`sidecar_extension`) and hidden entries are
    /// dropped; the database writes those itself.
    pub fn new(root: impl AsRef<Path>, sidecar_extension: &str) -> Result<Self, WatchError> {
        let root = root.as_ref().to_path_buf();
        let (tx, rx) = crossbeam_channel::unbounded();

        let watch_err = |source| WatchError {
            path: root.clone(),
            source,
        };

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .map_err(watch_err)?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(watch_err)?;

        log::info!("Watching resource directory {:?}", root);
        Ok(Self {
            _watcher: watcher,
            rx,
            root,
            sidecar_extension: sidecar_extension.to_lowercase(),
            debounce: HashMap::new(),
            debounce_duration: Duration::from_millis(100),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn set_debounce(&mut self, duration: Duration) {
        self.debounce_duration = duration;
    }

    /// Drain pending notifications without blocking
    pub fn poll(&mut self) -> Vec<ResourceChange> {
        let mut changes = Vec::new();
        let now = Instant::now();

        while let Ok(result) = self.rx.try_recv() {
            match result {
                Ok(event) => self.collect(event, now, &mut changes),
                Err(e) => log::warn!("Watcher error: {}", e),
            }
        }

        self.debounce
            .retain(|_, time| now.duration_since(*time) < Duration::from_secs(5));
        changes
    }

    /// Block up to `timeout` for the first notification, then drain
    pub fn wait(&mut self, timeout: Duration) -> Vec<ResourceChange> {
        let mut changes = Vec::new();
        if let Ok(result) = self.rx.recv_timeout(timeout) {
            match result {
                Ok(event) => self.collect(event, Instant::now(), &mut changes),
                Err(e) => log::warn!("Watcher error: {}", e),
            }
        }
        changes.extend(self.poll());
        changes
    }

    fn collect(&mut self, event: Event, now: Instant, changes: &mut Vec<ResourceChange>) {
        let kind = match event.kind {
            EventKind::Create(_) => ResourceChangeKind::Created,
            EventKind::Modify(_) => ResourceChangeKind::Modified,
            EventKind::Remove(_) => ResourceChangeKind::Removed,
            _ => return,
        };

        for path in event.paths {
            if !self.is_relevant(&path) {
                continue;
            }
            if let Some(last) = self.debounce.get(&path) {
                if now.duration_since(*last) < self.debounce_duration {
                    continue;
                }
            }
            self.debounce.insert(path.clone(), now);
            changes.push(ResourceChange { path, kind });
        }
    }

    fn is_relevant(&self, path: &Path) -> bool {
        if !path.starts_with(&self.root) {
            return false;
        }
        let hidden = path
            .strip_prefix(&self.root)
            .map(|rest| {
                rest.components()
                    .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
            })
            .unwrap_or(false);
        if hidden {
            return false;
        }
        void_core::path::extension(path).as_deref() != Some(self.sidecar_extension.as_str())
    }
}
