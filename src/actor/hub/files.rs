//! Tracked file records, keyed by case-folded path.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rustc_hash::FxHashMap;

use crate::actor::fs::FileWatcher;
use crate::utils::path::fold_key;

/// One file under management, as seen by clients and `list_files`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    /// Normalized absolute path
    pub path: PathBuf,
    /// Base name, for display
    pub name: String,
    /// First registration, never changes
    pub tracked_at: SystemTime,
    /// Modification time of the last successful render
    pub last_changed: SystemTime,
    /// Last successfully rendered HTML
    pub html: String,
    /// Whether a watch is installed
    pub active: bool,
}

impl TrackedFile {
    pub fn new(path: PathBuf, html: String, last_changed: SystemTime) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            path,
            name,
            tracked_at: SystemTime::now(),
            last_changed,
            html,
            active: false,
        }
    }
}

/// A tracked file plus its watch. `file.active` mirrors `watcher.is_some()`.
pub(super) struct FileEntry {
    pub file: TrackedFile,
    watcher: Option<FileWatcher>,
    /// Registration order
    seq: u64,
}

impl FileEntry {
    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn attach(&mut self, watcher: FileWatcher) {
        self.watcher = Some(watcher);
        self.file.active = true;
    }

    /// Take the watch out. The caller drops it outside the lock.
    pub fn detach(&mut self) -> Option<FileWatcher> {
        self.file.active = false;
        self.watcher.take()
    }
}

/// Every tracked file. Only touched under the hub's lock.
#[derive(Default)]
pub(super) struct FileStore {
    entries: FxHashMap<String, FileEntry>,
    next_seq: u64,
}

impl FileStore {
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&fold_key(path))
    }

    pub fn get(&self, path: &Path) -> Option<&FileEntry> {
        self.entries.get(&fold_key(path))
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut FileEntry> {
        self.entries.get_mut(&fold_key(path))
    }

    /// Insert a new record and return a copy of it.
    ///
    /// The caller has checked `contains` under the same lock.
    pub fn insert(&mut self, file: TrackedFile, watcher: Option<FileWatcher>) -> TrackedFile {
        let key = fold_key(&file.path);
        let mut entry = FileEntry {
            file,
            watcher: None,
            seq: self.next_seq,
        };
        if let Some(watcher) = watcher {
            entry.attach(watcher);
        }
        self.next_seq += 1;
        let copy = entry.file.clone();
        self.entries.insert(key, entry);
        copy
    }

    pub fn remove(&mut self, path: &Path) -> Option<FileEntry> {
        self.entries.remove(&fold_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Owned copies of every record, in registration order.
    pub fn snapshot(&self) -> Vec<TrackedFile> {
        self.ordered().into_iter().map(|e| e.file.clone()).collect()
    }

    /// Borrowed records in registration order.
    pub fn ordered(&self) -> Vec<&FileEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|e| e.seq);
        entries
    }

    /// Detach every watch, leaving the records in place.
    pub fn detach_all(&mut self) -> Vec<FileWatcher> {
        self.entries.values_mut().filter_map(FileEntry::detach).collect()
    }
}
