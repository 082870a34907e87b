//! Hub - Tracked Files and Connected Clients
//!
//! The single owner of both collections:
//!
//! ```text
//!                    +--> FileStore (Mutex, short critical sections)
//! HTTP / CLI --ops-->|
//!                    +--> HubMsg inbox --> HubActor --> client queues
//! FileWatcher --quiescent path--> change loop --render--> Broadcast(update)
//! ```
//!
//! - rendering and stat happen outside the lock; results are re-checked
//!   against the store before they are applied
//! - every broadcast is queued while the lock is held, so clients see
//!   file changes in the order the store saw them
//! - a new client gets `files` + `logs` from the event loop, then deltas

mod clients;
mod delivery;
mod error;
mod files;
mod logs;


use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use super::fs::FileWatcher;
use super::messages::HubMsg;
use crate::reload::message::UpdateMessage;
use crate::render::Render;
use crate::utils::path::normalize_path;
use clients::HubActor;
use files::FileStore;

pub use error::HubError;
pub use files::TrackedFile;
pub use logs::Logger;

/// Outbound queue capacity per client
pub const DEFAULT_CLIENT_QUEUE: usize = 256;
/// Log entries kept for replay
pub const DEFAULT_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy)]
pub struct HubOptions {
    pub client_queue: usize,
    pub log_capacity: usize,
}

impl Default for HubOptions {
    fn default() -> Self {
        Self {
            client_queue: DEFAULT_CLIENT_QUEUE,
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

/// Identifies one connected client for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered client: its id plus the receiving end of its queue.
///
/// The queue yields serialized messages in order and ends when the hub
/// drops the client (disconnect, eviction or shutdown).
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    pub queue: mpsc::Receiver<Arc<str>>,
}

/// Handle to the hub. Cheap to clone.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

struct HubInner {
    files: Arc<Mutex<FileStore>>,
    tx: mpsc::UnboundedSender<HubMsg>,
    /// Handed to every FileWatcher
    changes: mpsc::UnboundedSender<PathBuf>,
    renderer: Arc<dyn Render>,
    runtime: Handle,
    next_client: AtomicU64,
    options: HubOptions,
    logger: Logger,
}

impl Hub {
    /// Start the event loop and the change loop on `runtime`.
    pub fn new(renderer: Arc<dyn Render>, options: HubOptions, runtime: Handle) -> Self {
        let files = Arc::new(Mutex::new(FileStore::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        let (changes, changes_rx) = mpsc::unbounded_channel();

        let actor = HubActor::new(rx, Arc::clone(&files), options.log_capacity);
        runtime.spawn(actor.run());

        let inner = Arc::new(HubInner {
            files,
            logger: Logger::new(tx.clone()),
            tx,
            changes,
            renderer,
            runtime: runtime.clone(),
            next_client: AtomicU64::new(1),
            options,
        });
        runtime.spawn(change_loop(Arc::downgrade(&inner), changes_rx));

        Self { inner }
    }

    // =========================================================================
    // File operations
    // =========================================================================

    /// Register a file, render it and optionally start watching it.
    pub fn add_file(&self, path: &Path, active: bool) -> Result<TrackedFile, HubError> {
        let path = normalize_path(path);
        if self.inner.files.lock().contains(&path) {
            return Err(HubError::AlreadyTracked(path));
        }

        let (html, modified) = self.render_current(&path)?;
        let watcher = if active {
            Some(self.start_watch(&path)?)
        } else {
            None
        };

        let file = {
            let mut store = self.inner.files.lock();
            // Lost a race with a concurrent add of the same path
            if store.contains(&path) {
                return Err(HubError::AlreadyTracked(path));
            }
            let file = store.insert(TrackedFile::new(path, html, modified), watcher);
            self.broadcast_files(&store);
            file
        };

        self.inner
            .logger
            .info(format!("tracking {}", file.path.display()));
        Ok(file)
    }

    /// Re-render and start watching. Already active is a no-op.
    pub fn activate(&self, path: &Path) -> Result<(), HubError> {
        let path = normalize_path(path);
        match self.inner.files.lock().get(&path) {
            None => return Err(HubError::NotFound(path)),
            Some(entry) if entry.is_active() => return Ok(()),
            Some(_) => {}
        }

        let rendered = match self.render_current(&path) {
            Ok(rendered) => Some(rendered),
            Err(e @ HubError::Render(_)) => {
                self.inner
                    .logger
                    .warn(format!("keeping previous content of {}: {}", path.display(), e));
                None
            }
            Err(e) => return Err(e),
        };
        let watcher = self.start_watch(&path)?;

        let mut store = self.inner.files.lock();
        let Some(entry) = store.get_mut(&path) else {
            return Err(HubError::NotFound(path));
        };
        // Activated concurrently: `watcher` is dropped, one watch remains
        if entry.is_active() {
            return Ok(());
        }
        if let Some((html, modified)) = rendered {
            entry.file.html = html;
            entry.file.last_changed = modified;
        }
        entry.attach(watcher);
        self.broadcast_files(&store);
        Ok(())
    }

    /// Stop watching. Already inactive is a no-op.
    pub fn deactivate(&self, path: &Path) -> Result<(), HubError> {
        let path = normalize_path(path);
        let watcher = {
            let mut store = self.inner.files.lock();
            let Some(entry) = store.get_mut(&path) else {
                return Err(HubError::NotFound(path));
            };
            let Some(watcher) = entry.detach() else {
                return Ok(());
            };
            self.broadcast_files(&store);
            watcher
        };
        watcher.close();
        Ok(())
    }

    /// Stop watching and forget the file.
    pub fn remove_file(&self, path: &Path) -> Result<(), HubError> {
        let path = normalize_path(path);
        let entry = {
            let mut store = self.inner.files.lock();
            let entry = store
                .remove(&path)
                .ok_or_else(|| HubError::NotFound(path.clone()))?;
            self.send(HubMsg::Broadcast(UpdateMessage::removed(&entry.file.path)));
            entry
        };

        self.inner
            .logger
            .info(format!("stopped tracking {}", entry.file.path.display()));
        // Releases the watch, if any
        drop(entry);
        Ok(())
    }

    /// Point-in-time copy of every tracked file, in registration order.
    pub fn list_files(&self) -> Vec<TrackedFile> {
        self.inner.files.lock().snapshot()
    }

    pub fn file_count(&self) -> usize {
        self.inner.files.lock().len()
    }

    // =========================================================================
    // Clients
    // =========================================================================

    /// Register a new client. Its queue starts with the bootstrap messages.
    pub fn on_client_connect(&self) -> Client {
        let id = ClientId(self.inner.next_client.fetch_add(1, Ordering::Relaxed));
        let (queue_tx, queue) = mpsc::channel(self.inner.options.client_queue);
        // If the hub is closed the sender is dropped here and the queue ends at once
        self.send(HubMsg::Register { id, queue: queue_tx });
        Client { id, queue }
    }

    /// Drop a client. Unknown or already removed ids are ignored.
    pub fn on_client_disconnect(&self, id: ClientId) {
        self.send(HubMsg::Unregister(id));
    }

    pub async fn client_count(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(HubMsg::ClientCount(reply));
        rx.await.unwrap_or(0)
    }

    /// [`Hub::client_count`] for callers outside the runtime.
    pub fn client_count_blocking(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        self.send(HubMsg::ClientCount(reply));
        rx.blocking_recv().unwrap_or(0)
    }

    pub fn logger(&self) -> Logger {
        self.inner.logger.clone()
    }

    /// Stop every watch and disconnect every client.
    pub fn close(&self) {
        let watchers = self.inner.files.lock().detach_all();
        crate::debug!("hub"; "closing {} watches", watchers.len());
        drop(watchers);
        self.send(HubMsg::Shutdown);
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Apply a settled change on disk to the stored record.
    ///
    /// A failed render is logged and leaves the record as it was.
    fn apply_change(&self, path: &Path) {
        match self.inner.files.lock().get(path) {
            Some(entry) if entry.is_active() => {}
            _ => return,
        }

        let (html, modified) = match self.render_current(path) {
            Ok(rendered) => rendered,
            Err(e) => {
                self.inner.logger.error(e.to_string());
                return;
            }
        };

        let mut store = self.inner.files.lock();
        let Some(entry) = store.get_mut(path) else {
            crate::debug!("hub"; "dropped render of removed file {}", path.display());
            return;
        };
        if !entry.is_active() {
            crate::debug!("hub"; "dropped render of inactive file {}", path.display());
            return;
        }
        entry.file.html = html;
        entry.file.last_changed = modified;
        self.send(HubMsg::Broadcast(UpdateMessage::update(&entry.file)));
    }

    /// Stat and render `path` as it is on disk now.
    fn render_current(&self, path: &Path) -> Result<(String, SystemTime), HubError> {
        let meta =
            std::fs::metadata(path).map_err(|e| HubError::from_stat(path.to_path_buf(), e))?;
        if !meta.is_file() {
            return Err(HubError::not_a_file(path.to_path_buf()));
        }
        let modified = meta.modified().unwrap_or_else(|_| SystemTime::now());
        let html = self.inner.renderer.render(path)?;
        Ok((html, modified))
    }

    fn start_watch(&self, path: &Path) -> Result<FileWatcher, HubError> {
        FileWatcher::watch(path, self.inner.changes.clone(), &self.inner.runtime).map_err(
            |source| HubError::Watch {
                path: path.to_path_buf(),
                source,
            },
        )
    }

    /// Queue a full file list. Called with the store locked.
    fn broadcast_files(&self, store: &FileStore) {
        let msg = UpdateMessage::files(store.ordered().into_iter().map(|e| &e.file));
        self.send(HubMsg::Broadcast(msg));
    }

    fn send(&self, msg: HubMsg) {
        if self.inner.tx.send(msg).is_err() {
            crate::debug!("hub"; "event loop stopped, message dropped");
        }
    }
}

/// Receive quiescent paths from every watcher and apply them one at a time.
///
/// Holds only a weak reference so dropping the last [`Hub`] ends the loop.
async fn change_loop(hub: Weak<HubInner>, mut rx: mpsc::UnboundedReceiver<PathBuf>) {
    while let Some(path) = rx.recv().await {
        let Some(inner) = hub.upgrade() else { break };
        let hub = Hub { inner };
        if let Err(e) = tokio::task::spawn_blocking(move || hub.apply_change(&path)).await {
            crate::log!("hub"; "change handler failed: {}", e);
        }
    }
    crate::debug!("hub"; "change loop stopped");
}
