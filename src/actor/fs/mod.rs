//! FileSystem Watcher
//!
//! One [`FileWatcher`] per actively watched file. Each runs its own task:
//!
//! ```text
//! notify --> event channel --> Debouncer (single timer) --> quiescent channel
//! ```
//!
//! - write-class events (data/content changes) reset the debounce timer
//! - remove-class events (delete, rename away) hold firing for [`REATTACH_DELAY_MS`],
//!   re-install the watch on the same path, then reset the timer
//! - notify errors are logged and the loop keeps going
//!
//! When the window elapses with no new events, the watched path is sent on
//! the quiescent channel. Closing (or dropping) the watcher stops the task
//! and releases the OS subscription.

mod debouncer;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use notify::event::ModifyKind;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use debouncer::{Debouncer, REATTACH_DELAY_MS, REATTACH_RETRY_MS};

/// What a raw notify event means for a single watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum EventClass {
    /// Content changed in place
    Write,
    /// File removed or renamed away (atomic save)
    Remove,
    /// Metadata, access, anything else
    Ignore,
}

impl EventClass {
    pub(super) fn of(kind: &EventKind) -> Self {
        match kind {
            EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)) => Self::Remove,
            // Metadata-only changes (mtime/atime/chmod) are noise
            EventKind::Modify(ModifyKind::Metadata(_)) => Self::Ignore,
            EventKind::Modify(_) | EventKind::Create(_) => Self::Write,
            _ => Self::Ignore,
        }
    }
}

/// Handle to a running watch on one file.
///
/// Dropping the handle closes the watch.
pub struct FileWatcher {
    path: PathBuf,
    closed: Arc<AtomicBool>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl FileWatcher {
    /// Install a subscription on `path` and spawn its loop on `runtime`.
    ///
    /// After each burst of events settles, `path` is sent on `quiescent_tx`.
    pub fn watch(
        path: &Path,
        quiescent_tx: mpsc::UnboundedSender<PathBuf>,
        runtime: &Handle,
    ) -> notify::Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        })?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;

        let closed = Arc::new(AtomicBool::new(false));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let watch_loop = WatchLoop {
            path: path.to_path_buf(),
            watcher,
            attached: true,
            reattach_at: None,
            events: event_rx,
            debouncer: Debouncer::new(),
            quiescent_tx,
            closed: Arc::clone(&closed),
            shutdown_rx,
        };
        runtime.spawn(watch_loop.run());

        crate::debug!("watch"; "watching {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            closed,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// The watched path.
    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop the loop and release the subscription.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        crate::debug!("watch"; "closed {}", self.path.display());
    }
}

/// State owned by the background task of one watcher
struct WatchLoop {
    path: PathBuf,
    /// Kept alive here: dropping it releases the OS watch
    watcher: RecommendedWatcher,
    attached: bool,
    /// Set by a remove-class event; firing waits until the watch is back
    reattach_at: Option<Instant>,
    events: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
    debouncer: Debouncer,
    quiescent_tx: mpsc::UnboundedSender<PathBuf>,
    closed: Arc<AtomicBool>,
    shutdown_rx: oneshot::Receiver<()>,
}

impl WatchLoop {
    async fn run(mut self) {
        loop {
            let sleep = self.next_wakeup();
            tokio::select! {
                biased;
                _ = &mut self.shutdown_rx => break,
                event = self.events.recv() => match event {
                    Some(Ok(event)) => self.handle_event(&event),
                    Some(Err(e)) => crate::log!("watch"; "notify error on {}: {}", self.path.display(), e),
                    None => break,
                },
                _ = tokio::time::sleep(sleep) => {
                    self.on_wakeup();
                    if self.reattach_at.is_none() && self.debouncer.take_if_ready() && !self.fire() {
                        break;
                    }
                }
            }
        }
        crate::debug!("watch"; "loop stopped for {}", self.path.display());
    }

    fn next_wakeup(&self) -> Duration {
        let debounce = self.debouncer.sleep_duration();
        match self.reattach_at {
            Some(at) => debounce.min(at.saturating_duration_since(Instant::now())),
            None if !self.attached => debounce.min(Duration::from_millis(REATTACH_RETRY_MS)),
            None => debounce,
        }
    }

    fn handle_event(&mut self, event: &notify::Event) {
        match EventClass::of(&event.kind) {
            EventClass::Write => self.debouncer.trigger(),
            EventClass::Remove => {
                crate::debug!("watch"; "removed, re-attaching: {}", self.path.display());
                self.attached = false;
                self.reattach_at = Some(Instant::now() + Duration::from_millis(REATTACH_DELAY_MS));
            }
            EventClass::Ignore => {}
        }
    }

    /// Re-attach once the post-remove delay has passed, or retry while detached.
    fn on_wakeup(&mut self) {
        match self.reattach_at {
            Some(at) if Instant::now() >= at => {
                self.reattach_at = None;
                self.reattach();
                self.debouncer.trigger();
            }
            Some(_) => {}
            None if !self.attached => self.reattach(),
            None => {}
        }
    }

    /// Re-install the subscription on the same path (replace-on-save).
    fn reattach(&mut self) {
        let _ = self.watcher.unwatch(&self.path);
        match self.watcher.watch(&self.path, RecursiveMode::NonRecursive) {
            Ok(()) => {
                if !self.attached {
                    crate::debug!("watch"; "re-attached watch: {}", self.path.display());
                }
                self.attached = true;
            }
            Err(e) => {
                crate::debug!("watch"; "re-attach failed for {}: {}", self.path.display(), e);
            }
        }
    }

    /// Report quiescence. Returns `false` once nobody is listening.
    fn fire(&self) -> bool {
        if self.closed.load(Ordering::SeqCst) {
            return false;
        }
        self.quiescent_tx.send(self.path.clone()).is_ok()
    }
}
