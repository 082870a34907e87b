use std::path::PathBuf;
use std::time::Duration;

use notify::EventKind;
use notify::event::{
    AccessKind, AccessMode, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind,
    RenameMode,
};
use tempfile::TempDir;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use super::debouncer::{DEBOUNCE_MS, Debouncer};
use super::{EventClass, FileWatcher};

fn modify_kind() -> EventKind {
    EventKind::Modify(ModifyKind::Data(DataChange::Any))
}

fn write_file(temp: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = temp.path().join(name);
    std::fs::write(&path, content).unwrap();
    crate::utils::path::normalize_path(&path)
}

/// Count quiescent firings that arrive within `wait`.
async fn count_firings(rx: &mut mpsc::UnboundedReceiver<PathBuf>, wait: Duration) -> usize {
    let mut count = 0;
    let deadline = tokio::time::Instant::now() + wait;
    while let Ok(Some(_)) = tokio::time::timeout_at(deadline, rx.recv()).await {
        count += 1;
    }
    count
}

// ----------------------------------------------------------------------------
// Debouncer
// ----------------------------------------------------------------------------

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new();
    assert!(!debouncer.is_pending());
    assert!(!debouncer.is_ready());
    assert!(debouncer.sleep_duration() > Duration::from_secs(60));
}

#[test]
fn test_debouncer_waits_for_window() {
    let mut debouncer = Debouncer::new();
    debouncer.trigger();

    assert!(debouncer.is_pending());
    assert!(!debouncer.take_if_ready());
    assert!(debouncer.sleep_duration() <= Duration::from_millis(DEBOUNCE_MS));
}

#[test]
fn test_debouncer_fires_once() {
    let mut debouncer = Debouncer::with_window(Duration::from_millis(5));
    debouncer.trigger();
    std::thread::sleep(Duration::from_millis(10));

    assert!(debouncer.take_if_ready());
    assert!(!debouncer.take_if_ready());
    assert!(!debouncer.is_pending());
}

#[test]
fn test_debouncer_trigger_resets_timer() {
    let mut debouncer = Debouncer::with_window(Duration::from_millis(40));
    debouncer.trigger();
    std::thread::sleep(Duration::from_millis(25));
    debouncer.trigger();
    std::thread::sleep(Duration::from_millis(25));

    // 50ms since the first trigger, but only 25ms since the last one
    assert!(!debouncer.is_ready());
}

// ----------------------------------------------------------------------------
// Event classification
// ----------------------------------------------------------------------------

#[test]
fn test_event_class() {
    assert_eq!(EventClass::of(&modify_kind()), EventClass::Write);
    assert_eq!(
        EventClass::of(&EventKind::Create(CreateKind::File)),
        EventClass::Write
    );
    assert_eq!(
        EventClass::of(&EventKind::Remove(RemoveKind::File)),
        EventClass::Remove
    );
    assert_eq!(
        EventClass::of(&EventKind::Modify(ModifyKind::Name(RenameMode::From))),
        EventClass::Remove
    );
    assert_eq!(
        EventClass::of(&EventKind::Modify(ModifyKind::Metadata(
            MetadataKind::WriteTime
        ))),
        EventClass::Ignore
    );
    assert_eq!(
        EventClass::of(&EventKind::Access(AccessKind::Close(AccessMode::Write))),
        EventClass::Ignore
    );
}

// ----------------------------------------------------------------------------
// Live watcher
// ----------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_burst_of_writes_fires_once() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "notes.md", "v0");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let watcher = FileWatcher::watch(&path, tx, &Handle::current()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    for i in 1..=5 {
        std::fs::write(&path, format!("v{i}")).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(count_firings(&mut rx, Duration::from_millis(800)).await, 1);
    drop(watcher);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_separate_bursts_fire_separately() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "notes.md", "v0");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _watcher = FileWatcher::watch(&path, tx, &Handle::current()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    std::fs::write(&path, "first").unwrap();
    assert_eq!(count_firings(&mut rx, Duration::from_millis(500)).await, 1);

    std::fs::write(&path, "second").unwrap();
    assert_eq!(count_firings(&mut rx, Duration::from_millis(500)).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fires_with_watched_path() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "main.rs", "fn main() {}");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let watcher = FileWatcher::watch(&path, tx, &Handle::current()).unwrap();
    assert_eq!(watcher.path(), path.as_path());
    tokio::time::sleep(Duration::from_millis(50)).await;

    std::fs::write(&path, "fn main() { println!(); }").unwrap();
    let fired = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap();
    assert_eq!(fired, Some(path));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_replace_on_save_keeps_watching() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "notes.md", "v0");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let _watcher = FileWatcher::watch(&path, tx, &Handle::current()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Editor-style atomic save: write a sibling, rename it over the original
    let tmp = temp.path().join("notes.md.tmp");
    std::fs::write(&tmp, "v1").unwrap();
    std::fs::rename(&tmp, &path).unwrap();
    assert!(count_firings(&mut rx, Duration::from_millis(800)).await >= 1);

    // The re-installed watch sees later in-place writes
    std::fs::write(&path, "v2").unwrap();
    assert_eq!(count_firings(&mut rx, Duration::from_millis(800)).await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_firing_after_close() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "notes.md", "v0");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let watcher = FileWatcher::watch(&path, tx, &Handle::current()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    std::fs::write(&path, "v1").unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    watcher.close();

    assert_eq!(count_firings(&mut rx, Duration::from_millis(400)).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_close_during_reattach_delay_stops_promptly() {
    let temp = TempDir::new().unwrap();
    let path = write_file(&temp, "notes.md", "v0");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let watcher = FileWatcher::watch(&path, tx, &Handle::current()).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    std::fs::remove_file(&path).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    watcher.close();

    // The loop drops its sender on exit, well before the re-attach delay
    let ended = tokio::time::timeout(Duration::from_millis(50), rx.recv()).await;
    assert_eq!(ended, Ok(None));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_watch_missing_file_fails() {
    let temp = TempDir::new().unwrap();
    let (tx, _rx) = mpsc::unbounded_channel();

    let result = FileWatcher::watch(&temp.path().join("gone.md"), tx, &Handle::current());
    assert!(result.is_err());
}
