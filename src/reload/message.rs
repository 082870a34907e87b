//! Live Update Message Protocol
//!
//! JSON messages pushed over the websocket to browser clients.
//!
//! # Message Types
//!
//! - `files`: full file list (bootstrap, and after add/activate/deactivate)
//! - `update`: one file re-rendered after a change on disk
//! - `removed`: one file dropped from the hub
//! - `log`: a single log entry
//! - `logs`: full log replay (bootstrap)
//!
//! A new client gets `files` followed by `logs`, then only deltas.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::actor::hub::TrackedFile;

/// Message sent to clients over the websocket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum UpdateMessage {
    /// Every tracked file, in registration order
    Files { files: Vec<FileView> },

    /// Current full state of one file
    Update { file: FileView },

    /// A file is no longer tracked
    Removed { path: String },

    /// One log entry
    Log { entry: LogEntry },

    /// Every buffered log entry, oldest first
    Logs { entries: Vec<LogEntry> },
}

impl UpdateMessage {
    /// Build a full file list message
    pub fn files<'a>(files: impl IntoIterator<Item = &'a TrackedFile>) -> Self {
        Self::Files {
            files: files.into_iter().map(FileView::from).collect(),
        }
    }

    /// Build a single-file update message
    pub fn update(file: &TrackedFile) -> Self {
        Self::Update {
            file: FileView::from(file),
        }
    }

    /// Build a removal message
    pub fn removed(path: &std::path::Path) -> Self {
        Self::Removed {
            path: path.to_string_lossy().into_owned(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"files","files":[]}"#.to_string())
    }

    /// Parse from JSON string
    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

/// Wire form of a tracked file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub path: String,
    pub name: String,
    /// Milliseconds since the Unix epoch
    pub tracked_at: u64,
    /// Milliseconds since the Unix epoch
    pub last_changed: u64,
    pub html: String,
    pub active: bool,
}

impl From<&TrackedFile> for FileView {
    fn from(file: &TrackedFile) -> Self {
        Self {
            path: file.path.to_string_lossy().into_owned(),
            name: file.name.clone(),
            tracked_at: unix_millis(file.tracked_at),
            last_changed: unix_millis(file.last_changed),
            html: file.html.clone(),
            active: file.active,
        }
    }
}

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// One log line shown in the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub time: u64,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            time: unix_millis(SystemTime::now()),
        }
    }
}

/// Milliseconds since the Unix epoch, saturating at zero for older times.
pub fn unix_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
