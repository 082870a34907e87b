//! Log sink shared with the browser.
//!
//! [`Logger`] echoes to the terminal and forwards each entry to the hub's
//! event loop, which keeps the last `capacity` entries in a [`LogBuffer`]
//! for replay to new clients.

use std::collections::VecDeque;

use tokio::sync::mpsc;

use crate::actor::messages::HubMsg;
use crate::reload::message::{LogEntry, LogLevel};

/// Bounded ring of log entries, oldest evicted first.
#[derive(Debug)]
pub(super) struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Buffered entries, oldest first.
    pub fn replay(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

/// Cloneable handle for writing hub log entries.
#[derive(Debug, Clone)]
pub struct Logger {
    tx: mpsc::UnboundedSender<HubMsg>,
}

impl Logger {
    pub(super) fn new(tx: mpsc::UnboundedSender<HubMsg>) -> Self {
        Self { tx }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(LogLevel::Info, message.into());
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.emit(LogLevel::Warn, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(LogLevel::Error, message.into());
    }

    fn emit(&self, level: LogLevel, message: String) {
        let module = match level {
            LogLevel::Info => "hub",
            _ => level.label(),
        };
        crate::log!(module; "{}", message);
        // Hub already closed: terminal output is all that is left
        let _ = self.tx.send(HubMsg::Log(LogEntry::new(level, message)));
    }
}
