use std::time::{Duration, Instant};

/// Quiescence window after the last event before the watcher fires.
pub(super) const DEBOUNCE_MS: u64 = 100;

/// Delay before re-installing a watch after the file was removed.
pub(super) const REATTACH_DELAY_MS: u64 = 100;

/// Retry interval while the watch is detached.
pub(super) const REATTACH_RETRY_MS: u64 = 250;

/// Idle sleep when nothing is pending.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// Single-timer debouncer.
///
/// Every trigger pushes the deadline back; only one firing is ever pending.
pub(super) struct Debouncer {
    window: Duration,
    pub(super) last_event: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self::with_window(Duration::from_millis(DEBOUNCE_MS))
    }

    pub(super) fn with_window(window: Duration) -> Self {
        Self {
            window,
            last_event: None,
        }
    }

    /// Record an event, resetting the pending timer.
    pub(super) fn trigger(&mut self) {
        self.last_event = Some(Instant::now());
    }

    #[cfg(test)]
    pub(super) fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }

    pub(super) fn is_ready(&self) -> bool {
        self.last_event
            .is_some_and(|last| last.elapsed() >= self.window)
    }

    /// Consume the pending firing if the window has elapsed.
    pub(super) fn take_if_ready(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.last_event = None;
        true
    }

    /// Precise sleep duration until the pending firing.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event else {
            return IDLE_SLEEP;
        };

        self.window
            .saturating_sub(last_event.elapsed())
            .max(Duration::from_millis(1))
    }
}
