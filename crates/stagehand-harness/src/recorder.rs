//! Ordered event recording.
//!
//! Every simulated collaborator appends to one shared [`EventLog`]; tests
//! assert on the relative order of entries to verify lifecycle
//! interleavings. Orchestration is single-threaded cooperative, so the log
//! order is the exact suspension-point order the orchestrator produced.

use std::sync::Arc;

use parking_lot::Mutex;
use stagehand_core::hooks::HookFn;

/// A shared, ordered log of lifecycle events.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    /// An empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    /// All events recorded so far, in order.
    #[must_use]
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    /// Whether `event` has been recorded.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.events.lock().iter().any(|e| e == event)
    }

    /// Position of the first occurrence of `event`.
    #[must_use]
    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.lock().iter().position(|e| e == event)
    }

    /// Assert that `earlier` was recorded before `later`.
    ///
    /// # Panics
    ///
    /// Panics with the full log when either event is missing or the order
    /// is violated.
    #[allow(clippy::panic, clippy::expect_used)]
    pub fn assert_order(&self, earlier: &str, later: &str) {
        let events = self.events();
        let first = events
            .iter()
            .position(|e| e == earlier)
            .unwrap_or_else(|| panic!("`{earlier}` never recorded; log: {events:?}"));
        let second = events
            .iter()
            .position(|e| e == later)
            .unwrap_or_else(|| panic!("`{later}` never recorded; log: {events:?}"));
        assert!(first < second, "`{earlier}` did not precede `{later}`; log: {events:?}");
    }
}

/// A hook that records `label:{app}` when it runs.
#[must_use]
pub fn log_hook(log: &EventLog, label: &str) -> HookFn {
    let log = log.clone();
    let label = label.to_owned();
    Arc::new(move |app| {
        let log = log.clone();
        let label = label.clone();
        Box::pin(async move {
            log.record(format!("{label}:{}", app.name));
            Ok(())
        })
    })
}
