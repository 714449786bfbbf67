//! Injected progress reporting.
//!
//! The engine never reads statuses back: reporting is fire-and-forget, and
//! the reporter's lifecycle (creation, rendering, teardown) belongs to the
//! orchestrating caller, not to the engine.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::info;

/// Fire-and-forget status collaborator.
///
/// Implementations must tolerate concurrent, interleaved updates keyed by
/// `(component_id, entity_id)` with last-write-wins semantics.
pub trait StatusReporter: Send + Sync {
    fn report(&self, component_id: &str, entity_id: Option<&str>, message: &str);
}

/// An in-memory [`StatusReporter`] keeping the latest status per
/// (component, entity) pair.
///
/// Suitable both as the backing store for a textual progress display and as
/// a recording reporter in tests.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    statuses: Mutex<HashMap<(String, Option<String>), String>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest status for a (component, entity) pair, if any was reported.
    pub fn status(&self, component_id: &str, entity_id: Option<&str>) -> Option<String> {
        let statuses = self.statuses.lock().unwrap_or_else(|e| e.into_inner());
        statuses
            .get(&(component_id.to_string(), entity_id.map(str::to_string)))
            .cloned()
    }

    /// All current statuses, sorted by component then entity.
    pub fn snapshot(&self) -> Vec<(String, Option<String>, String)> {
        let statuses = self.statuses.lock().unwrap_or_else(|e| e.into_inner());
        let mut entries: Vec<_> = statuses
            .iter()
            .map(|((component, entity), message)| {
                (component.clone(), entity.clone(), message.clone())
            })
            .collect();
        entries.sort();
        entries
    }
}

impl StatusReporter for ProgressTracker {
    fn report(&self, component_id: &str, entity_id: Option<&str>, message: &str) {
        info!(
            component = component_id,
            entity = entity_id.unwrap_or("-"),
            status = message,
            "status update"
        );
        let mut statuses = self.statuses.lock().unwrap_or_else(|e| e.into_inner());
        statuses.insert(
            (component_id.to_string(), entity_id.map(str::to_string)),
            message.to_string(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_write_wins_per_key() {
        let tracker = ProgressTracker::new();
        tracker.report("valuation", Some("AAPL"), "Error - retry 1/3");
        tracker.report("valuation", Some("AAPL"), "Error - retry 2/3");
        assert_eq!(
            tracker.status("valuation", Some("AAPL")),
            Some("Error - retry 2/3".to_string())
        );
    }

    #[test]
    fn keys_are_independent_per_entity() {
        let tracker = ProgressTracker::new();
        tracker.report("valuation", Some("AAPL"), "Done");
        tracker.report("valuation", Some("MSFT"), "Error - retry 1/3");
        tracker.report("valuation", None, "Starting");
        assert_eq!(tracker.snapshot().len(), 3);
        assert_eq!(tracker.status("valuation", Some("AAPL")), Some("Done".into()));
    }
}
