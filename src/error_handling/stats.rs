//! Audit statistics tracking.
//!
//! Counters are shared across concurrent audits through an `Arc` held by the
//! auditor and reported once a run finishes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::{AuditEvent, FetchErrorKind};

/// Thread-safe audit statistics tracker.
///
/// Every `AuditEvent` and `FetchErrorKind` gets an atomic counter at
/// construction, so increments never allocate or lock.
pub struct AuditStats {
    events: HashMap<AuditEvent, AtomicUsize>,
    fetch_errors: HashMap<FetchErrorKind, AtomicUsize>,
}

impl AuditStats {
    pub fn new() -> Self {
        let mut events = HashMap::new();
        for event in AuditEvent::iter() {
            events.insert(event, AtomicUsize::new(0));
        }

        let mut fetch_errors = HashMap::new();
        for kind in FetchErrorKind::iter() {
            fetch_errors.insert(kind, AtomicUsize::new(0));
        }

        AuditStats {
            events,
            fetch_errors,
        }
    }

    pub fn increment(&self, event: AuditEvent) {
        if let Some(counter) = self.events.get(&event) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment counter for {:?} which is not in the map",
                event
            );
        }
    }

    pub fn increment_fetch_error(&self, kind: FetchErrorKind) {
        if let Some(counter) = self.fetch_errors.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment fetch error counter for {:?} which is not in the map",
                kind
            );
        }
    }

    pub fn get_count(&self, event: AuditEvent) -> usize {
        self.events
            .get(&event)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn get_fetch_error_count(&self, kind: FetchErrorKind) -> usize {
        self.fetch_errors
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_fetch_errors(&self) -> usize {
        FetchErrorKind::iter()
            .map(|k| self.get_fetch_error_count(k))
            .sum()
    }

    /// Logs every non-zero counter at info level.
    pub fn log_summary(&self) {
        for event in AuditEvent::iter() {
            let count = self.get_count(event);
            if count > 0 {
                log::info!("{}: {}", event.as_str(), count);
            }
        }
        for kind in FetchErrorKind::iter() {
            let count = self.get_fetch_error_count(kind);
            if count > 0 {
                log::info!("fetch errors ({}): {}", kind, count);
            }
        }
    }
}

impl Default for AuditStats {
    fn default() -> Self {
        Self::new()
    }
}
