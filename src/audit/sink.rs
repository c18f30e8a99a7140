//! Result sinks: where finished audits are handed for safekeeping.
//!
//! The auditor itself keeps nothing between calls. A caller that tracks jobs
//! (an API layer, a CLI writing reports) passes a sink in and reads results
//! back from its own store.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error_handling::AuditError;
use crate::models::AuditResult;

/// Receives every top-level audit outcome, successful or not.
pub trait ResultSink: Send + Sync {
    fn record(&self, url: &str, outcome: &Result<AuditResult, AuditError>);
}

/// In-memory sink keyed by requested URL. A later audit of the same URL
/// replaces the earlier outcome.
#[derive(Debug, Default)]
pub struct MemorySink {
    outcomes: Mutex<HashMap<String, Result<AuditResult, AuditError>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Result<AuditResult, AuditError>> {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recorded URLs, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        urls.sort();
        urls
    }
}

impl ResultSink for MemorySink {
    fn record(&self, url: &str, outcome: &Result<AuditResult, AuditError>) {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), outcome.clone());
    }
}
