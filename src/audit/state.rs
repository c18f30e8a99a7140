//! Per-audit state machine.

use std::fmt;

/// Lifecycle of one audit.
///
/// `Pending → Fetching → Parsing → Analyzing → Aggregating → Completed`.
/// `Failed` is reachable from every non-terminal state: fetch errors fail in
/// `Fetching`, an unusable body in `Parsing`, an expired deadline anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditState {
    Pending,
    Fetching,
    Parsing,
    Analyzing,
    Aggregating,
    Completed,
    Failed,
}

impl AuditState {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditState::Pending => "pending",
            AuditState::Fetching => "fetching",
            AuditState::Parsing => "parsing",
            AuditState::Analyzing => "analyzing",
            AuditState::Aggregating => "aggregating",
            AuditState::Completed => "completed",
            AuditState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AuditState::Completed | AuditState::Failed)
    }

    pub fn can_advance_to(&self, next: AuditState) -> bool {
        use AuditState::*;
        match (self, next) {
            (Pending, Fetching)
            | (Fetching, Parsing)
            | (Parsing, Analyzing)
            | (Analyzing, Aggregating)
            | (Aggregating, Completed) => true,
            (current, Failed) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for AuditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the state of one audit and logs each transition.
#[derive(Debug)]
pub(crate) struct AuditTracker {
    url: String,
    state: AuditState,
}

impl AuditTracker {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            state: AuditState::Pending,
        }
    }

    pub fn state(&self) -> AuditState {
        self.state
    }

    /// Moves to `next`. An invalid transition is a bug: it is logged, asserted
    /// in debug builds and otherwise ignored.
    pub fn advance(&mut self, next: AuditState) {
        if !self.state.can_advance_to(next) {
            log::error!(
                "Invalid audit transition for {}: {} -> {}",
                self.url,
                self.state,
                next
            );
            debug_assert!(false, "invalid audit transition {} -> {}", self.state, next);
            return;
        }
        log::debug!("Audit {}: {} -> {}", self.url, self.state, next);
        self.state = next;
    }

    pub fn fail(&mut self) {
        self.advance(AuditState::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut tracker = AuditTracker::new("https://example.com");
        for next in [
            AuditState::Fetching,
            AuditState::Parsing,
            AuditState::Analyzing,
            AuditState::Aggregating,
            AuditState::Completed,
        ] {
            tracker.advance(next);
            assert_eq!(tracker.state(), next);
        }
        assert!(tracker.state().is_terminal());
    }

    #[test]
    fn test_failed_reachable_from_active_states() {
        for state in [
            AuditState::Pending,
            AuditState::Fetching,
            AuditState::Parsing,
            AuditState::Analyzing,
            AuditState::Aggregating,
        ] {
            assert!(state.can_advance_to(AuditState::Failed), "{state}");
        }
        assert!(!AuditState::Completed.can_advance_to(AuditState::Failed));
        assert!(!AuditState::Failed.can_advance_to(AuditState::Failed));
    }

    #[test]
    fn test_no_skipping_states() {
        assert!(!AuditState::Pending.can_advance_to(AuditState::Parsing));
        assert!(!AuditState::Fetching.can_advance_to(AuditState::Completed));
        assert!(!AuditState::Completed.can_advance_to(AuditState::Pending));
    }
}
