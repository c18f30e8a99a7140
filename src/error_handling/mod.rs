//! Error handling and audit statistics.
//!
//! Failures fall into two groups:
//! - **Terminal** (`AuditError`): configuration, fetch, parse and deadline
//!   failures that end an audit
//! - **Absorbed** (`AnalyzerError`): analyzer failures that degrade one axis
//!   and are reported as issues

mod categorization;
mod stats;
mod types;

pub use categorization::{categorize_reqwest_error, get_retry_strategy};
pub use stats::AuditStats;
pub use types::{
    AnalyzerError, AuditError, AuditEvent, FailureKind, FetchErrorKind, FetchFailure,
    InitializationError, ParseError,
};
