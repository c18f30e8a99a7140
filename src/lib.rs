//! web_quality_audit library: multi-axis quality and risk audits of web pages
//!
//! One audit fetches a seed URL, parses it once into an immutable document,
//! runs up to six independent analyzers (performance, SEO, accessibility,
//! security, mobile, fraud) concurrently over it, and aggregates their
//! scores, issues and metrics into an `AuditResult`. Internal pages beyond the
//! seed contribute `crawl_*` metrics.
//!
//! # Example
//!
//! ```no_run
//! use web_quality_audit::{AuditConfig, Auditor, AuditorOptions};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let auditor = Auditor::new(AuditorOptions {
//!     max_concurrency: 4,
//!     ..Default::default()
//! })?;
//!
//! let urls = vec!["https://example.com".to_string(), "https://example.org".to_string()];
//! let batch = auditor.run_batch(&urls, &AuditConfig::default()).await;
//! println!("{} audited, {} failed", batch.succeeded(), batch.failed());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Analyzers run on spawned tasks, so
//! audits must be driven from within a runtime context.

mod aggregate;
pub mod analyzers;
mod audit;
pub mod config;
mod domain;
mod error_handling;
mod fetch;
pub mod initialization;
mod models;
mod parse;
mod utils;

// Re-export public API
pub use aggregate::{aggregate, Aggregate};
pub use audit::{
    run_audit, run_batch, Admission, AdmissionGate, AuditState, Auditor, MemorySink, ResultSink,
};
pub use config::{
    AuditConfig, AuditorOptions, AxisToggles, BrandProfile, FraudConfig, LogFormat, LogLevel,
};
pub use domain::{extract_domain, same_host};
pub use error_handling::{
    AnalyzerError, AuditError, AuditEvent, AuditStats, FailureKind, FetchErrorKind, FetchFailure,
    InitializationError, ParseError,
};
pub use fetch::{FetchOptions, FetchResult, Fetcher, Headers, HttpFetcher};
pub use models::{
    AuditFailure, AuditResult, AuditStatus, Axis, AxisResult, BatchEntry, BatchOutcome,
    BatchResult, Issue, IssueKind, MetricValue, Metrics, RiskLevel, Severity,
};
pub use parse::{
    parse, Document, Element, FormControl, Heading, Image, Link, LinkKind, Meta, Script,
    Stylesheet,
};
pub use utils::{normalize_batch_urls, validate_and_normalize_url};
