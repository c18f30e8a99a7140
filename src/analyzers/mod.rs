//! Per-axis page analyzers.
//!
//! The set of analyzers is closed: one unit struct per `Axis`, all behind the
//! `Analyzer` trait and looked up through `analyzer_for`. Analyzers are pure
//! functions of the document, the fetch and the config, so the orchestrator
//! can run every enabled axis of a page at the same time.
//!
//! An analyzer that returns an error never fails the audit. `run_analyzer`
//! turns the error into a degraded result: one synthetic low-severity issue
//! and the neutral score.

mod accessibility;
mod css;
mod fraud;
mod mobile;
mod performance;
mod security;
mod seo;

use crate::config::{AuditConfig, MAX_SCORE, MIN_SCORE, NEUTRAL_SCORE};
use crate::error_handling::AnalyzerError;
use crate::fetch::FetchResult;
use crate::models::{Axis, AxisResult, Issue, MetricValue, Metrics, Severity};
use crate::parse::Document;

pub use accessibility::AccessibilityAnalyzer;
pub use fraud::FraudAnalyzer;
pub use mobile::MobileAnalyzer;
pub use performance::PerformanceAnalyzer;
pub use security::SecurityAnalyzer;
pub use seo::SeoAnalyzer;

/// One audit axis.
///
/// Implementations must not keep state between calls and must not depend on
/// the output of any other analyzer.
pub trait Analyzer: Send + Sync {
    fn axis(&self) -> Axis;

    /// Scores one page.
    ///
    /// # Errors
    ///
    /// Returns `AnalyzerError` when the page cannot be analyzed on this axis.
    /// The caller downgrades it; it is never propagated out of an audit.
    fn analyze(
        &self,
        doc: &Document,
        fetch: &FetchResult,
        config: &AuditConfig,
    ) -> Result<AxisResult, AnalyzerError>;
}

static PERFORMANCE: PerformanceAnalyzer = PerformanceAnalyzer;
static SEO: SeoAnalyzer = SeoAnalyzer;
static ACCESSIBILITY: AccessibilityAnalyzer = AccessibilityAnalyzer;
static SECURITY: SecurityAnalyzer = SecurityAnalyzer;
static MOBILE: MobileAnalyzer = MobileAnalyzer;
static FRAUD: FraudAnalyzer = FraudAnalyzer;

/// The registered analyzer of `axis`.
pub fn analyzer_for(axis: Axis) -> &'static dyn Analyzer {
    match axis {
        Axis::Performance => &PERFORMANCE,
        Axis::Seo => &SEO,
        Axis::Accessibility => &ACCESSIBILITY,
        Axis::Security => &SECURITY,
        Axis::Mobile => &MOBILE,
        Axis::Fraud => &FRAUD,
    }
}

/// Runs the analyzer of `axis`, absorbing its failure into a degraded result.
pub fn run_analyzer(
    axis: Axis,
    doc: &Document,
    fetch: &FetchResult,
    config: &AuditConfig,
) -> AxisResult {
    match analyzer_for(axis).analyze(doc, fetch, config) {
        Ok(mut result) => {
            result.score = clamp_score(result.score);
            result
        }
        Err(e) => {
            log::warn!("{} analyzer failed on {}: {}", axis, fetch.final_url, e);
            degraded(axis, &e.to_string())
        }
    }
}

/// Neutral stand-in for an analyzer that could not finish.
pub fn degraded(axis: Axis, reason: &str) -> AxisResult {
    AxisResult {
        axis,
        score: NEUTRAL_SCORE,
        issues: vec![Issue::analyzer_failure(axis, reason)],
        metrics: Metrics::new(),
        degraded: true,
    }
}

/// Clamps to `[0, 100]`; NaN scores as 0.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        MIN_SCORE
    } else {
        score.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// Penalty accumulator shared by the analyzers.
///
/// Every flagged issue subtracts its penalty from a starting score of 100.
pub(crate) struct Findings {
    axis: Axis,
    penalty: f64,
    issues: Vec<Issue>,
    metrics: Metrics,
}

impl Findings {
    pub fn new(axis: Axis) -> Self {
        Self {
            axis,
            penalty: 0.0,
            issues: Vec::new(),
            metrics: Metrics::new(),
        }
    }

    pub fn flag(
        &mut self,
        severity: Severity,
        penalty: f64,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) {
        self.penalty += penalty.max(0.0);
        self.issues
            .push(Issue::new(self.axis, severity, message, recommendation));
    }

    pub fn metric(&mut self, key: &str, value: impl Into<MetricValue>) {
        self.metrics.insert(key.to_string(), value.into());
    }

    pub fn score(&self) -> f64 {
        clamp_score(MAX_SCORE - self.penalty)
    }

    pub fn finish(self) -> AxisResult {
        let score = self.score();
        AxisResult {
            axis: self.axis,
            score,
            issues: self.issues,
            metrics: self.metrics,
            degraded: false,
        }
    }
}

/// Rounds to two decimals for human-facing metrics.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
