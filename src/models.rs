//! Value objects produced by an audit.
//!
//! Everything in here is plain data: created fresh per audit, never mutated
//! after it is handed back to the caller, and serializable so report layers
//! can render it without triggering re-computation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;

use crate::error_handling::{AuditError, FailureKind};

/// One audit dimension.
///
/// Declaration order is the canonical axis order used when merging issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Performance,
    Seo,
    Accessibility,
    Security,
    Mobile,
    Fraud,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Performance => "performance",
            Axis::Seo => "seo",
            Axis::Accessibility => "accessibility",
            Axis::Security => "security",
            Axis::Mobile => "mobile",
            Axis::Fraud => "fraud",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue severity. Only `Medium` and `High` issues become recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

/// Distinguishes real findings from the synthetic issue recorded when an
/// analyzer could not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    #[default]
    Finding,
    AnalyzerFailure,
}

/// A single actionable problem found on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub axis: Axis,
    pub severity: Severity,
    #[serde(default)]
    pub kind: IssueKind,
    pub message: String,
    pub recommendation: String,
}

impl Issue {
    pub fn new(
        axis: Axis,
        severity: Severity,
        message: impl Into<String>,
        recommendation: impl Into<String>,
    ) -> Self {
        Self {
            axis,
            severity,
            kind: IssueKind::Finding,
            message: message.into(),
            recommendation: recommendation.into(),
        }
    }

    /// The synthetic issue that stands in for an analyzer that failed.
    pub fn analyzer_failure(axis: Axis, reason: &str) -> Self {
        Self {
            axis,
            severity: Severity::Low,
            kind: IssueKind::AnalyzerFailure,
            message: format!("{axis} analysis could not be completed: {reason}"),
            recommendation: format!("Re-run the audit; {axis} results are incomplete"),
        }
    }

    pub fn is_analyzer_failure(&self) -> bool {
        self.kind == IssueKind::AnalyzerFailure
    }
}

/// A metric value: counts, ratios, flags or labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Int(v) => Some(*v as f64),
            MetricValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetricValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for MetricValue {
    fn from(v: bool) -> Self {
        MetricValue::Bool(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<usize> for MetricValue {
    fn from(v: usize) -> Self {
        MetricValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<u16> for MetricValue {
    fn from(v: u16) -> Self {
        MetricValue::Int(i64::from(v))
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// Metric mapping, kept sorted by key so reports are deterministic.
pub type Metrics = BTreeMap<String, MetricValue>;

/// One analyzer's verdict for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisResult {
    pub axis: Axis,
    /// Always within `[0, 100]`.
    pub score: f64,
    pub issues: Vec<Issue>,
    pub metrics: Metrics,
    /// Set when the analyzer failed and `score` is the neutral fallback.
    #[serde(default)]
    pub degraded: bool,
}

/// Banded fraud risk derived from the fraud score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Low >= 80, Medium 50..80, High < 50.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            RiskLevel::Low
        } else if score >= 50.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state reported on a returned result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditStatus {
    Completed,
    Failed,
}

/// The outcome of one top-level audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    /// The seed URL as requested.
    pub url: String,
    /// The seed URL after redirects.
    pub final_url: String,
    pub timestamp: DateTime<Utc>,
    pub status: AuditStatus,
    pub overall_score: f64,
    /// Scores of the enabled axes only.
    pub scores: BTreeMap<Axis, f64>,
    /// Same value as `scores[Fraud]`, kept separate for older report consumers.
    pub fraud_score: Option<f64>,
    pub fraud_risk_level: Option<RiskLevel>,
    /// Axis order, then discovery order.
    pub issues: Vec<Issue>,
    pub metrics: Metrics,
    pub recommendations: Vec<String>,
    pub pages_audited: usize,
}

impl AuditResult {
    pub fn score(&self, axis: Axis) -> Option<f64> {
        self.scores.get(&axis).copied()
    }

    pub fn issues_for(&self, axis: Axis) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.axis == axis)
    }
}

/// Serializable description of why an audit failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&AuditError> for AuditFailure {
    fn from(err: &AuditError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Per-URL outcome inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum BatchOutcome {
    Completed(Box<AuditResult>),
    Failed(AuditFailure),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub url: String,
    pub outcome: BatchOutcome,
}

impl BatchEntry {
    pub fn result(&self) -> Option<&AuditResult> {
        match &self.outcome {
            BatchOutcome::Completed(result) => Some(result),
            BatchOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&AuditFailure> {
        match &self.outcome {
            BatchOutcome::Completed(_) => None,
            BatchOutcome::Failed(failure) => Some(failure),
        }
    }
}

/// Batch outcome, in request order, one entry per requested URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub entries: Vec<BatchEntry>,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchEntry> {
        self.entries.iter()
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result().is_some()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_axis_order_is_declaration_order() {
        let axes: Vec<Axis> = Axis::iter().collect();
        assert_eq!(axes.first(), Some(&Axis::Performance));
        assert_eq!(axes.last(), Some(&Axis::Fraud));
        assert!(Axis::Seo < Axis::Security);
    }

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(79.9), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::High);
    }

    #[test]
    fn test_analyzer_failure_issue_is_marked() {
        let issue = Issue::analyzer_failure(Axis::Security, "bad url");
        assert!(issue.is_analyzer_failure());
        assert_eq!(issue.axis, Axis::Security);
        assert!(issue.message.contains("security"));
        assert!(issue.message.contains("bad url"));
    }

    #[test]
    fn test_metric_value_serializes_untagged() {
        let mut metrics = Metrics::new();
        metrics.insert("count".into(), 3usize.into());
        metrics.insert("label".into(), "Low".into());
        metrics.insert("ratio".into(), 0.5.into());
        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(json, r#"{"count":3,"label":"Low","ratio":0.5}"#);
    }

    #[test]
    fn test_axis_serializes_as_map_key() {
        let mut scores = BTreeMap::new();
        scores.insert(Axis::Seo, 90.0);
        let json = serde_json::to_string(&scores).unwrap();
        assert_eq!(json, r#"{"seo":90.0}"#);
    }

    #[test]
    fn test_batch_entry_accessors() {
        let entry = BatchEntry {
            url: "https://example.com".into(),
            outcome: BatchOutcome::Failed(AuditFailure {
                kind: FailureKind::Timeout,
                message: "timed out".into(),
            }),
        };
        assert!(entry.result().is_none());
        assert_eq!(entry.failure().map(|f| f.kind), Some(FailureKind::Timeout));

        let batch = BatchResult {
            entries: vec![entry],
        };
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.succeeded(), 0);
        assert_eq!(batch.failed(), 1);
    }
}
