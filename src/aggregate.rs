//! Combines per-axis results into one page verdict.

use std::collections::{BTreeMap, HashSet};

use crate::analyzers::clamp_score;
use crate::models::{Axis, AxisResult, Issue, Metrics, Severity};

/// Output of `aggregate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    /// Mean score of the axes that were analyzed.
    pub overall_score: f64,
    pub scores: BTreeMap<Axis, f64>,
    /// Axis order, then discovery order.
    pub issues: Vec<Issue>,
    pub metrics: Metrics,
    /// One per high/medium issue, deduplicated, first-seen order.
    pub recommendations: Vec<String>,
}

/// Aggregates the results of the enabled axes of one page.
///
/// Only axes present in `results` take part in the average; a disabled axis
/// is simply absent, never a zero. Metric keys are merged first-writer-wins:
/// a key already written by an earlier axis is stored as `"<axis>.<key>"`.
/// An empty input scores 0.
pub fn aggregate(results: &[AxisResult]) -> Aggregate {
    let mut ordered: Vec<&AxisResult> = results.iter().collect();
    ordered.sort_by_key(|r| r.axis);

    let scores: BTreeMap<Axis, f64> = ordered
        .iter()
        .map(|r| (r.axis, clamp_score(r.score)))
        .collect();
    let overall_score = if scores.is_empty() {
        0.0
    } else {
        clamp_score(scores.values().sum::<f64>() / scores.len() as f64)
    };

    let issues: Vec<Issue> = ordered
        .iter()
        .flat_map(|r| r.issues.iter().cloned())
        .collect();

    let mut metrics = Metrics::new();
    for result in &ordered {
        for (key, value) in &result.metrics {
            if metrics.contains_key(key) {
                log::debug!("Metric '{}' already set; namespacing under {}", key, result.axis);
                metrics.insert(format!("{}.{}", result.axis, key), value.clone());
            } else {
                metrics.insert(key.clone(), value.clone());
            }
        }
    }

    let mut seen = HashSet::new();
    let recommendations = issues
        .iter()
        .filter(|issue| issue.severity >= Severity::Medium)
        .filter(|issue| seen.insert(issue.recommendation.as_str()))
        .map(|issue| issue.recommendation.clone())
        .collect();

    Aggregate {
        overall_score,
        scores,
        issues,
        metrics,
        recommendations,
    }
}
