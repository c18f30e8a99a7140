//! Audit orchestration.
//!
//! An `Auditor` owns the pieces shared by every audit it runs: the fetcher
//! (and with it the HTTP connection pool), the admission gate and the
//! statistics counters. Everything else (config, fetch, document, results)
//! is created per audit and never shared between audits.
//!
//! One audit:
//! 1. validates its config, then waits for admission
//! 2. fetches the seed URL, retrying transient failures
//! 3. parses the body once into a `Document`
//! 4. runs every enabled analyzer on its own task and waits for all of them
//! 5. crawls internal pages for `crawl_*` metrics
//! 6. aggregates the seed page's results
//!
//! The deadline (`AuditConfig::timeout`) starts at admission.

mod crawl;
mod gate;
mod retry;
mod sink;
mod state;

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

use crate::aggregate::aggregate;
use crate::analyzers::{degraded, run_analyzer};
use crate::config::{AuditConfig, AuditorOptions};
use crate::error_handling::{
    AnalyzerError, AuditError, AuditEvent, AuditStats, FetchErrorKind, InitializationError,
};
use crate::fetch::{deadline_after, FetchResult, Fetcher, HttpFetcher};
use crate::models::{
    AuditFailure, AuditResult, AuditStatus, Axis, AxisResult, BatchEntry, BatchOutcome,
    BatchResult, RiskLevel,
};
use crate::parse::{parse, Document};

use crawl::{crawl, CrawlSummary};
use retry::fetch_with_retry;
use state::AuditTracker;

pub use gate::{Admission, AdmissionGate};
pub use sink::{MemorySink, ResultSink};
pub use state::AuditState;

/// Runs audits against one fetcher under one admission gate.
///
/// # Examples
///
/// ```no_run
/// use web_quality_audit::{AuditConfig, Auditor, AuditorOptions};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let auditor = Auditor::new(AuditorOptions::default())?;
/// let result = auditor.run_audit(AuditConfig::new("https://example.com")).await?;
/// println!("{}: {:.1}", result.url, result.overall_score);
/// # Ok(())
/// # }
/// ```
pub struct Auditor<F: Fetcher = HttpFetcher> {
    fetcher: F,
    gate: AdmissionGate,
    stats: Arc<AuditStats>,
    sink: Option<Arc<dyn ResultSink>>,
}

impl Auditor<HttpFetcher> {
    /// An auditor backed by a pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::OptionsError` for a zero concurrency cap
    /// and `InitializationError::HttpClientError` if the client cannot be built.
    pub fn new(options: AuditorOptions) -> Result<Self, InitializationError> {
        if options.max_concurrency == 0 {
            return Err(InitializationError::OptionsError(
                "max_concurrency must be at least 1".into(),
            ));
        }
        let fetcher = HttpFetcher::new(&options)?;
        Ok(Self::with_fetcher(fetcher, options))
    }
}

impl<F: Fetcher> Auditor<F> {
    /// An auditor over any `Fetcher`. A zero concurrency cap is raised to one.
    pub fn with_fetcher(fetcher: F, options: AuditorOptions) -> Self {
        Self {
            fetcher,
            gate: AdmissionGate::new(options.max_concurrency),
            stats: Arc::new(AuditStats::new()),
            sink: None,
        }
    }

    /// Hands every top-level outcome to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn stats(&self) -> &AuditStats {
        &self.stats
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Stops admitting audits. Queued audits fail with `AuditError::Cancelled`;
    /// running ones finish normally.
    pub fn close(&self) {
        self.gate.close();
    }

    /// Audits one URL.
    ///
    /// Analyzer failures never fail an audit: the affected axis is reported
    /// with the neutral score and one synthetic issue.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `config` fails validation (nothing is fetched)
    /// - `Fetch` if the seed page cannot be retrieved after retries
    /// - `Parse` if the seed body is empty
    /// - `Timeout` if the deadline passes before the audit finishes, crawl included
    /// - `Cancelled` if the auditor is closed while the audit is queued
    pub async fn run_audit(&self, config: AuditConfig) -> Result<AuditResult, AuditError> {
        let url = config.url.clone();
        let outcome = self.execute(Arc::new(config)).await;
        match &outcome {
            Ok(result) => {
                self.stats.increment(AuditEvent::AuditCompleted);
                log::info!(
                    "Audited {}: overall {:.1} ({} issues)",
                    url,
                    result.overall_score,
                    result.issues.len()
                );
            }
            Err(e) => {
                self.stats.increment(AuditEvent::AuditFailed);
                log::warn!("Audit of {} failed: {}", url, e);
            }
        }
        if let Some(sink) = &self.sink {
            sink.record(&url, &outcome);
        }
        outcome
    }

    /// Audits every URL with `template`'s settings, concurrently under the
    /// admission gate.
    ///
    /// The result has one entry per URL in request order. A failed entry does
    /// not affect its siblings.
    pub async fn run_batch(&self, urls: &[String], template: &AuditConfig) -> BatchResult {
        let mut tasks = FuturesUnordered::new();
        for (index, url) in urls.iter().enumerate() {
            let config = template.for_url(url.clone());
            tasks.push(async move { (index, self.run_audit(config).await) });
        }

        let mut slots: Vec<Option<BatchOutcome>> = vec![None; urls.len()];
        while let Some((index, outcome)) = tasks.next().await {
            slots[index] = Some(match outcome {
                Ok(result) => BatchOutcome::Completed(Box::new(result)),
                Err(e) => BatchOutcome::Failed(AuditFailure::from(&e)),
            });
        }

        let entries: Vec<BatchEntry> = urls
            .iter()
            .zip(slots)
            .map(|(url, slot)| BatchEntry {
                url: url.clone(),
                outcome: slot.unwrap_or_else(|| {
                    BatchOutcome::Failed(AuditFailure::from(&AuditError::Cancelled))
                }),
            })
            .collect();
        let batch = BatchResult { entries };
        log::info!(
            "Batch of {} URLs: {} completed, {} failed",
            batch.len(),
            batch.succeeded(),
            batch.failed()
        );
        batch
    }

    async fn execute(&self, config: Arc<AuditConfig>) -> Result<AuditResult, AuditError> {
        let mut tracker = AuditTracker::new(&config.url);
        if let Err(e) = config.validate() {
            tracker.fail();
            return Err(e);
        }

        let Some(_admission) = self.gate.admit().await else {
            tracker.fail();
            return Err(AuditError::Cancelled);
        };
        let started = Utc::now();
        let deadline = deadline_after(Instant::now(), config.timeout);

        let seed = match timeout_at(deadline, self.audit_seed(&config, deadline, &mut tracker)).await
        {
            Ok(Ok(seed)) => seed,
            Ok(Err(e)) => {
                tracker.fail();
                return Err(e);
            }
            Err(_) => {
                tracker.fail();
                return Err(AuditError::Timeout(config.timeout));
            }
        };

        let mut summary = CrawlSummary::default();
        if config.max_pages > 1 {
            let crawling = crawl(
                &self.fetcher,
                &seed.fetch,
                &seed.doc,
                &config,
                deadline,
                &self.stats,
            );
            summary = match timeout_at(deadline, crawling).await {
                Ok(Ok(summary)) => summary,
                Ok(Err(e)) => {
                    tracker.fail();
                    return Err(e);
                }
                Err(_) => {
                    log::debug!("Crawl of {} overran the deadline", config.url);
                    tracker.fail();
                    return Err(AuditError::Timeout(config.timeout));
                }
            };
        }

        tracker.advance(AuditState::Aggregating);
        let page = aggregate(&seed.results);
        let mut metrics = page.metrics;
        if let Some(status) = seed.fetch.status {
            metrics.insert("http_status".into(), status.into());
        }
        let pages_audited = 1 + summary.pages_scanned;
        metrics.insert("pages_audited".into(), pages_audited.into());
        if config.max_pages > 1 {
            summary.write_metrics(&mut metrics);
        }

        let fraud_score = page.scores.get(&Axis::Fraud).copied();
        let result = AuditResult {
            url: config.url.clone(),
            final_url: seed.fetch.final_url.clone(),
            timestamp: started,
            status: AuditStatus::Completed,
            overall_score: page.overall_score,
            scores: page.scores,
            fraud_score,
            fraud_risk_level: fraud_score.map(RiskLevel::from_score),
            issues: page.issues,
            metrics,
            recommendations: page.recommendations,
            pages_audited,
        };
        tracker.advance(AuditState::Completed);
        Ok(result)
    }

    /// Fetch, parse and analyze the seed page.
    async fn audit_seed(
        &self,
        config: &Arc<AuditConfig>,
        deadline: Instant,
        tracker: &mut AuditTracker,
    ) -> Result<SeedPage, AuditError> {
        tracker.advance(AuditState::Fetching);
        let fetch = fetch_with_retry(&self.fetcher, &config.url, config, deadline, &self.stats).await;
        if let Some(failure) = &fetch.error {
            self.stats.increment_fetch_error(failure.kind);
            return Err(AuditError::from_fetch(failure, config.timeout));
        }

        tracker.advance(AuditState::Parsing);
        let doc = Arc::new(parse(&fetch.body, &fetch.final_url)?);
        let fetch = Arc::new(fetch);

        tracker.advance(AuditState::Analyzing);
        let results = analyze_page(
            Arc::clone(&doc),
            Arc::clone(&fetch),
            Arc::clone(config),
            &self.stats,
        )
        .await;

        Ok(SeedPage {
            fetch,
            doc,
            results,
        })
    }
}

struct SeedPage {
    fetch: Arc<FetchResult>,
    doc: Arc<Document>,
    results: Vec<AxisResult>,
}

/// Runs every enabled analyzer on its own task and waits for all of them.
///
/// A panicking analyzer task degrades its axis like an analyzer error.
/// Results come back in axis order.
pub(crate) async fn analyze_page(
    doc: Arc<Document>,
    fetch: Arc<FetchResult>,
    config: Arc<AuditConfig>,
    stats: &AuditStats,
) -> Vec<AxisResult> {
    let handles: Vec<(Axis, JoinHandle<AxisResult>)> = config
        .axes
        .enabled()
        .into_iter()
        .map(|axis| {
            let doc = Arc::clone(&doc);
            let fetch = Arc::clone(&fetch);
            let config = Arc::clone(&config);
            (
                axis,
                tokio::spawn(async move { run_analyzer(axis, &doc, &fetch, &config) }),
            )
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (axis, handle) in handles {
        let result = join_analyzer(axis, handle, &fetch.final_url).await;
        if result.degraded {
            stats.increment(AuditEvent::AnalyzerDegraded);
        }
        results.push(result);
    }
    results
}

/// Waits for one analyzer task. A task that panicked or was aborted
/// degrades its axis.
async fn join_analyzer(axis: Axis, handle: JoinHandle<AxisResult>, url: &str) -> AxisResult {
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            let err = AnalyzerError::Aborted(e.to_string());
            log::warn!("{} analyzer task on {} died: {}", axis, url, err);
            degraded(axis, &err.to_string())
        }
    }
}

/// Audits one URL with a fresh default auditor sized for a single audit.
///
/// # Errors
///
/// See `Auditor::run_audit`. An HTTP client that cannot be built is reported
/// as a `Fetch` error of kind `Other`.
pub async fn run_audit(config: AuditConfig) -> Result<AuditResult, AuditError> {
    let options = AuditorOptions {
        max_concurrency: 1,
        user_agent: config.user_agent.clone(),
        timeout: config.timeout,
    };
    let auditor = Auditor::new(options).map_err(|e| AuditError::Fetch {
        kind: FetchErrorKind::Other,
        message: e.to_string(),
    })?;
    auditor.run_audit(config).await
}

/// Audits `urls` with a fresh default auditor admitting `max_concurrency`
/// audits at a time.
///
/// # Errors
///
/// Returns `InitializationError` if the auditor cannot be built.
pub async fn run_batch(
    urls: &[String],
    template: &AuditConfig,
    max_concurrency: usize,
) -> Result<BatchResult, InitializationError> {
    let options = AuditorOptions {
        max_concurrency,
        user_agent: template.user_agent.clone(),
        timeout: template.timeout,
    };
    let auditor = Auditor::new(options)?;
    let batch = auditor.run_batch(urls, template).await;
    auditor.stats().log_summary();
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NEUTRAL_SCORE;

    #[tokio::test]
    async fn test_panicking_analyzer_task_degrades_its_axis() {
        let handle: JoinHandle<AxisResult> = tokio::spawn(async { panic!("analyzer blew up") });

        let result = join_analyzer(Axis::Seo, handle, "https://example.com/").await;

        assert!(result.degraded);
        assert_eq!(result.axis, Axis::Seo);
        assert_eq!(result.score, NEUTRAL_SCORE);
        assert_eq!(result.issues.len(), 1);
        assert!(result.issues[0].is_analyzer_failure());
    }

    #[tokio::test]
    async fn test_finished_analyzer_task_passes_through() {
        let handle = tokio::spawn(async { degraded(Axis::Mobile, "boom") });
        let result = join_analyzer(Axis::Mobile, handle, "https://example.com/").await;
        assert_eq!(result.axis, Axis::Mobile);
        assert_eq!(result.issues.len(), 1);
    }
}
