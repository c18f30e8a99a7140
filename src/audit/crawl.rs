//! Breadth-first crawl of internal pages beyond the seed.
//!
//! Crawled pages are analyzed like the seed, but only their scores and
//! counts reach the audit result, as `crawl_*` metrics.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use tokio::time::Instant;

use crate::analyzers::round2;
use crate::config::AuditConfig;
use crate::domain::same_host;
use crate::error_handling::{AuditError, AuditEvent, AuditStats, FetchErrorKind};
use crate::fetch::{FetchOptions, FetchResult, Fetcher};
use crate::models::{Axis, Metrics};
use crate::parse::{parse, Document, LinkKind};
use crate::utils::{normalize_for_crawl, normalize_url_str};

use super::analyze_page;

/// What the crawl saw.
#[derive(Debug, Default)]
pub(crate) struct CrawlSummary {
    pub pages_scanned: usize,
    pub pages_failed: usize,
    scores: BTreeMap<Axis, Vec<f64>>,
}

impl CrawlSummary {
    pub fn average(&self, axis: Axis) -> Option<f64> {
        let scores = self.scores.get(&axis)?;
        (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64)
    }

    pub fn write_metrics(&self, metrics: &mut Metrics) {
        metrics.insert("crawl_pages_scanned".into(), self.pages_scanned.into());
        metrics.insert("crawl_pages_failed".into(), self.pages_failed.into());
        for axis in self.scores.keys() {
            if let Some(avg) = self.average(*axis) {
                metrics.insert(
                    format!("crawl_average_{axis}_score"),
                    round2(avg).into(),
                );
            }
        }
    }
}

/// Frontier of not-yet-visited internal URLs, keyed by normalized URL.
struct Frontier {
    site_host: String,
    queue: VecDeque<String>,
    seen: HashSet<String>,
}

impl Frontier {
    fn new(seed: &FetchResult) -> Self {
        let site_host = url::Url::parse(&seed.final_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default();
        let mut frontier = Self {
            site_host,
            queue: VecDeque::new(),
            seen: HashSet::new(),
        };
        frontier.mark_seen(&seed.requested_url);
        frontier.mark_seen(&seed.final_url);
        for hop in &seed.redirect_chain {
            frontier.mark_seen(hop);
        }
        frontier
    }

    /// Returns false if the URL had been seen already.
    fn mark_seen(&mut self, url: &str) -> bool {
        match normalize_url_str(url) {
            Some(key) => self.seen.insert(key),
            None => false,
        }
    }

    fn enqueue_links(&mut self, doc: &Document) {
        for link in doc.links_of(LinkKind::Internal) {
            let Some(url) = link.url.as_deref() else {
                continue;
            };
            let Ok(parsed) = url::Url::parse(url) else {
                continue;
            };
            let on_site = parsed
                .host_str()
                .is_some_and(|h| same_host(h, &self.site_host));
            let key = normalize_for_crawl(&parsed);
            if on_site && self.seen.insert(key.clone()) {
                self.queue.push_back(key);
            }
        }
    }
}

/// Crawls up to `config.max_pages - 1` internal pages reachable from the seed.
///
/// Failed fetches and unusable bodies count against the page budget. A page
/// whose redirect lands on an already visited URL is skipped without
/// counting. Crawled pages are fetched once, without retries.
///
/// # Errors
///
/// Returns `AuditError::Timeout` once the deadline passes; the audit then
/// fails like a seed-page overrun.
pub(crate) async fn crawl<F: Fetcher>(
    fetcher: &F,
    seed: &FetchResult,
    seed_doc: &Document,
    config: &Arc<AuditConfig>,
    deadline: Instant,
    stats: &AuditStats,
) -> Result<CrawlSummary, AuditError> {
    let mut summary = CrawlSummary::default();
    let budget = config.max_pages.saturating_sub(1);
    if budget == 0 {
        return Ok(summary);
    }
    let options = FetchOptions::from_config(config);
    let mut frontier = Frontier::new(seed);
    frontier.enqueue_links(seed_doc);

    while summary.pages_scanned + summary.pages_failed < budget {
        let Some(url) = frontier.queue.pop_front() else {
            break;
        };
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(AuditError::Timeout(config.timeout));
        }

        let fetch = fetcher.fetch(&url, &options.within(remaining)).await;
        if let Some(failure) = &fetch.error {
            if failure.kind == FetchErrorKind::Timeout && Instant::now() >= deadline {
                return Err(AuditError::Timeout(config.timeout));
            }
            log::debug!("Crawl fetch of {} failed: {}", url, failure);
            summary.pages_failed += 1;
            stats.increment(AuditEvent::CrawlPageFailed);
            continue;
        }
        if fetch.final_url != url && !frontier.mark_seen(&fetch.final_url) {
            log::debug!("Crawl of {} landed on visited {}", url, fetch.final_url);
            continue;
        }

        let doc = match parse(&fetch.body, &fetch.final_url) {
            Ok(doc) => Arc::new(doc),
            Err(e) => {
                log::debug!("Crawl page {} unusable: {}", fetch.final_url, e);
                summary.pages_failed += 1;
                stats.increment(AuditEvent::CrawlPageFailed);
                continue;
            }
        };
        frontier.enqueue_links(&doc);

        let results = analyze_page(Arc::clone(&doc), Arc::new(fetch), Arc::clone(config), stats).await;
        for result in results {
            summary.scores.entry(result.axis).or_default().push(result.score);
        }
        summary.pages_scanned += 1;
        stats.increment(AuditEvent::PageCrawled);
        log::debug!("Crawled {} ({}/{})", doc.url, summary.pages_scanned, budget);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricValue;

    #[test]
    fn test_summary_metrics() {
        let mut summary = CrawlSummary {
            pages_scanned: 2,
            pages_failed: 1,
            ..CrawlSummary::default()
        };
        summary.scores.insert(Axis::Seo, vec![80.0, 90.0]);
        let mut metrics = Metrics::new();
        summary.write_metrics(&mut metrics);
        assert_eq!(metrics.get("crawl_pages_scanned"), Some(&MetricValue::Int(2)));
        assert_eq!(metrics.get("crawl_pages_failed"), Some(&MetricValue::Int(1)));
        assert_eq!(
            metrics.get("crawl_average_seo_score"),
            Some(&MetricValue::Float(85.0))
        );
    }

    #[test]
    fn test_frontier_deduplicates_and_stays_on_site() {
        let seed = FetchResult::new("https://example.com/", 200, Default::default(), Vec::new());
        let doc = parse(
            br##"<a href="/a">a</a><a href="/a#top">a again</a><a href="https://www.example.com/b">b</a>
            <a href="/">home</a><a href="https://other.org/">x</a><a href="mailto:x@example.com">m</a>"##,
            "https://example.com/",
        )
        .unwrap();
        let mut frontier = Frontier::new(&seed);
        frontier.enqueue_links(&doc);
        let queued: Vec<&str> = frontier.queue.iter().map(String::as_str).collect();
        assert_eq!(
            queued,
            vec!["https://example.com/a", "https://www.example.com/b"]
        );
    }
}
