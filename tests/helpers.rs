// Shared test helpers: a scripted in-memory fetcher and page builders.
//
// Pipeline tests that must not touch the network drive the auditor through
// `ScriptedFetcher` instead of `HttpFetcher`.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use web_quality_audit::{
    AuditConfig, FetchErrorKind, FetchOptions, FetchResult, Fetcher, Headers,
};

/// Serves canned `FetchResult`s keyed by URL.
///
/// Each URL has a script of responses consumed in order; the last one repeats.
/// Unknown URLs fail with a non-retriable error.
#[derive(Clone, Default)]
pub struct ScriptedFetcher {
    pages: Arc<Mutex<HashMap<String, Vec<FetchResult>>>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch sleeps for `delay` before answering, ignoring its timeout.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn page(self, url: &str, result: FetchResult) -> Self {
        self.script(url, vec![result])
    }

    pub fn html(self, url: &str, html: &str) -> Self {
        self.page(url, html_page(url, html))
    }

    pub fn script(self, url: &str, results: Vec<FetchResult>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.to_string(), results);
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls().iter().filter(|u| *u == url).count()
    }

    /// Most fetches observed in flight at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn next_response(&self, url: &str) -> FetchResult {
        let mut pages = self.pages.lock().unwrap();
        match pages.get_mut(url) {
            Some(script) if script.len() > 1 => script.remove(0),
            Some(script) => script[0].clone(),
            None => FetchResult::failed(url, FetchErrorKind::Other, "no scripted response"),
        }
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self, url: &str, _options: &FetchOptions) -> impl Future<Output = FetchResult> + Send {
        self.calls.lock().unwrap().push(url.to_string());
        let response = self.next_response(url);
        let delay = self.delay;
        let in_flight = Arc::clone(&self.in_flight);
        let peak = Arc::clone(&self.peak);
        async move {
            let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
            response
        }
    }
}

/// A 200 response with no headers.
pub fn html_page(url: &str, html: &str) -> FetchResult {
    FetchResult::new(url, 200, Headers::new(), html.as_bytes().to_vec())
}

/// A 200 response carrying the usual security, caching and compression headers.
pub fn hardened_page(url: &str, html: &str) -> FetchResult {
    let headers: Headers = [
        ("Content-Security-Policy", "default-src 'self'"),
        ("X-Frame-Options", "DENY"),
        ("X-Content-Type-Options", "nosniff"),
        ("Strict-Transport-Security", "max-age=31536000"),
        ("Referrer-Policy", "no-referrer"),
        ("Content-Encoding", "gzip"),
        ("Cache-Control", "max-age=3600"),
    ]
    .into_iter()
    .collect();
    FetchResult::new(url, 200, headers, html.as_bytes().to_vec())
}

/// Default config for `url` with fast retries and no crawl.
pub fn test_config(url: &str) -> AuditConfig {
    AuditConfig {
        timeout: Duration::from_secs(5),
        max_pages: 1,
        retry_initial_delay: Duration::from_millis(1),
        ..AuditConfig::new(url)
    }
}

pub const SHORT_PAGE: &str =
    r#"<html><head><title>Short</title></head><body><img src="a.png"></body></html>"#;

pub const CLEAN_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<title>Garden tools and supplies shop</title>
<meta name="description" content="Rakes, spades, hoses and everything else a small garden needs, shipped quickly.">
<meta name="viewport" content="width=device-width, initial-scale=1">
<link rel="canonical" href="https://garden.example/">
<script type="application/ld+json">{"@type": "Store", "name": "Garden"}</script>
</head>
<body>
<a href="#main">Skip to content</a>
<header><nav><a href="/tools">Tools</a></nav></header>
<main id="main">
<h1>Garden tools</h1>
<h2>Rakes</h2>
<p>Sturdy rakes for leaves and soil.</p>
<img src="rake.png" alt="A wooden rake">
</main>
</body>
</html>"##;
