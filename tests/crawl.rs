//! Internal-page crawl beyond the seed.
//!
//! Crawled pages only contribute `crawl_*` metrics; the seed page alone
//! decides scores and issues.

mod helpers;

use std::time::Duration;

use helpers::{test_config, ScriptedFetcher, CLEAN_PAGE, SHORT_PAGE};
use web_quality_audit::{
    AuditConfig, AuditError, AuditEvent, Auditor, AuditorOptions, MetricValue,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEED: &str = "https://site.example/";

const SEED_PAGE: &str = r#"<html lang="en"><head><title>Site home page for crawling</title></head>
<body>
<a href="/a">A</a>
<a href="/b#section">B</a>
<a href="https://www.site.example/c">C</a>
<a href="/broken">Broken</a>
<a href="https://elsewhere.example/">Elsewhere</a>
<a href="/">Home</a>
</body></html>"#;

fn crawl_config(max_pages: usize) -> AuditConfig {
    AuditConfig {
        max_pages,
        ..test_config(SEED)
    }
}

fn site() -> ScriptedFetcher {
    ScriptedFetcher::new()
        .html(SEED, SEED_PAGE)
        .html("https://site.example/a", SHORT_PAGE)
        .html("https://site.example/b", CLEAN_PAGE)
        .html("https://www.site.example/c", SHORT_PAGE)
        .html("https://site.example/tools", SHORT_PAGE)
        .html("https://elsewhere.example/", CLEAN_PAGE)
}

fn int(value: Option<&MetricValue>) -> Option<i64> {
    match value {
        Some(MetricValue::Int(n)) => Some(*n),
        _ => None,
    }
}

#[tokio::test]
async fn test_crawl_stops_at_page_budget() {
    let fetcher = site();
    let auditor = Auditor::with_fetcher(fetcher.clone(), AuditorOptions::default());
    let result = auditor.run_audit(crawl_config(3)).await.unwrap();

    assert_eq!(result.pages_audited, 3);
    assert_eq!(int(result.metrics.get("crawl_pages_scanned")), Some(2));
    assert_eq!(int(result.metrics.get("crawl_pages_failed")), Some(0));
    assert_eq!(
        fetcher.calls(),
        vec![SEED, "https://site.example/a", "https://site.example/b"]
    );
    assert_eq!(auditor.stats().get_count(AuditEvent::PageCrawled), 2);
}

#[tokio::test]
async fn test_crawl_counts_failures_and_skips_external_links() {
    let fetcher = site();
    let auditor = Auditor::with_fetcher(fetcher.clone(), AuditorOptions::default());
    let result = auditor.run_audit(crawl_config(10)).await.unwrap();

    // a, b, c and /tools (linked from b); /broken fails
    assert_eq!(int(result.metrics.get("crawl_pages_scanned")), Some(4));
    assert_eq!(int(result.metrics.get("crawl_pages_failed")), Some(1));
    assert_eq!(result.pages_audited, 5);
    assert_eq!(fetcher.calls_to("https://elsewhere.example/"), 0);
    assert_eq!(fetcher.calls_to(SEED), 1);
    assert!(result.metrics.contains_key("crawl_average_seo_score"));
}

#[tokio::test]
async fn test_crawled_pages_do_not_change_seed_scores() {
    let seed_only = Auditor::with_fetcher(site(), AuditorOptions::default())
        .run_audit(crawl_config(1))
        .await
        .unwrap();
    let crawled = Auditor::with_fetcher(site(), AuditorOptions::default())
        .run_audit(crawl_config(10))
        .await
        .unwrap();

    assert_eq!(seed_only.scores, crawled.scores);
    assert_eq!(seed_only.overall_score, crawled.overall_score);
    assert_eq!(seed_only.issues, crawled.issues);
    assert!(!seed_only.metrics.contains_key("crawl_pages_scanned"));
}

#[tokio::test]
async fn test_crawl_past_deadline_fails_the_audit() {
    let fetcher = site().with_delay(Duration::from_millis(100));
    let auditor = Auditor::with_fetcher(fetcher.clone(), AuditorOptions::default());
    let config = AuditConfig {
        timeout: Duration::from_millis(150),
        ..crawl_config(3)
    };

    let err = auditor.run_audit(config).await.unwrap_err();

    assert_eq!(err, AuditError::Timeout(Duration::from_millis(150)));
    assert_eq!(fetcher.calls_to(SEED), 1);
    assert_eq!(auditor.stats().get_count(AuditEvent::AuditFailed), 1);
    assert_eq!(auditor.stats().get_count(AuditEvent::AuditCompleted), 0);
}

#[tokio::test]
async fn test_crawl_over_http_follows_internal_links() {
    let server = MockServer::start().await;
    let seed_html = r#"<html><body><a href="/about">About</a><a href="/about/">About again</a></body></html>"#;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(seed_html))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CLEAN_PAGE))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/about/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(CLEAN_PAGE))
        .mount(&server)
        .await;

    let auditor = Auditor::new(AuditorOptions::default()).unwrap();
    let config = AuditConfig {
        max_pages: 5,
        ..test_config(&format!("{}/", server.uri()))
    };
    let result = auditor.run_audit(config).await.unwrap();

    // /about and /about/ are distinct pages; /tools answers 404 with no body
    assert_eq!(int(result.metrics.get("crawl_pages_scanned")), Some(2));
    assert_eq!(int(result.metrics.get("crawl_pages_failed")), Some(1));
}
