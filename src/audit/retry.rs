//! Seed-page fetch with retries on transient failures.

use tokio::time::Instant;
use tokio_retry::RetryIf;

use crate::config::AuditConfig;
use crate::error_handling::{get_retry_strategy, AuditEvent, AuditStats};
use crate::fetch::{FetchOptions, FetchResult, Fetcher};

/// Fetches `url`, retrying connection, DNS and request failures with
/// exponential backoff.
///
/// Each attempt gets the time left until `deadline` as its timeout. The
/// result of the last attempt is returned whether it succeeded or not.
pub(crate) async fn fetch_with_retry<F: Fetcher>(
    fetcher: &F,
    url: &str,
    config: &AuditConfig,
    deadline: Instant,
    stats: &AuditStats,
) -> FetchResult {
    let options = FetchOptions::from_config(config);
    let strategy = get_retry_strategy(config.max_retries, config.retry_initial_delay);
    let mut attempt = 0usize;

    let outcome = RetryIf::start(
        strategy,
        || {
            attempt += 1;
            if attempt > 1 {
                stats.increment(AuditEvent::FetchRetried);
                log::info!("Retrying fetch of {} (attempt {})", url, attempt);
            }
            let options = options.within(deadline.saturating_duration_since(Instant::now()));
            async move {
                let result = fetcher.fetch(url, &options).await;
                if result.is_ok() {
                    Ok(result)
                } else {
                    Err(result)
                }
            }
        },
        |failed: &FetchResult| {
            failed
                .error
                .as_ref()
                .is_some_and(|e| e.kind.is_retriable())
        },
    )
    .await;

    match outcome {
        Ok(result) | Err(result) => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::FetchErrorKind;
    use crate::fetch::Headers;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Fails with `kind` for the first `failures` calls, then succeeds.
    struct Flaky {
        kind: FetchErrorKind,
        failures: usize,
        calls: AtomicUsize,
    }

    impl Fetcher for Flaky {
        fn fetch(&self, url: &str, _options: &FetchOptions) -> impl Future<Output = FetchResult> + Send {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let result = if call < self.failures {
                FetchResult::failed(url, self.kind, "flaky")
            } else {
                FetchResult::new(url, 200, Headers::new(), b"<p>ok</p>".to_vec())
            };
            async move { result }
        }
    }

    fn config() -> AuditConfig {
        AuditConfig {
            max_retries: 2,
            retry_initial_delay: Duration::from_millis(1),
            ..AuditConfig::new("https://example.com/")
        }
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried() {
        let fetcher = Flaky {
            kind: FetchErrorKind::Connect,
            failures: 2,
            calls: AtomicUsize::new(0),
        };
        let stats = AuditStats::new();
        let result =
            fetch_with_retry(&fetcher, "https://example.com/", &config(), deadline(), &stats).await;
        assert!(result.is_ok());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        assert_eq!(stats.get_count(AuditEvent::FetchRetried), 2);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let fetcher = Flaky {
            kind: FetchErrorKind::Dns,
            failures: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let stats = AuditStats::new();
        let result =
            fetch_with_retry(&fetcher, "https://example.com/", &config(), deadline(), &stats).await;
        assert_eq!(result.error.map(|e| e.kind), Some(FetchErrorKind::Dns));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let fetcher = Flaky {
            kind: FetchErrorKind::TooManyRedirects,
            failures: 1,
            calls: AtomicUsize::new(0),
        };
        let stats = AuditStats::new();
        let result =
            fetch_with_retry(&fetcher, "https://example.com/", &config(), deadline(), &stats).await;
        assert!(!result.is_ok());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(stats.get_count(AuditEvent::FetchRetried), 0);
    }
}
