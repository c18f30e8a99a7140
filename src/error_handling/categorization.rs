//! Error categorization and retry strategy.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::FetchErrorKind;

/// Upper bound for a single backoff sleep.
const RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

/// Creates an exponential backoff retry strategy.
///
/// The first delay is `initial_delay` and each subsequent delay doubles,
/// capped at ten seconds. The iterator yields exactly `max_retries` delays,
/// so the total number of attempts is `max_retries + 1`.
///
/// # Arguments
///
/// * `max_retries` - Number of retries after the first attempt
/// * `initial_delay` - Delay before the first retry
pub fn get_retry_strategy(
    max_retries: usize,
    initial_delay: Duration,
) -> impl Iterator<Item = Duration> {
    // ExponentialBackoff yields base^n * factor; base 2 gives 2*factor, 4*factor, ...
    let factor = (initial_delay.as_millis() as u64 / 2).max(1);
    ExponentialBackoff::from_millis(2)
        .factor(factor)
        .max_delay(RETRY_MAX_DELAY)
        .take(max_retries)
}

/// Categorizes a `reqwest::Error` into a `FetchErrorKind`.
///
/// Status errors never reach here: the fetcher treats any HTTP status as a
/// response, not a failure.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> FetchErrorKind {
    if error.is_timeout() {
        FetchErrorKind::Timeout
    } else if error.is_builder() {
        FetchErrorKind::InvalidUrl
    } else if error.is_redirect() {
        FetchErrorKind::TooManyRedirects
    } else if error.is_connect() {
        if is_dns_failure(error) {
            FetchErrorKind::Dns
        } else {
            FetchErrorKind::Connect
        }
    } else if error.is_body() || error.is_decode() {
        FetchErrorKind::Body
    } else if error.is_request() {
        FetchErrorKind::Request
    } else {
        FetchErrorKind::Other
    }
}

/// Walks the source chain looking for resolver failures.
///
/// hyper-util reports lookup errors as connect errors whose source mentions
/// "dns error" or "failed to lookup address".
fn is_dns_failure(error: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(error);
    while let Some(err) = source {
        let msg = err.to_string().to_lowercase();
        if msg.contains("dns error") || msg.contains("failed to lookup address") {
            return true;
        }
        source = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_retry_strategy_initial_delay() {
        let first = get_retry_strategy(3, Duration::from_millis(500))
            .next()
            .expect("at least one delay");
        assert_eq!(first, Duration::from_millis(500));
    }

    #[test]
    fn test_get_retry_strategy_doubles() {
        let delays: Vec<Duration> = get_retry_strategy(3, Duration::from_millis(200)).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800)
            ]
        );
    }

    #[test]
    fn test_get_retry_strategy_max_delay() {
        for delay in get_retry_strategy(10, Duration::from_secs(4)) {
            assert!(delay <= RETRY_MAX_DELAY, "{:?} exceeds cap", delay);
        }
    }

    #[test]
    fn test_get_retry_strategy_zero_retries() {
        assert_eq!(get_retry_strategy(0, Duration::from_millis(500)).count(), 0);
    }

    #[tokio::test]
    async fn test_categorize_connection_refused() {
        // Port 9 (discard) on loopback is almost never listening.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("client");
        let err = client
            .get("http://127.0.0.1:9/")
            .send()
            .await
            .expect_err("nothing listens on port 9");
        assert_eq!(categorize_reqwest_error(&err), FetchErrorKind::Connect);
    }

    #[tokio::test]
    async fn test_categorize_builder_error() {
        let client = reqwest::Client::new();
        let err = client
            .get("not a url")
            .send()
            .await
            .expect_err("relative URL cannot be sent");
        assert_eq!(categorize_reqwest_error(&err), FetchErrorKind::InvalidUrl);
    }
}
