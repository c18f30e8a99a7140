//! Page fetching.
//!
//! The `Fetcher` trait is the only way the audit pipeline touches the
//! network. `HttpFetcher` implements it on a shared `reqwest::Client`; tests
//! and alternative backends (e.g. a headless browser) provide their own.
//!
//! Fetchers never return errors: a failed fetch is a `FetchResult` whose
//! `error` is set and whose body is empty.

mod body;
mod redirects;
mod request;
mod types;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::{AuditConfig, AuditorOptions, HEADER_CONTENT_ENCODING, MAX_RESPONSE_BODY_SIZE};
use crate::error_handling::{
    categorize_reqwest_error, FetchErrorKind, FetchFailure, InitializationError,
};
use crate::initialization::init_client;

pub use types::{FetchResult, Headers};

/// Per-fetch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Budget for the whole fetch, every redirect hop and the body included.
    pub timeout: Duration,
    pub user_agent: String,
    pub max_redirects: usize,
}

impl FetchOptions {
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
            max_redirects: config.max_redirects,
        }
    }

    /// Same options with the timeout shortened to `remaining`.
    pub fn within(&self, remaining: Duration) -> Self {
        Self {
            timeout: self.timeout.min(remaining),
            ..self.clone()
        }
    }
}

/// Retrieves one URL.
///
/// Implementations must follow redirects up to `options.max_redirects`,
/// stop after `options.timeout`, and report every failure through
/// `FetchResult::error` instead of panicking. No retries at this layer.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, options: &FetchOptions) -> impl Future<Output = FetchResult> + Send;
}

/// HTTP fetcher over one pooled `reqwest::Client` with redirects disabled.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Arc<reqwest::Client>,
    body_limit: usize,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the client cannot be built.
    pub fn new(options: &AuditorOptions) -> Result<Self, InitializationError> {
        Ok(Self::with_client(init_client(options)?))
    }

    /// Uses an existing client. The client must not follow redirects.
    pub fn with_client(client: Arc<reqwest::Client>) -> Self {
        Self {
            client,
            body_limit: MAX_RESPONSE_BODY_SIZE,
        }
    }

    /// Overrides the body size cap (decoded and on the wire).
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    async fn fetch_page(&self, url: &str, options: &FetchOptions) -> FetchResult {
        let start = Instant::now();
        let deadline = deadline_after(start, options.timeout);

        let resolved =
            match redirects::resolve_redirect_chain(&self.client, url, options, deadline).await {
                Ok(resolved) => resolved,
                Err(unresolved) => {
                    log::warn!("Fetch of {} failed: {}", url, unresolved.failure);
                    let mut result = FetchResult::failed(
                        url,
                        unresolved.failure.kind,
                        unresolved.failure.message,
                    );
                    result.final_url = unresolved.last_url;
                    result.redirect_chain = unresolved.chain;
                    result.elapsed = start.elapsed();
                    return result;
                }
            };

        let response = resolved.response;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = Headers::from_header_map(response.headers());
        let mut result = FetchResult {
            requested_url: url.to_string(),
            final_url,
            status: Some(status),
            redirect_chain: resolved.chain,
            headers,
            body: Vec::new(),
            transfer_size: 0,
            truncated: false,
            elapsed: Duration::ZERO,
            error: None,
        };

        match body::read_capped(response, self.body_limit).await {
            Ok(raw) => {
                result.transfer_size = raw.bytes.len();
                let encoding = result.headers.get(HEADER_CONTENT_ENCODING);
                match body::decode(raw, encoding, self.body_limit) {
                    Ok((body, truncated)) => {
                        result.body = body;
                        result.truncated = truncated;
                    }
                    Err(e) => {
                        log::warn!("Could not decode body of {}: {}", result.final_url, e);
                        result.error = Some(FetchFailure::new(
                            FetchErrorKind::Body,
                            e.to_string(),
                        ));
                    }
                }
            }
            Err(e) => {
                let kind = categorize_reqwest_error(&e);
                log::warn!("Reading body of {} failed ({}): {}", result.final_url, kind, e);
                result.error = Some(FetchFailure::new(kind, e.to_string()));
            }
        }

        if result.truncated {
            log::debug!(
                "Body of {} truncated at {} bytes",
                result.final_url,
                self.body_limit
            );
        }
        result.elapsed = start.elapsed();
        log::debug!(
            "Fetched {} -> {} ({}, {} bytes, {} redirects) in {:?}",
            url,
            result.final_url,
            status,
            result.body.len(),
            result.redirect_count(),
            result.elapsed
        );
        result
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str, options: &FetchOptions) -> impl Future<Output = FetchResult> + Send {
        self.fetch_page(url, options)
    }
}

/// `start + timeout`, saturating at a far-future instant instead of overflowing.
pub(crate) fn deadline_after(start: Instant, timeout: Duration) -> Instant {
    const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);
    start
        .checked_add(timeout)
        .unwrap_or_else(|| start + FAR_FUTURE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_after_saturates() {
        let start = Instant::now();
        assert_eq!(
            deadline_after(start, Duration::from_secs(1)),
            start + Duration::from_secs(1)
        );
        assert!(deadline_after(start, Duration::MAX) > start);
    }

    #[test]
    fn test_fetch_options_from_config() {
        let config = AuditConfig::new("https://example.com");
        let options = FetchOptions::from_config(&config);
        assert_eq!(options.timeout, config.timeout);
        assert_eq!(options.max_redirects, 10);
        assert_eq!(options.user_agent, "WebQualityAuditor/1.0");
    }

    #[test]
    fn test_fetch_options_within_never_extends() {
        let options = FetchOptions {
            timeout: Duration::from_secs(5),
            user_agent: "ua".into(),
            max_redirects: 3,
        };
        assert_eq!(
            options.within(Duration::from_secs(2)).timeout,
            Duration::from_secs(2)
        );
        assert_eq!(
            options.within(Duration::from_secs(60)).timeout,
            Duration::from_secs(5)
        );
    }

    #[tokio::test]
    async fn test_invalid_url_is_reported_not_raised() {
        let fetcher = HttpFetcher::new(&AuditorOptions::default()).expect("client");
        let options = FetchOptions::from_config(&AuditConfig::default());
        let result = fetcher.fetch("not a url", &options).await;
        assert_eq!(
            result.error.map(|e| e.kind),
            Some(FetchErrorKind::InvalidUrl)
        );
        assert!(result.body.is_empty());
    }
}
