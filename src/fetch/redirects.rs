//! HTTP redirect chain resolution.
//!
//! The shared client never follows redirects itself; each hop is requested
//! here so the full path from seed URL to final response can be recorded.

use reqwest::Url;
use tokio::time::Instant;

use crate::config::HEADER_LOCATION;
use crate::error_handling::{categorize_reqwest_error, FetchErrorKind, FetchFailure};
use crate::fetch::request::RequestHeaders;
use crate::fetch::FetchOptions;

/// The first non-redirect response and the hops that led to it.
pub(crate) struct Resolved {
    pub response: reqwest::Response,
    pub chain: Vec<String>,
}

/// A failed resolution. `chain` holds the hops completed before the failure.
pub(crate) struct Unresolved {
    pub failure: FetchFailure,
    pub chain: Vec<String>,
    pub last_url: String,
}

/// Follows redirects from `start_url` until a non-redirect response arrives.
///
/// Only 301, 302, 303, 307 and 308 responses carrying a `Location` header are
/// followed; a redirect status without `Location` is returned as the final
/// response. Every hop shares the time left until `deadline`.
///
/// # Errors
///
/// Returns `Unresolved` when a request fails, the deadline passes, a
/// `Location` cannot be resolved, or more than `options.max_redirects`
/// redirects are seen (`TooManyRedirects`, with the partial chain).
pub(crate) async fn resolve_redirect_chain(
    client: &reqwest::Client,
    start_url: &str,
    options: &FetchOptions,
    deadline: Instant,
) -> Result<Resolved, Unresolved> {
    let mut chain: Vec<String> = Vec::new();
    let mut current = Url::parse(start_url).map_err(|e| Unresolved {
        failure: FetchFailure::new(FetchErrorKind::InvalidUrl, e.to_string()),
        chain: Vec::new(),
        last_url: start_url.to_string(),
    })?;

    loop {
        let fail = |kind: FetchErrorKind, message: String, chain: Vec<String>, at: &Url| Unresolved {
            failure: FetchFailure::new(kind, message),
            chain,
            last_url: at.to_string(),
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(fail(
                FetchErrorKind::Timeout,
                format!("deadline reached before requesting {current}"),
                chain,
                &current,
            ));
        }

        let response = match RequestHeaders::apply_to_request_builder(
            client.get(current.clone()),
            &options.user_agent,
        )
        .timeout(remaining)
        .send()
        .await
        {
            Ok(response) => response,
            Err(e) => {
                let kind = categorize_reqwest_error(&e);
                return Err(fail(kind, e.to_string(), chain, &current));
            }
        };

        let status = response.status().as_u16();
        if !matches!(status, 301 | 302 | 303 | 307 | 308) {
            return Ok(Resolved { response, chain });
        }

        let Some(location) = response
            .headers()
            .get(HEADER_LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
        else {
            log::warn!("Redirect status {} for {} but no Location header", status, current);
            return Ok(Resolved { response, chain });
        };

        let next = match current.join(&location) {
            Ok(next) => next,
            Err(e) => {
                return Err(fail(
                    FetchErrorKind::InvalidUrl,
                    format!("unresolvable Location '{location}': {e}"),
                    chain,
                    &current,
                ))
            }
        };

        chain.push(current.to_string());
        if chain.len() > options.max_redirects {
            return Err(fail(
                FetchErrorKind::TooManyRedirects,
                format!("more than {} redirects", options.max_redirects),
                chain,
                &current,
            ));
        }
        log::debug!("Redirect {} {} -> {}", status, current, next);
        current = next;
    }
}
