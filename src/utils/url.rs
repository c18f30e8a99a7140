//! URL validation and normalization utilities.

use log::warn;
use url::Url;

/// Maximum URL length (2048 characters), the common browser and server limit.
const MAX_URL_LENGTH: usize = 2048;

/// Validates and normalizes a URL given on the command line.
///
/// Adds an `https://` prefix if no scheme is present, then checks that the
/// result parses and uses http/https. Logs a warning and returns `None` for
/// anything else.
pub fn validate_and_normalize_url(url: &str) -> Option<String> {
    let url = url.trim();
    let normalized = if !url.starts_with("http://") && !url.starts_with("https://") {
        format!("https://{url}")
    } else {
        url.to_string()
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL exceeding maximum length ({} > {}): {}...",
            normalized.len(),
            MAX_URL_LENGTH,
            normalized.chars().take(50).collect::<String>()
        );
        return None;
    }

    match Url::parse(&normalized) {
        Ok(parsed) if parsed.host_str().is_some() => match parsed.scheme() {
            "http" | "https" => Some(normalized),
            _ => {
                warn!("Skipping unsupported scheme for URL: {url}");
                None
            }
        },
        _ => {
            warn!("Skipping invalid URL: {url}");
            None
        }
    }
}

/// Normalizes every URL of a batch request, keeping unusable ones as given.
///
/// The batch reports those as failed entries, so the result always has one
/// URL per request in request order.
pub fn normalize_batch_urls(urls: &[String]) -> Vec<String> {
    urls.iter()
        .map(|u| validate_and_normalize_url(u).unwrap_or_else(|| u.clone()))
        .collect()
}

/// Resolves `href` against `base`, keeping only http/https targets.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let resolved = base.join(href.trim()).ok()?;
    matches!(resolved.scheme(), "http" | "https").then_some(resolved)
}

/// Key under which a crawled page counts as visited.
///
/// The fragment is dropped; scheme and host are already lowercased by `Url`
/// and default ports removed.
pub fn normalize_for_crawl(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// Same as `normalize_for_crawl` for a string; `None` if it does not parse.
pub fn normalize_url_str(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| normalize_for_crawl(&u))
}
