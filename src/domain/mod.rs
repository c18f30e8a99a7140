//! Domain extraction and host comparison.
//!
//! Registrable domains come from the Public Suffix List via `tldextract`, so
//! "login.paypal.co.uk" and "www.paypal.co.uk" both map to "paypal.co.uk".

use std::sync::LazyLock;

use anyhow::{Context, Result};
use tldextract::{TldExtractor, TldOption};

static EXTRACTOR: LazyLock<TldExtractor> =
    LazyLock::new(|| TldExtractor::new(TldOption::default()));

/// Extracts the registrable domain from a URL.
///
/// # Errors
///
/// Returns an error if the URL cannot be parsed, has no host, is an IP
/// address, or has no registrable part (e.g. a bare public suffix).
pub fn extract_domain(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url).with_context(|| format!("Failed to parse URL: {}", url))?;

    let host = match parsed.host() {
        Some(url::Host::Domain(host)) => host.to_ascii_lowercase(),
        Some(url::Host::Ipv4(_)) | Some(url::Host::Ipv6(_)) => {
            return Err(anyhow::anyhow!(
                "IP addresses do not have registrable domains: {}",
                url
            ))
        }
        None => return Err(anyhow::anyhow!("URL '{}' has no host component", url)),
    };

    let result = EXTRACTOR
        .extract(host.trim_end_matches('.'))
        .with_context(|| format!("Failed to extract domain from URL: {}", url))?;

    match (result.domain, result.suffix) {
        (Some(domain), Some(suffix)) => Ok(format!("{}.{}", domain, suffix)),
        (Some(domain), None) => Ok(domain),
        _ => Err(anyhow::anyhow!("No registrable domain in host: {}", host)),
    }
}

/// Registrable domain when there is one, otherwise the bare host.
pub fn site_key(url: &str) -> Option<String> {
    extract_domain(url).ok().or_else(|| host_of(url))
}

/// Lowercased host of `url`, if it has one.
pub fn host_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()?
        .host_str()
        .map(|h| h.to_ascii_lowercase())
}

/// Lowercases and strips one leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Same host, ignoring case and a leading `www.`.
pub fn same_host(a: &str, b: &str) -> bool {
    normalize_host(a) == normalize_host(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_domain_basic() {
        assert_eq!(
            extract_domain("https://www.example.com/path").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn test_extract_domain_multi_part_suffix() {
        assert_eq!(
            extract_domain("https://login.paypal.co.uk/").unwrap(),
            "paypal.co.uk"
        );
    }

    #[test]
    fn test_extract_domain_with_port_and_query() {
        assert_eq!(
            extract_domain("https://a.b.example.com:8080/x?q=1#f").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn test_extract_domain_rejects_ip() {
        assert!(extract_domain("http://192.168.1.1/").is_err());
        assert!(extract_domain("http://[::1]/").is_err());
    }

    #[test]
    fn test_extract_domain_rejects_garbage() {
        assert!(extract_domain("not a url").is_err());
    }

    #[test]
    fn test_site_key_falls_back_to_host() {
        assert_eq!(site_key("http://127.0.0.1:8080/"), Some("127.0.0.1".into()));
        assert_eq!(site_key("https://shop.example.org/"), Some("example.org".into()));
    }

    #[test]
    fn test_same_host_ignores_www_and_case() {
        assert!(same_host("WWW.Example.com", "example.com"));
        assert!(!same_host("blog.example.com", "example.com"));
    }

    proptest! {
        #[test]
        fn test_extract_domain_idempotent(
            domain in "[a-z]{5,15}",
            tld in "(com|org|net|co\\.uk)"
        ) {
            let url = format!("https://www.{}.{}", domain, tld);
            let extracted = extract_domain(&url).unwrap();
            let again = extract_domain(&format!("https://{}", extracted)).unwrap();
            prop_assert_eq!(extracted, again);
        }
    }
}
