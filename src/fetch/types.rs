//! Fetch result types.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::error_handling::{FetchErrorKind, FetchFailure};

/// Response headers with case-insensitive names.
///
/// Names are stored lowercased. Repeated headers are joined with `", "`, the
/// way HTTP allows list-valued headers to be combined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        let value = value.trim();
        self.0
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&name.to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies a `reqwest` header map. Values that are not valid UTF-8 are skipped.
    pub fn from_header_map(map: &reqwest::header::HeaderMap) -> Self {
        let mut headers = Self::new();
        for (name, value) in map {
            match value.to_str() {
                Ok(value) => headers.insert(name.as_str(), value),
                Err(_) => log::debug!("Skipping non-UTF-8 value of header {}", name),
            }
        }
        headers
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value.as_ref());
        }
        headers
    }
}

/// Everything retrieved for one URL.
///
/// Failures are data: when `error` is set, `body` is empty and `status` is
/// only present if a response arrived before the failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// URL passed to the fetcher.
    pub requested_url: String,
    /// URL of the last response, after redirects.
    pub final_url: String,
    pub status: Option<u16>,
    /// Every URL that answered with a redirect, in order.
    pub redirect_chain: Vec<String>,
    pub headers: Headers,
    /// Decoded body bytes.
    pub body: Vec<u8>,
    /// Body bytes as received, before content decoding.
    pub transfer_size: usize,
    /// Set when the body hit the size cap.
    pub truncated: bool,
    pub elapsed: Duration,
    pub error: Option<FetchFailure>,
}

impl FetchResult {
    /// A successful response with no redirects.
    pub fn new(url: impl Into<String>, status: u16, headers: Headers, body: Vec<u8>) -> Self {
        let url = url.into();
        Self {
            requested_url: url.clone(),
            final_url: url,
            status: Some(status),
            redirect_chain: Vec::new(),
            headers,
            transfer_size: body.len(),
            body,
            truncated: false,
            elapsed: Duration::ZERO,
            error: None,
        }
    }

    /// A fetch that produced no usable response.
    pub fn failed(url: impl Into<String>, kind: FetchErrorKind, message: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            requested_url: url.clone(),
            final_url: url,
            status: None,
            redirect_chain: Vec::new(),
            headers: Headers::new(),
            body: Vec::new(),
            transfer_size: 0,
            truncated: false,
            elapsed: Duration::ZERO,
            error: Some(FetchFailure::new(kind, message)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn redirect_count(&self) -> usize {
        self.redirect_chain.len()
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Security-Policy", "default-src 'self'");
        assert_eq!(
            headers.get("content-security-policy"),
            Some("default-src 'self'")
        );
        assert!(headers.contains("CONTENT-SECURITY-POLICY"));
        assert!(!headers.contains("x-frame-options"));
    }

    #[test]
    fn test_headers_join_repeated_values() {
        let headers: Headers = [("Cache-Control", "no-cache"), ("cache-control", "no-store")]
            .into_iter()
            .collect();
        assert_eq!(headers.get("cache-control"), Some("no-cache, no-store"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_headers_from_header_map() {
        let mut map = reqwest::header::HeaderMap::new();
        map.insert(
            reqwest::header::CONTENT_ENCODING,
            reqwest::header::HeaderValue::from_static("gzip"),
        );
        let headers = Headers::from_header_map(&map);
        assert_eq!(headers.get("Content-Encoding"), Some("gzip"));
    }

    #[test]
    fn test_failed_fetch_has_empty_body() {
        let result = FetchResult::failed("https://example.com", FetchErrorKind::Dns, "no such host");
        assert!(!result.is_ok());
        assert!(result.body.is_empty());
        assert_eq!(result.status, None);
        assert_eq!(result.error.as_ref().map(|e| e.kind), Some(FetchErrorKind::Dns));
    }

    #[test]
    fn test_body_text_is_lossy() {
        let result = FetchResult::new(
            "https://example.com",
            200,
            Headers::new(),
            vec![b'o', b'k', 0xff],
        );
        assert_eq!(result.body_text(), "ok\u{fffd}");
        assert_eq!(result.transfer_size, 3);
    }
}
