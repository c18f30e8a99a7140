//! Transport, security header, mixed content and inline script checks.

use url::Url;

use crate::config::{
    AuditConfig, HEADER_CONTENT_SECURITY_POLICY, HEADER_REFERRER_POLICY,
    HEADER_STRICT_TRANSPORT_SECURITY, HEADER_X_CONTENT_TYPE_OPTIONS, HEADER_X_FRAME_OPTIONS,
    SECURITY_HEADERS,
};
use crate::error_handling::AnalyzerError;
use crate::fetch::FetchResult;
use crate::models::{Axis, AxisResult, Severity};
use crate::parse::Document;

use super::{Analyzer, Findings};

/// Tags and the attribute that loads a subresource from them.
const SUBRESOURCE_ATTRS: &[(&str, &str)] = &[
    ("img", "src"),
    ("script", "src"),
    ("iframe", "src"),
    ("audio", "src"),
    ("video", "src"),
    ("source", "src"),
    ("embed", "src"),
    ("object", "data"),
    ("link", "href"),
];

pub struct SecurityAnalyzer;

impl Analyzer for SecurityAnalyzer {
    fn axis(&self) -> Axis {
        Axis::Security
    }

    fn analyze(
        &self,
        doc: &Document,
        fetch: &FetchResult,
        _config: &AuditConfig,
    ) -> Result<AxisResult, AnalyzerError> {
        let final_url = Url::parse(&fetch.final_url).map_err(|source| AnalyzerError::InvalidUrl {
            url: fetch.final_url.clone(),
            source,
        })?;
        let https = final_url.scheme() == "https";
        let headers = &fetch.headers;
        let mut findings = Findings::new(Axis::Security);

        findings.metric("uses_https", https);
        if !https {
            findings.flag(
                Severity::High,
                30.0,
                "Site not using HTTPS",
                "Serve the site over HTTPS and redirect plain HTTP to it",
            );
        }

        // A <meta http-equiv> policy counts as a CSP for everything but frame-ancestors.
        let csp = headers
            .get(HEADER_CONTENT_SECURITY_POLICY)
            .or_else(|| doc.meta_http_equiv(HEADER_CONTENT_SECURITY_POLICY))
            .map(str::to_ascii_lowercase);

        match csp.as_deref() {
            None => findings.flag(
                Severity::Medium,
                10.0,
                "Content-Security-Policy header missing",
                "Add a Content-Security-Policy header",
            ),
            Some(policy) if allows_unsafe_inline(policy) => findings.flag(
                Severity::Medium,
                5.0,
                "Content-Security-Policy allows 'unsafe-inline' scripts",
                "Replace 'unsafe-inline' with nonces or hashes",
            ),
            Some(_) => {}
        }

        let frame_ancestors = headers
            .get(HEADER_CONTENT_SECURITY_POLICY)
            .is_some_and(|p| p.to_ascii_lowercase().contains("frame-ancestors"));
        if !headers.contains(HEADER_X_FRAME_OPTIONS) && !frame_ancestors {
            findings.flag(
                Severity::Medium,
                10.0,
                "X-Frame-Options header missing",
                "Add X-Frame-Options: DENY or a frame-ancestors directive",
            );
        }
        if !headers.contains(HEADER_X_CONTENT_TYPE_OPTIONS) {
            findings.flag(
                Severity::Medium,
                10.0,
                "X-Content-Type-Options header missing",
                "Add X-Content-Type-Options: nosniff",
            );
        }
        if https && !headers.contains(HEADER_STRICT_TRANSPORT_SECURITY) {
            findings.flag(
                Severity::Medium,
                10.0,
                "Strict-Transport-Security header missing",
                "Add an HSTS header with a long max-age",
            );
        }
        if !headers.contains(HEADER_REFERRER_POLICY) {
            findings.flag(
                Severity::Low,
                5.0,
                "Referrer-Policy header missing",
                "Add Referrer-Policy: strict-origin-when-cross-origin",
            );
        }
        findings.metric(
            "security_headers_present",
            SECURITY_HEADERS.iter().filter(|h| headers.contains(h)).count(),
        );

        let mixed = if https { mixed_content(doc) } else { 0 };
        findings.metric("mixed_content_count", mixed);
        if mixed > 0 {
            findings.flag(
                Severity::High,
                20.0,
                format!("{mixed} HTTP resources on HTTPS page"),
                "Load every resource over HTTPS to avoid mixed content",
            );
        }

        let csp_pins_scripts = csp
            .as_deref()
            .is_some_and(|p| ["'nonce-", "'sha256-", "'sha384-", "'sha512-"].iter().any(|s| p.contains(s)));
        let without_nonce = doc.inline_scripts().filter(|s| s.nonce.is_none()).count();
        findings.metric("inline_scripts_without_nonce", without_nonce);
        if without_nonce > 0 && !csp_pins_scripts {
            findings.flag(
                Severity::Low,
                5.0,
                format!("{without_nonce} inline scripts without a CSP nonce or hash"),
                "Move inline scripts to files or allow them with CSP nonces",
            );
        }

        Ok(findings.finish())
    }
}

/// `'unsafe-inline'` in the directive that governs scripts.
fn allows_unsafe_inline(policy: &str) -> bool {
    let directive = |name: &str| {
        policy
            .split(';')
            .map(str::trim)
            .find(|d| d.split_whitespace().next() == Some(name))
    };
    directive("script-src")
        .or_else(|| directive("default-src"))
        .is_some_and(|d| d.contains("'unsafe-inline'"))
}

/// Subresources referenced with an explicit `http://` URL.
fn mixed_content(doc: &Document) -> usize {
    SUBRESOURCE_ATTRS
        .iter()
        .flat_map(|(tag, attr)| {
            doc.elements(tag).filter_map(move |e| {
                if *tag == "link" {
                    let rel = e.attr("rel").unwrap_or_default().to_ascii_lowercase();
                    if !(rel.contains("stylesheet") || rel.contains("icon") || rel.contains("preload")) {
                        return None;
                    }
                }
                e.attr(attr)
            })
        })
        .filter(|value| value.trim().to_ascii_lowercase().starts_with("http://"))
        .count()
}
