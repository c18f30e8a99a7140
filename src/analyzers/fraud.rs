//! Deterministic scam-risk heuristics.
//!
//! Each triggered signal adds a fixed penalty; the fraud score is 100 minus
//! the sum, floored at 0, and is banded into a risk level:
//!
//! | Signal                              | Severity    | Penalty |
//! |-------------------------------------|-------------|---------|
//! | Redirect chain above the threshold  | High        | 25      |
//! | Redirect through another site       | Medium      | 15      |
//! | Scam keyword density                | Medium/High | 20/30   |
//! | Brand named on a non-official site  | High        | 35      |
//! | More than 20 external links         | Medium      | 15      |
//! | Bait anchor text on external links  | Medium      | 20      |
//! | Auto-redirect script                | Medium      | 15      |
//! | Hidden iframe                       | High        | 25      |

use regex::{Regex, RegexBuilder};

use crate::config::{AuditConfig, BrandProfile, SUSPICIOUS_ANCHOR_PHRASES};
use crate::domain::{host_of, site_key};
use crate::error_handling::AnalyzerError;
use crate::fetch::FetchResult;
use crate::models::{Axis, AxisResult, RiskLevel, Severity};
use crate::parse::{Document, Link, LinkKind};

use super::css;
use super::{Analyzer, Findings};

const MAX_EXTERNAL_LINKS: usize = 20;
/// Mentions of a brand in visible text that suggest the page trades on its name.
const BRAND_MENTION_THRESHOLD: usize = 3;

const REDIRECT_SCRIPT_PATTERNS: &[&str] = &[
    "window.location",
    "document.location",
    "location.href",
    "location.replace",
    "location.assign",
];

pub struct FraudAnalyzer;

impl Analyzer for FraudAnalyzer {
    fn axis(&self) -> Axis {
        Axis::Fraud
    }

    fn analyze(
        &self,
        doc: &Document,
        fetch: &FetchResult,
        config: &AuditConfig,
    ) -> Result<AxisResult, AnalyzerError> {
        let mut findings = Findings::new(Axis::Fraud);

        check_redirects(fetch, config, &mut findings);
        check_scam_keywords(doc, config, &mut findings)?;
        let brands = brand_matchers(config)?;
        check_brand_spoofing(doc, fetch, &brands, &mut findings);
        check_links(doc, &brands, &mut findings);
        check_scripts_and_iframes(doc, &mut findings);

        let score = findings.score();
        findings.metric("fraud_score", score);
        findings.metric("fraud_risk_level", RiskLevel::from_score(score).as_str());
        Ok(findings.finish())
    }
}

fn check_redirects(fetch: &FetchResult, config: &AuditConfig, findings: &mut Findings) {
    let redirects = fetch.redirect_count();
    findings.metric("redirect_count", redirects);
    if redirects > config.fraud.max_redirects {
        findings.flag(
            Severity::High,
            25.0,
            format!("Excessive redirects detected: {redirects} hops"),
            "Review the redirect chain for malicious behavior",
        );
    }

    let Some(origin) = site_key(&fetch.requested_url) else {
        return;
    };
    let off_site = fetch
        .redirect_chain
        .iter()
        .chain(std::iter::once(&fetch.final_url))
        .filter_map(|hop| site_key(hop))
        .find(|site| *site != origin);
    if let Some(site) = off_site {
        findings.flag(
            Severity::Medium,
            15.0,
            format!("Off-domain redirect detected: {site}"),
            "Verify the legitimacy of redirects to other sites",
        );
    }
}

/// Case-insensitive whole-phrase matcher; inner spaces match any whitespace.
fn phrase_regex(phrase: &str) -> Result<Regex, AnalyzerError> {
    let pattern = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    Ok(RegexBuilder::new(&format!(r"\b{pattern}\b"))
        .case_insensitive(true)
        .build()?)
}

fn check_scam_keywords(
    doc: &Document,
    config: &AuditConfig,
    findings: &mut Findings,
) -> Result<(), AnalyzerError> {
    let total_words = doc.word_count;
    let mut total_hits = 0;
    let mut found = Vec::new();
    for keyword in config.fraud.scam_keywords.iter().filter(|k| !k.trim().is_empty()) {
        let hits = phrase_regex(keyword)?.find_iter(&doc.visible_text).count();
        if hits > 0 {
            total_hits += hits;
            found.push(format!("{keyword}({hits})"));
        }
    }

    let density = if total_words == 0 {
        0.0
    } else {
        total_hits as f64 / total_words as f64
    };
    findings.metric("scam_keyword_count", total_hits);
    findings.metric("scam_keyword_density", (density * 10_000.0).round() / 10_000.0);
    findings.metric("total_words", total_words);

    let threshold = config.fraud.scam_keyword_threshold;
    if total_hits > 0 && density >= threshold {
        let (severity, penalty) = if density >= 2.0 * threshold {
            (Severity::High, 30.0)
        } else {
            (Severity::Medium, 20.0)
        };
        findings.flag(
            severity,
            penalty,
            format!(
                "High scam keyword density: {:.2}% ({total_hits}/{total_words})",
                density * 100.0
            ),
            format!(
                "Review content for suspicious keywords: {}",
                found.iter().take(5).cloned().collect::<Vec<_>>().join(", ")
            ),
        );
    }
    Ok(())
}

struct BrandMatcher<'a> {
    profile: &'a BrandProfile,
    pattern: Regex,
    /// Brand name without spaces, as it would appear in a hostname.
    compact: String,
}

fn brand_matchers(config: &AuditConfig) -> Result<Vec<BrandMatcher<'_>>, AnalyzerError> {
    config
        .fraud
        .brands
        .iter()
        .filter(|b| !b.name.trim().is_empty() && !config.fraud.is_brand_allowed(&b.name))
        .map(|profile| {
            Ok(BrandMatcher {
                profile,
                pattern: phrase_regex(&profile.name)?,
                compact: profile.name.split_whitespace().collect(),
            })
        })
        .collect()
}

/// Whether a label of the host (split on dots and dashes) is the brand.
fn host_names_brand(host: &str, compact: &str) -> bool {
    host.split(['.', '-']).any(|label| label == compact)
}

fn check_brand_spoofing(
    doc: &Document,
    fetch: &FetchResult,
    brands: &[BrandMatcher<'_>],
    findings: &mut Findings,
) {
    let Some(site) = site_key(&fetch.final_url) else {
        return;
    };
    let host = host_of(&fetch.final_url).unwrap_or_default();
    let title = doc.title.as_deref().unwrap_or_default();

    let spoofed: Vec<String> = brands
        .iter()
        .filter(|b| !b.profile.owns(&site))
        .filter_map(|b| {
            let mentions = b.pattern.find_iter(&doc.visible_text).count();
            let in_title = b.pattern.is_match(title);
            let in_host = host_names_brand(&host, &b.compact);
            (in_title || in_host || mentions >= BRAND_MENTION_THRESHOLD)
                .then(|| format!("{}({})", b.profile.name, mentions + usize::from(in_title)))
        })
        .collect();

    if !spoofed.is_empty() {
        findings.flag(
            Severity::High,
            35.0,
            format!(
                "Potential brand spoofing on {site}: {}",
                spoofed.join(", ")
            ),
            "Verify authorization to use these brand names",
        );
    }
}

/// Bait phrase, or a brand name pointing somewhere the brand does not own.
fn is_suspicious_anchor(link: &Link, brands: &[BrandMatcher<'_>]) -> bool {
    let text = link.text.to_uppercase();
    if SUSPICIOUS_ANCHOR_PHRASES.iter().any(|p| text.contains(p)) {
        return true;
    }
    let Some(target) = link.url.as_deref().and_then(site_key) else {
        return false;
    };
    brands
        .iter()
        .any(|b| b.pattern.is_match(&link.text) && !b.profile.owns(&target))
}

fn check_links(doc: &Document, brands: &[BrandMatcher<'_>], findings: &mut Findings) {
    let external: Vec<&Link> = doc.links_of(LinkKind::External).collect();
    let suspicious: Vec<&Link> = external
        .iter()
        .copied()
        .filter(|l| is_suspicious_anchor(l, brands))
        .collect();

    findings.metric("total_links", doc.links.len());
    findings.metric("external_links", external.len());
    findings.metric("suspicious_anchor_count", suspicious.len());

    if external.len() > MAX_EXTERNAL_LINKS {
        findings.flag(
            Severity::Medium,
            15.0,
            format!("Excessive external links: {}", external.len()),
            "Review external links for legitimacy",
        );
    }
    if !suspicious.is_empty() {
        let examples: Vec<&str> = suspicious.iter().take(3).map(|l| l.text.as_str()).collect();
        findings.flag(
            Severity::Medium,
            20.0,
            format!("Suspicious link text detected: {} instances", suspicious.len()),
            format!("Review links with suspicious text: {}", examples.join(", ")),
        );
    }
}

fn is_hidden_iframe(style: &str, width: Option<&str>, height: Option<&str>) -> bool {
    let tiny = |v: &str| {
        let v = v.trim();
        matches!(v, "0" | "1") || css::px_value(v).is_some_and(|px| px <= 1.0)
    };
    css::property(style, "display").as_deref() == Some("none")
        || css::property(style, "visibility").as_deref() == Some("hidden")
        || css::property(style, "width").is_some_and(|w| tiny(&w))
        || css::property(style, "height").is_some_and(|h| tiny(&h))
        || width.is_some_and(tiny)
        || height.is_some_and(tiny)
}

fn check_scripts_and_iframes(doc: &Document, findings: &mut Findings) {
    let auto_redirect = doc.inline_scripts().any(|s| {
        let code = s.content.to_ascii_lowercase();
        REDIRECT_SCRIPT_PATTERNS.iter().any(|p| code.contains(p))
    });
    if auto_redirect {
        findings.flag(
            Severity::Medium,
            15.0,
            "Auto-redirect JavaScript detected",
            "Review JavaScript for malicious redirects",
        );
    }

    let hidden_iframes = doc
        .elements("iframe")
        .filter(|f| {
            f.has_attr("hidden") || is_hidden_iframe(f.style(), f.attr("width"), f.attr("height"))
        })
        .count();
    findings.metric("hidden_iframe_count", hidden_iframes);
    if hidden_iframes > 0 {
        findings.flag(
            Severity::High,
            25.0,
            format!("Hidden iframes detected: {hidden_iframes}"),
            "Review hidden iframes for malicious content",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::Headers;
    use crate::models::MetricValue;
    use crate::parse::parse;

    fn fetch_of(url: &str, html: &str) -> FetchResult {
        FetchResult::new(url, 200, Headers::new(), html.as_bytes().to_vec())
    }

    fn analyze_fetch(fetch: &FetchResult, config: &AuditConfig) -> AxisResult {
        let doc = parse(&fetch.body, &fetch.final_url).unwrap();
        FraudAnalyzer.analyze(&doc, fetch, config).unwrap()
    }

    fn analyze(url: &str, html: &str) -> AxisResult {
        analyze_fetch(&fetch_of(url, html), &AuditConfig::new(url))
    }

    fn risk(result: &AxisResult) -> Option<&str> {
        result.metrics.get("fraud_risk_level").and_then(MetricValue::as_str)
    }

    #[test]
    fn test_clean_page_is_low_risk() {
        let result = analyze(
            "https://example.com/",
            "<html><head><title>Garden tools</title></head><body><p>Rakes and spades for sale.</p></body></html>",
        );
        assert!(result.issues.is_empty(), "{:?}", result.issues);
        assert_eq!(result.score, 100.0);
        assert_eq!(risk(&result), Some("Low"));
    }

    #[test]
    fn test_keyword_density_twenty_words() {
        let body = "URGENT act now guaranteed one two three four five six seven eight nine ten eleven twelve thirteen fourteen fifteen sixteen";
        let result = analyze(
            "https://example.com/",
            &format!("<html><body><p>{body}</p></body></html>"),
        );
        assert_eq!(result.metrics.get("total_words"), Some(&MetricValue::Int(20)));
        assert_eq!(result.metrics.get("scam_keyword_count"), Some(&MetricValue::Int(3)));
        assert_eq!(
            result.metrics.get("scam_keyword_density"),
            Some(&MetricValue::Float(0.15))
        );
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].severity, Severity::High);
        assert_eq!(result.score, 70.0);
        assert_eq!(risk(&result), Some("Medium"));
    }

    #[test]
    fn test_keywords_match_whole_words_only() {
        let result = analyze(
            "https://example.com/",
            "<html><body><p>Freedom and instantly are not scam words</p></body></html>",
        );
        assert_eq!(result.metrics.get("scam_keyword_count"), Some(&MetricValue::Int(0)));
    }

    #[test]
    fn test_redirect_threshold_is_monotonic() {
        let url = "https://example.com/";
        let config = AuditConfig::new(url);
        let mut fetch = fetch_of(url, "<html><body><p>hello</p></body></html>");
        let baseline = analyze_fetch(&fetch, &config).score;

        fetch.redirect_chain = (0..4).map(|i| format!("https://example.com/r{i}")).collect();
        let result = analyze_fetch(&fetch, &config);
        assert!(result
            .issues
            .iter()
            .any(|i| i.message == "Excessive redirects detected: 4 hops"));
        assert!(result.score <= baseline);
        assert_eq!(result.metrics.get("redirect_count"), Some(&MetricValue::Int(4)));
    }

    #[test]
    fn test_off_domain_redirect() {
        let mut fetch = fetch_of("https://example.com/", "<html><body><p>hi</p></body></html>");
        fetch.redirect_chain = vec!["https://example.com/".into()];
        fetch.final_url = "https://elsewhere.net/landing".into();
        let result = analyze_fetch(&fetch, &AuditConfig::new("https://example.com/"));
        assert!(result
            .issues
            .iter()
            .any(|i| i.message == "Off-domain redirect detected: elsewhere.net"));
    }

    #[test]
    fn test_brand_spoofing() {
        let result = analyze(
            "https://secure-paypal.account-check.com/login",
            "<html><head><title>PayPal login</title></head><body><p>Sign in</p></body></html>",
        );
        let issue = result
            .issues
            .iter()
            .find(|i| i.message.starts_with("Potential brand spoofing"))
            .expect("brand spoofing flagged");
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.message.contains("paypal"));

        let official = analyze(
            "https://www.paypal.com/signin",
            "<html><head><title>PayPal login</title></head><body><p>PayPal PayPal PayPal</p></body></html>",
        );
        assert!(official.issues.is_empty());
    }

    #[test]
    fn test_allowed_brand_is_not_flagged() {
        let url = "https://reviews.example.com/";
        let mut config = AuditConfig::new(url);
        config.fraud.allowed_brands = vec!["Apple".into()];
        let fetch = fetch_of(url, "<html><head><title>Apple watch review</title></head></html>");
        let result = analyze_fetch(&fetch, &config);
        assert!(result.issues.is_empty(), "{:?}", result.issues);
    }

    #[test]
    fn test_suspicious_anchors_and_external_links() {
        let mut html = String::from(
            r#"<html><body><a href="https://prize.example.net/">Click here to claim</a>
            <a href="https://login.evil.test/">Amazon account</a>
            <a href="https://www.amazon.com/">Amazon</a>"#,
        );
        for i in 0..20 {
            html.push_str(&format!(r#"<a href="https://site{i}.org/">partner</a>"#));
        }
        html.push_str("</body></html>");
        let result = analyze("https://example.com/", &html);
        assert_eq!(result.metrics.get("external_links"), Some(&MetricValue::Int(23)));
        assert_eq!(
            result.metrics.get("suspicious_anchor_count"),
            Some(&MetricValue::Int(2))
        );
        assert!(result.issues.iter().any(|i| i.message == "Excessive external links: 23"));
    }

    #[test]
    fn test_scripts_and_hidden_iframes() {
        let result = analyze(
            "https://example.com/",
            r#"<html><body><script>window.location = "https://x.test";</script>
            <iframe src="https://t.test" width="1" height="1"></iframe>
            <iframe src="https://u.test" style="display: none"></iframe>
            <iframe src="https://v.test" width="600" height="400"></iframe></body></html>"#,
        );
        assert_eq!(result.metrics.get("hidden_iframe_count"), Some(&MetricValue::Int(2)));
        assert_eq!(result.score, 100.0 - 15.0 - 25.0);
        assert_eq!(risk(&result), Some("Medium"));
    }
}
