//! Configuration constants.
//!
//! Defaults for `AuditConfig` and `AuditorOptions`, plus the fixed limits the
//! fetcher and analyzers share.

use std::time::Duration;

/// Per-audit deadline, measured from admission.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest deadline `AuditConfig::validate` accepts (one day).
pub const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_USER_AGENT: &str = "WebQualityAuditor/1.0";

/// Pages per audit, seed included.
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Maximum concurrent audits admitted across one `Auditor`.
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

// Fetching
/// Redirect hops the fetcher follows before giving up with `TooManyRedirects`.
/// Network safety only; the fraud heuristic has its own threshold.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;
/// Maximum response body size in bytes (10MB). Larger bodies are truncated.
pub const MAX_RESPONSE_BODY_SIZE: usize = 10 * 1024 * 1024;

// Retry strategy
/// Retries of a transient seed-fetch failure (total attempts = retries + 1)
pub const DEFAULT_MAX_RETRIES: usize = 2;
/// Delay before the first retry; doubles on each subsequent attempt
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;

// Scoring
/// Score assigned to an axis whose analyzer could not finish.
pub const NEUTRAL_SCORE: f64 = 50.0;
pub const MAX_SCORE: f64 = 100.0;
pub const MIN_SCORE: f64 = 0.0;

// Fraud heuristics
/// Redirect hops above which the fraud analyzer flags the chain
pub const DEFAULT_FRAUD_MAX_REDIRECTS: usize = 3;
/// Share of visible words that may be scam keywords before flagging
pub const DEFAULT_SCAM_KEYWORD_THRESHOLD: f64 = 0.05;

pub const DEFAULT_SCAM_KEYWORDS: &[&str] = &[
    "FREE",
    "URGENT",
    "WINNER",
    "GIVEAWAY",
    "ACT NOW",
    "LIMITED TIME",
    "CONGRATULATIONS",
    "CLAIM NOW",
    "INSTANT",
    "GUARANTEED",
    "RISK FREE",
    "AMAZING DEAL",
    "ONCE IN A LIFETIME",
    "EXCLUSIVE OFFER",
    "CLICK HERE",
];

/// Anchor phrases that, pointing off-site, suggest bait links.
pub const SUSPICIOUS_ANCHOR_PHRASES: &[&str] = &[
    "CLICK HERE",
    "FREE MONEY",
    "CLAIM NOW",
    "WIN NOW",
    "URGENT",
    "LIMITED TIME",
    "ACT NOW",
];

/// Commonly spoofed brands and the registrable domains they actually own.
pub const DEFAULT_BRANDS: &[(&str, &[&str])] = &[
    ("amazon", &["amazon.com", "amazon.co.uk", "amazon.de", "amazon.ca", "amazonaws.com"]),
    ("apple", &["apple.com", "icloud.com"]),
    ("google", &["google.com", "gmail.com", "youtube.com", "googleapis.com"]),
    ("microsoft", &["microsoft.com", "live.com", "outlook.com", "office.com"]),
    ("paypal", &["paypal.com", "paypal.me"]),
    ("facebook", &["facebook.com", "fb.com", "meta.com"]),
    ("netflix", &["netflix.com"]),
    ("ebay", &["ebay.com", "ebay.co.uk"]),
    ("walmart", &["walmart.com"]),
    ("visa", &["visa.com"]),
    ("mastercard", &["mastercard.com"]),
    ("chase", &["chase.com", "jpmorganchase.com"]),
    ("wells fargo", &["wellsfargo.com"]),
    ("bank of america", &["bankofamerica.com", "bofa.com"]),
];
