//! Configuration types.
//!
//! `AuditConfig` is the immutable input of one audit. `AuditorOptions`
//! configures the resources an `Auditor` shares across audits.

use std::time::Duration;

use clap::ValueEnum;
use url::Url;

use crate::config::constants::{
    DEFAULT_BRANDS, DEFAULT_FRAUD_MAX_REDIRECTS, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PAGES,
    DEFAULT_MAX_REDIRECTS, DEFAULT_MAX_RETRIES, DEFAULT_SCAM_KEYWORDS,
    DEFAULT_SCAM_KEYWORD_THRESHOLD, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, MAX_TIMEOUT,
    RETRY_INITIAL_DELAY_MS,
};
use crate::error_handling::AuditError;
use crate::models::Axis;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// One JSON object per line
    Json,
}

/// Per-axis enable flags. All axes are enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisToggles {
    pub performance: bool,
    pub seo: bool,
    pub accessibility: bool,
    pub security: bool,
    pub mobile: bool,
    pub fraud: bool,
}

impl AxisToggles {
    pub fn all() -> Self {
        Self {
            performance: true,
            seo: true,
            accessibility: true,
            security: true,
            mobile: true,
            fraud: true,
        }
    }

    pub fn none() -> Self {
        Self {
            performance: false,
            seo: false,
            accessibility: false,
            security: false,
            mobile: false,
            fraud: false,
        }
    }

    /// Only `axis` enabled.
    pub fn only(axis: Axis) -> Self {
        let mut toggles = Self::none();
        toggles.set(axis, true);
        toggles
    }

    pub fn is_enabled(&self, axis: Axis) -> bool {
        match axis {
            Axis::Performance => self.performance,
            Axis::Seo => self.seo,
            Axis::Accessibility => self.accessibility,
            Axis::Security => self.security,
            Axis::Mobile => self.mobile,
            Axis::Fraud => self.fraud,
        }
    }

    pub fn set(&mut self, axis: Axis, enabled: bool) {
        let slot = match axis {
            Axis::Performance => &mut self.performance,
            Axis::Seo => &mut self.seo,
            Axis::Accessibility => &mut self.accessibility,
            Axis::Security => &mut self.security,
            Axis::Mobile => &mut self.mobile,
            Axis::Fraud => &mut self.fraud,
        };
        *slot = enabled;
    }

    /// Enabled axes in canonical order.
    pub fn enabled(&self) -> Vec<Axis> {
        use strum::IntoEnumIterator;
        Axis::iter().filter(|axis| self.is_enabled(*axis)).collect()
    }
}

impl Default for AxisToggles {
    fn default() -> Self {
        Self::all()
    }
}

/// A brand that phishing pages like to impersonate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandProfile {
    /// Lowercase name as it appears in page text.
    pub name: String,
    /// Registrable domains the brand actually owns.
    pub official_domains: Vec<String>,
}

impl BrandProfile {
    pub fn new(name: &str, official_domains: &[&str]) -> Self {
        Self {
            name: name.to_lowercase(),
            official_domains: official_domains.iter().map(|d| d.to_lowercase()).collect(),
        }
    }

    pub fn owns(&self, registrable_domain: &str) -> bool {
        self.official_domains
            .iter()
            .any(|d| d.eq_ignore_ascii_case(registrable_domain))
    }
}

/// Parameters of the fraud heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct FraudConfig {
    /// Keywords counted in visible text, matched case-insensitively on word boundaries.
    pub scam_keywords: Vec<String>,
    /// Brand names never reported as spoofed (e.g. the auditing party's own brand).
    pub allowed_brands: Vec<String>,
    pub brands: Vec<BrandProfile>,
    /// Redirect hops above which the chain is flagged.
    pub max_redirects: usize,
    /// Keyword density in `[0, 1]` at or above which the page is flagged.
    pub scam_keyword_threshold: f64,
}

impl FraudConfig {
    pub fn is_brand_allowed(&self, brand: &str) -> bool {
        self.allowed_brands
            .iter()
            .any(|b| b.eq_ignore_ascii_case(brand))
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            scam_keywords: DEFAULT_SCAM_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            allowed_brands: Vec::new(),
            brands: DEFAULT_BRANDS
                .iter()
                .map(|(name, domains)| BrandProfile::new(name, domains))
                .collect(),
            max_redirects: DEFAULT_FRAUD_MAX_REDIRECTS,
            scam_keyword_threshold: DEFAULT_SCAM_KEYWORD_THRESHOLD,
        }
    }
}

/// Immutable input of one audit.
///
/// # Examples
///
/// ```no_run
/// use web_quality_audit::{AuditConfig, AxisToggles};
/// use std::time::Duration;
///
/// let config = AuditConfig {
///     timeout: Duration::from_secs(10),
///     max_pages: 1,
///     axes: AxisToggles { fraud: false, ..AxisToggles::all() },
///     ..AuditConfig::new("https://example.com")
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AuditConfig {
    /// Seed URL (absolute http/https)
    pub url: String,

    /// Deadline for the whole audit, crawl included
    pub timeout: Duration,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Pages to audit, seed included
    pub max_pages: usize,

    pub axes: AxisToggles,

    /// Fetcher redirect cap
    pub max_redirects: usize,

    /// Retries of a transient seed-fetch failure
    pub max_retries: usize,

    pub retry_initial_delay: Duration,

    pub fraud: FraudConfig,
}

impl AuditConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Same settings, different seed URL. Used to stamp out batch entries.
    pub fn for_url(&self, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..self.clone()
        }
    }

    /// Rejects configurations no audit could honor.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), AuditError> {
        if self.timeout.is_zero() {
            return Err(AuditError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if self.timeout > MAX_TIMEOUT {
            return Err(AuditError::InvalidConfig(format!(
                "timeout must be at most {}s, got {}s",
                MAX_TIMEOUT.as_secs(),
                self.timeout.as_secs()
            )));
        }
        if self.max_pages < 1 {
            return Err(AuditError::InvalidConfig(
                "max_pages must be at least 1".to_string(),
            ));
        }
        let threshold = self.fraud.scam_keyword_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            // NaN fails `contains` as well
            return Err(AuditError::InvalidConfig(format!(
                "scam_keyword_threshold must be within [0, 1], got {threshold}"
            )));
        }
        if self.axes.enabled().is_empty() {
            return Err(AuditError::InvalidConfig(
                "at least one axis must be enabled".to_string(),
            ));
        }
        validate_seed_url(&self.url)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_pages: DEFAULT_MAX_PAGES,
            axes: AxisToggles::all(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_initial_delay: Duration::from_millis(RETRY_INITIAL_DELAY_MS),
            fraud: FraudConfig::default(),
        }
    }
}

fn validate_seed_url(url: &str) -> Result<(), AuditError> {
    let parsed = Url::parse(url)
        .map_err(|e| AuditError::InvalidConfig(format!("invalid URL '{url}': {e}")))?;
    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        "http" | "https" => Err(AuditError::InvalidConfig(format!(
            "URL '{url}' has no host"
        ))),
        scheme => Err(AuditError::InvalidConfig(format!(
            "unsupported URL scheme '{scheme}' in '{url}'"
        ))),
    }
}

/// Options for the resources an `Auditor` shares across audits.
#[derive(Debug, Clone)]
pub struct AuditorOptions {
    /// Maximum audits admitted at once
    pub max_concurrency: usize,

    /// Default User-Agent of the shared HTTP client
    pub user_agent: String,

    /// Default request timeout of the shared HTTP client
    pub timeout: Duration,
}

impl Default for AuditorOptions {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::FailureKind;

    fn valid() -> AuditConfig {
        AuditConfig::new("https://example.com/")
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_audit_config_default() {
        let config = AuditConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, "WebQualityAuditor/1.0");
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.max_redirects, 10);
        assert_eq!(config.fraud.max_redirects, 3);
        assert_eq!(config.fraud.scam_keyword_threshold, 0.05);
        assert_eq!(config.axes.enabled().len(), 6);
        assert!(config.fraud.scam_keywords.iter().any(|k| k == "ACT NOW"));
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = AuditConfig {
            timeout: Duration::ZERO,
            ..valid()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidConfig);
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        let config = AuditConfig {
            timeout: Duration::from_secs(u64::MAX),
            ..valid()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidConfig);
        assert!(err.to_string().contains("timeout"));

        let config = AuditConfig {
            timeout: MAX_TIMEOUT,
            ..valid()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let config = AuditConfig {
            max_pages: 0,
            ..valid()
        };
        assert!(config.validate().unwrap_err().to_string().contains("max_pages"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        for threshold in [-0.1, 1.5, f64::NAN] {
            let mut config = valid();
            config.fraud.scam_keyword_threshold = threshold;
            assert!(
                config.validate().is_err(),
                "threshold {threshold} should be rejected"
            );
        }
    }

    #[test]
    fn test_threshold_bounds_accepted() {
        for threshold in [0.0, 1.0] {
            let mut config = valid();
            config.fraud.scam_keyword_threshold = threshold;
            assert!(config.validate().is_ok());
        }
    }

    #[test]
    fn test_no_axis_enabled_rejected() {
        let config = AuditConfig {
            axes: AxisToggles::none(),
            ..valid()
        };
        assert!(config.validate().unwrap_err().to_string().contains("axis"));
    }

    #[test]
    fn test_non_http_url_rejected() {
        for url in ["ftp://example.com", "not a url", "", "mailto:a@b.com"] {
            let err = AuditConfig::new(url).validate().unwrap_err();
            assert_eq!(err.kind(), FailureKind::InvalidConfig, "{url}");
        }
    }

    #[test]
    fn test_axis_toggles_only() {
        let toggles = AxisToggles::only(Axis::Seo);
        assert_eq!(toggles.enabled(), vec![Axis::Seo]);
        assert!(!toggles.is_enabled(Axis::Fraud));
    }

    #[test]
    fn test_for_url_keeps_settings() {
        let template = AuditConfig {
            max_pages: 3,
            ..valid()
        };
        let config = template.for_url("https://other.example/");
        assert_eq!(config.url, "https://other.example/");
        assert_eq!(config.max_pages, 3);
    }

    #[test]
    fn test_brand_profile_owns() {
        let brand = BrandProfile::new("PayPal", &["paypal.com"]);
        assert_eq!(brand.name, "paypal");
        assert!(brand.owns("PayPal.com"));
        assert!(!brand.owns("paypal-secure.com"));
    }
}
