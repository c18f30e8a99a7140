//! Command-line interface definition.

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::constants::{DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_PAGES, DEFAULT_USER_AGENT};
use crate::config::types::{AuditConfig, AxisToggles, LogFormat, LogLevel};

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Audit one site, seed page only
/// web_quality_audit audit https://example.com --max-pages 1
///
/// # Audit several sites, four at a time, without the fraud axis
/// web_quality_audit batch https://a.example https://b.example --concurrency 4 --no-fraud
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "web_quality_audit",
    about = "Audits web pages for performance, SEO, accessibility, security, mobile and fraud-risk issues."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Audit a single URL
    Audit {
        url: String,

        #[command(flatten)]
        audit: AuditArgs,
    },
    /// Audit several URLs concurrently
    Batch {
        #[arg(required = true)]
        urls: Vec<String>,

        /// Maximum audits running at once
        #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENCY)]
        concurrency: usize,

        #[command(flatten)]
        audit: AuditArgs,
    },
}

/// Per-audit settings shared by both subcommands.
#[derive(Debug, Clone, Args)]
pub struct AuditArgs {
    /// Audit deadline in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Pages to audit per URL, seed included
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    pub max_pages: usize,

    /// Skip the performance axis
    #[arg(long)]
    pub no_performance: bool,

    /// Skip the SEO axis
    #[arg(long)]
    pub no_seo: bool,

    /// Skip the accessibility axis
    #[arg(long)]
    pub no_accessibility: bool,

    /// Skip the security axis
    #[arg(long)]
    pub no_security: bool,

    /// Skip the mobile axis
    #[arg(long)]
    pub no_mobile: bool,

    /// Skip the fraud axis
    #[arg(long)]
    pub no_fraud: bool,
}

impl AuditArgs {
    /// Builds the audit configuration for `url`; everything not exposed on the
    /// command line keeps its default.
    pub fn to_config(&self, url: impl Into<String>) -> AuditConfig {
        AuditConfig {
            timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone(),
            max_pages: self.max_pages,
            axes: AxisToggles {
                performance: !self.no_performance,
                seo: !self.no_seo,
                accessibility: !self.no_accessibility,
                security: !self.no_security,
                mobile: !self.no_mobile,
                fraud: !self.no_fraud,
            },
            ..AuditConfig::new(url)
        }
    }
}
