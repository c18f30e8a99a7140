//! Error type definitions.
//!
//! Only configuration, fetch, parse and deadline errors terminate an audit.
//! Analyzer errors are absorbed by the analyzer wrapper and surface as issues.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use serde::{Deserialize, Serialize};
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// Auditor options that can never work (e.g. a zero concurrency cap).
    #[error("Invalid auditor options: {0}")]
    OptionsError(String),
}

/// Why a fetch did not yield a usable response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Timeout,
    Dns,
    Connect,
    TooManyRedirects,
    InvalidUrl,
    Body,
    Request,
    Other,
}

impl FetchErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Dns => "DNS resolution failure",
            FetchErrorKind::Connect => "connection failure",
            FetchErrorKind::TooManyRedirects => "too many redirects",
            FetchErrorKind::InvalidUrl => "invalid URL",
            FetchErrorKind::Body => "body read failure",
            FetchErrorKind::Request => "request failure",
            FetchErrorKind::Other => "other fetch failure",
        }
    }

    /// Transient network conditions worth another attempt.
    ///
    /// Timeouts are not retried: the audit deadline already bounds them and a
    /// retry would only eat into the remaining budget.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            FetchErrorKind::Dns | FetchErrorKind::Connect | FetchErrorKind::Request
        )
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure recorded on a `FetchResult`. Fetchers report failures as data.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct FetchFailure {
    pub kind: FetchErrorKind,
    pub message: String,
}

impl FetchFailure {
    pub fn new(kind: FetchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The document model could not be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("response body is empty")]
    EmptyBody,
}

/// An analyzer could not finish. Never escapes the analyzer wrapper.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("analyzer task aborted: {0}")]
    Aborted(String),
}

/// Notable events counted by `AuditStats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum AuditEvent {
    AuditCompleted,
    AuditFailed,
    AnalyzerDegraded,
    FetchRetried,
    PageCrawled,
    CrawlPageFailed,
}

impl AuditEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEvent::AuditCompleted => "audits completed",
            AuditEvent::AuditFailed => "audits failed",
            AuditEvent::AnalyzerDegraded => "degraded analyzer results",
            AuditEvent::FetchRetried => "fetch retries",
            AuditEvent::PageCrawled => "crawled pages",
            AuditEvent::CrawlPageFailed => "crawl page failures",
        }
    }
}

/// Serializable category of a terminal audit failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidConfig,
    Fetch,
    Parse,
    Timeout,
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::InvalidConfig => "invalid config",
            FailureKind::Fetch => "fetch error",
            FailureKind::Parse => "parse error",
            FailureKind::Timeout => "timeout",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

/// Terminal audit failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    #[error("invalid audit configuration: {0}")]
    InvalidConfig(String),

    #[error("fetch failed ({kind}): {message}")]
    Fetch {
        kind: FetchErrorKind,
        message: String,
    },

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("audit exceeded its deadline of {:.1}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The auditor was closed while the audit waited for admission.
    #[error("audit cancelled before it was admitted")]
    Cancelled,
}

impl AuditError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AuditError::InvalidConfig(_) => FailureKind::InvalidConfig,
            AuditError::Fetch { .. } => FailureKind::Fetch,
            AuditError::Parse(_) => FailureKind::Parse,
            AuditError::Timeout(_) => FailureKind::Timeout,
            AuditError::Cancelled => FailureKind::Cancelled,
        }
    }

    /// Maps a fetch failure to the terminal error; fetch timeouts become `Timeout`.
    pub fn from_fetch(failure: &FetchFailure, deadline: Duration) -> Self {
        match failure.kind {
            FetchErrorKind::Timeout => AuditError::Timeout(deadline),
            kind => AuditError::Fetch {
                kind,
                message: failure.message.clone(),
            },
        }
    }
}
