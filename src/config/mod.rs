//! Audit configuration and constants.
//!
//! This module provides:
//! - Default values and fixed limits
//! - HTTP header name constants
//! - `AuditConfig`, `FraudConfig` and `AuditorOptions`
//! - CLI option parsing

mod cli;
mod constants;
mod headers;
mod types;

pub use cli::{AuditArgs, Cli, Command};
pub use constants::*;
pub use headers::*;
pub use types::{
    AuditConfig, AuditorOptions, AxisToggles, BrandProfile, FraudConfig, LogFormat, LogLevel,
};
