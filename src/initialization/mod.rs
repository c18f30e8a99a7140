//! Shared resource setup.
//!
//! - the HTTP client every `HttpFetcher` request goes through
//! - the process logger (binary only)

mod client;
mod logger;

pub use client::init_client;
pub use logger::init_logger_with;
