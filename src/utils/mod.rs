//! Utility functions.
//!
//! - URL validation, link resolution and crawl normalization
//! - CSS selector parsing

mod selector;
mod url;

pub use self::url::{
    normalize_batch_urls, normalize_for_crawl, normalize_url_str, resolve_link,
    validate_and_normalize_url,
};
pub use selector::parse_selector_unsafe;
