//! HTTP header name constants.
//!
//! Names are lowercase because `Headers` stores keys lowercased.

pub const HEADER_LOCATION: &str = "location";
pub const HEADER_CONTENT_ENCODING: &str = "content-encoding";

// Security headers
/// Content Security Policy header
pub const HEADER_CONTENT_SECURITY_POLICY: &str = "content-security-policy";
/// HTTP Strict Transport Security header
pub const HEADER_STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
pub const HEADER_X_CONTENT_TYPE_OPTIONS: &str = "x-content-type-options";
pub const HEADER_X_FRAME_OPTIONS: &str = "x-frame-options";
pub const HEADER_REFERRER_POLICY: &str = "referrer-policy";

/// Security headers counted by the `security_headers_present` metric.
pub const SECURITY_HEADERS: &[&str] = &[
    HEADER_CONTENT_SECURITY_POLICY,
    HEADER_STRICT_TRANSPORT_SECURITY,
    HEADER_X_CONTENT_TYPE_OPTIONS,
    HEADER_X_FRAME_OPTIONS,
    HEADER_REFERRER_POLICY,
];

// Caching
pub const HEADER_CACHE_CONTROL: &str = "cache-control";
pub const HEADER_EXPIRES: &str = "expires";
pub const HEADER_ETAG: &str = "etag";
pub const HEADER_LAST_MODIFIED: &str = "last-modified";

/// Any one of these counts as a caching policy.
pub const CACHING_HEADERS: &[&str] = &[
    HEADER_CACHE_CONTROL,
    HEADER_EXPIRES,
    HEADER_ETAG,
    HEADER_LAST_MODIFIED,
];
