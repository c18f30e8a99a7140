//! Outgoing request headers.

/// Browser-like request headers sent with every fetch.
///
/// Sites commonly serve a stripped-down page (or a block page) to clients
/// that do not look like a browser, which would skew every audit axis.
/// Only `gzip` and `deflate` are advertised because those are the encodings
/// the fetcher can decode itself.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    pub(crate) const ACCEPT: &'static str =
        "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
    pub(crate) const ACCEPT_LANGUAGE: &'static str = "en-US,en;q=0.9";
    pub(crate) const ACCEPT_ENCODING: &'static str = "gzip, deflate";

    /// Applies the standard request headers and the per-audit User-Agent.
    pub(crate) fn apply_to_request_builder(
        builder: reqwest::RequestBuilder,
        user_agent: &str,
    ) -> reqwest::RequestBuilder {
        builder
            .header(reqwest::header::USER_AGENT, user_agent)
            .header(reqwest::header::ACCEPT, Self::ACCEPT)
            .header(reqwest::header::ACCEPT_LANGUAGE, Self::ACCEPT_LANGUAGE)
            .header(reqwest::header::ACCEPT_ENCODING, Self::ACCEPT_ENCODING)
            .header(reqwest::header::UPGRADE_INSECURE_REQUESTS, "1")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_sets_user_agent_and_encoding() {
        let client = reqwest::Client::new();
        let request = RequestHeaders::apply_to_request_builder(
            client.get("https://example.com/"),
            "AuditBot/2.0",
        )
        .build()
        .expect("request builds");
        let headers = request.headers();
        assert_eq!(
            headers.get(reqwest::header::USER_AGENT).unwrap(),
            "AuditBot/2.0"
        );
        assert_eq!(
            headers.get(reqwest::header::ACCEPT_ENCODING).unwrap(),
            "gzip, deflate"
        );
    }
}
