//! HTTP client initialization.

use std::sync::Arc;

use reqwest::ClientBuilder;

use crate::config::AuditorOptions;

/// Initializes the shared HTTP client used for every fetch.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent and timeout defaults from options (each request overrides both)
/// - Redirects disabled, so the fetcher can record the chain hop by hop
/// - Rustls TLS backend (no native TLS)
///
/// Response bodies are not decompressed here; the fetcher decodes them itself
/// so that `Content-Encoding` stays visible to the analyzers.
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(options: &AuditorOptions) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(options.timeout)
        .user_agent(options.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_client_with_defaults() {
        assert!(init_client(&AuditorOptions::default()).is_ok());
    }
}
