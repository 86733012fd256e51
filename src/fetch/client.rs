//! Outbound client construction.

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use crate::config::FetchConfig;
use crate::fetch::error::FetchError;

/// Build the process-wide upstream client.
///
/// The user agent is installed as a default header so every request carries
/// the same signature. HTTP/2 is negotiated over TLS when the upstream offers
/// it; plain HTTP stays on HTTP/1.1.
pub fn build_client(config: &FetchConfig) -> Result<reqwest::Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_str(&config.user_agent)?);

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if !config.use_system_proxy {
        builder = builder.no_proxy();
    }

    builder.build().map_err(FetchError::ClientBuild)
}
