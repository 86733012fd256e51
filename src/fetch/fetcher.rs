//! Upstream fetcher.
//!
//! # Responsibilities
//! - GET the target for full-content requests, rejecting oversized declared bodies
//! - HEAD the target for existence checks, falling back to GET when HEAD is refused
//! - Bound every outbound call by the request deadline
//!
//! # Design Decisions
//! - The fallback GET reads headers only; the body is dropped unread
//! - Timeout is reported as its own error, never as an upstream status
//! - No retries

use reqwest::header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use tokio::time::Instant;
use url::Url;

use crate::config::FetchConfig;
use crate::fetch::client::build_client;
use crate::fetch::error::{FetchError, FetchResult};
use crate::fetch::outcome::{media_type_of, FetchMode, UpstreamContent, UpstreamOutcome};
use crate::relay::UpstreamBody;

/// Performs upstream requests with a fixed client and fixed limits.
///
/// Built once at startup and shared read-only across requests.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Deadline for a request starting now.
    pub fn deadline(&self) -> Instant {
        Instant::now() + self.config.timeout()
    }

    /// Run the request(s) `mode` calls for, giving up at `deadline`.
    pub async fn fetch(
        &self,
        target: &Url,
        mode: FetchMode,
        deadline: Instant,
    ) -> FetchResult<UpstreamOutcome> {
        let work = async {
            match mode {
                FetchMode::FullContent => self.fetch_content(target).await,
                FetchMode::ExistenceCheck => self.check_exists(target).await,
            }
        };

        match tokio::time::timeout_at(deadline, work).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(url = %target, mode = mode.as_str(), "Upstream request timed out");
                Err(FetchError::Timeout)
            }
        }
    }

    async fn fetch_content(&self, target: &Url) -> FetchResult<UpstreamOutcome> {
        let response = self.send(Method::GET, target).await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %target, status = %status, "Upstream returned non-success status");
            return Ok(UpstreamOutcome::Status(status));
        }

        let content_length = declared_length(response.headers());
        if let Some(declared_len) = content_length {
            if declared_len > self.config.max_size_bytes {
                tracing::error!(
                    url = %target,
                    declared_len,
                    max_size_bytes = self.config.max_size_bytes,
                    "Declared content length exceeds maximum size"
                );
                return Ok(UpstreamOutcome::TooLarge { declared_len });
            }
        }

        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(media_type_of);
        let content_type = media_type
            .clone()
            .unwrap_or_else(|| self.config.fallback_content_type.clone());

        Ok(UpstreamOutcome::Content(UpstreamContent {
            status,
            content_type,
            media_type,
            content_length,
            body: UpstreamBody::from_response(response),
        }))
    }

    async fn check_exists(&self, target: &Url) -> FetchResult<UpstreamOutcome> {
        let head = self.send(Method::HEAD, target).await?;
        let status = head.status();

        if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
            tracing::warn!(url = %target, status = %status, "HEAD not supported, falling back to GET");
            let get = self.send(Method::GET, target).await?;
            return Ok(UpstreamOutcome::Status(get.status()));
        }

        Ok(UpstreamOutcome::Status(status))
    }

    async fn send(&self, method: Method, target: &Url) -> FetchResult<reqwest::Response> {
        self.client
            .request(method, target.clone())
            .send()
            .await
            .map_err(|err| {
                tracing::error!(url = %target, error = %err, "Upstream request failed");
                FetchError::from(err)
            })
    }
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<u64>().ok())
}
