//! Fetch error definitions.

use reqwest::header::InvalidHeaderValue;
use thiserror::Error;

/// Errors that can occur while talking to the upstream.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The operation deadline elapsed before the upstream answered.
    #[error("upstream request timed out")]
    Timeout,

    /// DNS, connect, TLS or protocol failure.
    #[error("upstream unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// The configured user agent cannot be sent as a header.
    #[error("invalid user agent: {0}")]
    InvalidUserAgent(#[from] InvalidHeaderValue),

    /// The outbound client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Unreachable(err)
        }
    }
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
