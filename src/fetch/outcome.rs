//! Fetch request and outcome types.

use reqwest::StatusCode;
use url::Url;

use crate::relay::UpstreamBody;

/// What the caller wants from the upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// GET the resource and relay its body.
    FullContent,
    /// Report the status only; never transfer a body.
    ExistenceCheck,
}

impl FetchMode {
    pub fn from_flag(check_exists_only: bool) -> Self {
        if check_exists_only {
            FetchMode::ExistenceCheck
        } else {
            FetchMode::FullContent
        }
    }

    /// Metric label.
    pub fn as_str(self) -> &'static str {
        match self {
            FetchMode::FullContent => "content",
            FetchMode::ExistenceCheck => "exists",
        }
    }
}

/// A validated proxy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub target: Url,
    pub mode: FetchMode,
}

/// Result of one Fetcher invocation.
#[derive(Debug)]
pub enum UpstreamOutcome {
    /// Status to report without a body: a non-success GET, or any existence check.
    Status(StatusCode),
    /// The upstream declared a body larger than the ceiling. The body was not read.
    TooLarge { declared_len: u64 },
    /// Successful GET whose body is ready to relay.
    Content(UpstreamContent),
}

impl UpstreamOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            UpstreamOutcome::Status(status) => *status,
            UpstreamOutcome::TooLarge { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UpstreamOutcome::Content(content) => content.status,
        }
    }
}

/// Successful upstream response with an unread body.
#[derive(Debug)]
pub struct UpstreamContent {
    pub status: StatusCode,
    /// Media type to send downstream, with the fallback applied.
    pub content_type: String,
    /// Media type as declared by the upstream, if any.
    pub media_type: Option<String>,
    pub content_length: Option<u64>,
    pub body: UpstreamBody,
}

/// Bare `type/subtype` of a Content-Type header value; `None` when blank.
pub fn media_type_of(header: &str) -> Option<String> {
    let essence = header.split(';').next().unwrap_or_default().trim();
    if essence.is_empty() {
        None
    } else {
        Some(essence.to_string())
    }
}
