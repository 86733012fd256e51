//! Response handling and transformation.
//!
//! # Responsibilities
//! - Map fetch outcomes and errors to downstream status codes
//! - Stream successful bodies through the bounded relay
//!
//! # Design Decisions
//! - Error responses carry no body; the status code is the whole answer
//! - Streaming responses avoid buffering the entire body
//! - A relay failure after headers are sent aborts the transfer, so a cut-off
//!   body is never mistaken for a complete one
//! - The relay runs on its own task behind a small channel; a client that
//!   stops reading cannot hold the upstream body past the deadline
//! - Upstream timeouts result in 504 Gateway Timeout, transport failures in 502

use std::io;

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use thiserror::Error;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_util::io::ReaderStream;

use crate::fetch::{FetchError, UpstreamContent, UpstreamOutcome};
use crate::observability::metrics;
use crate::relay::{BoundedRelayStream, RelayError};

/// Failures handled at the request boundary.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or non-absolute target URL.
    #[error("no valid URI specified: {0:?}")]
    InvalidTarget(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            ProxyError::Fetch(FetchError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Fetch(FetchError::Unreachable(_)) => StatusCode::BAD_GATEWAY,
            ProxyError::Fetch(FetchError::InvalidUserAgent(_) | FetchError::ClientBuild(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}

/// Turn a fetch outcome into the downstream response.
///
/// `ceiling` bounds the relayed body; `deadline` is the same deadline the
/// fetch ran under.
pub fn outcome_response(outcome: UpstreamOutcome, ceiling: u64, deadline: Instant) -> Response {
    match outcome {
        UpstreamOutcome::Status(status) => status.into_response(),
        UpstreamOutcome::TooLarge { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response(),
        UpstreamOutcome::Content(content) => content_response(content, ceiling, deadline),
    }
}

fn content_response(content: UpstreamContent, ceiling: u64, deadline: Instant) -> Response {
    let UpstreamContent {
        content_type,
        media_type,
        body,
        ..
    } = content;

    let relay = BoundedRelayStream::new(body, ceiling, media_type).with_deadline(deadline);

    let content_type = HeaderValue::from_str(&content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, content_type)],
        relay_body(relay, deadline),
    )
        .into_response()
}

/// Chunks buffered between the relay task and the connection.
const RELAY_BUFFER_CHUNKS: usize = 4;

/// Drive `relay` on its own task and expose it as a response body.
///
/// The task gives up at `deadline` even when nobody polls the body, which
/// drops the relay and with it the upstream source. The body only ends
/// cleanly if the relay reached the end of its source; otherwise its last
/// item is an error.
fn relay_body<R>(relay: BoundedRelayStream<R>, deadline: Instant) -> Body
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(RELAY_BUFFER_CHUNKS);
    let (done_tx, done_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let mut chunks = ReaderStream::new(relay);
        let mut relayed = 0u64;
        while let Some(chunk) = chunks.next().await {
            match &chunk {
                Ok(bytes) => relayed += bytes.len() as u64,
                Err(err) => log_relay_failure(err),
            }
            let failed = chunk.is_err();
            match tokio::time::timeout_at(deadline, tx.send(chunk)).await {
                Ok(Ok(())) if !failed => {}
                // Failure delivered, or the client went away.
                Ok(_) => return,
                Err(_) => {
                    tracing::error!(relayed, "Client stopped reading before the deadline, releasing upstream");
                    metrics::record_relay_aborted("timeout");
                    return;
                }
            }
        }
        let _ = done_tx.send(());
    });

    let body = stream::unfold((rx, Some(done_rx)), |(mut rx, done)| async move {
        if let Some(chunk) = rx.recv().await {
            return Some((chunk, (rx, done)));
        }
        match done?.await {
            Ok(()) => None,
            Err(_) => Some((Err(io::Error::from(RelayError::Aborted)), (rx, None))),
        }
    });
    Body::from_stream(body)
}

fn log_relay_failure(err: &io::Error) {
    match RelayError::from_io(err) {
        Some(RelayError::ExceedsMaximumSize { ceiling }) => {
            tracing::error!(ceiling, "Stream exceeds maximum allowed size, aborting transfer");
            metrics::record_relay_aborted("too_large");
        }
        Some(RelayError::TimedOut { delivered }) => {
            tracing::error!(delivered, "Relay deadline elapsed, aborting transfer");
            metrics::record_relay_aborted("timeout");
        }
        _ => {
            tracing::error!(error = %err, "Upstream body failed, aborting transfer");
            metrics::record_relay_aborted("upstream");
        }
    }
}
