//! Size-bounded relay stream.
//!
//! # Responsibilities
//! - Forward bytes from an inner source without ever exceeding a ceiling
//! - Fail the read after the ceiling is reached instead of truncating silently
//! - Enforce the request deadline on body reads
//! - Reject seek and write operations
//!
//! # States
//! ```text
//! Idle → Reading → { Reading | ExhaustedOk | ExhaustedOverflow | Aborted }
//! ```
//! The last three are terminal. Entering any of them drops the inner source.

use std::future::Future;
use std::io::{self, SeekFrom};
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncSeek, AsyncWrite, ReadBuf};
use tokio::time::{Instant, Sleep};

use crate::relay::error::RelayError;
use crate::relay::source::ByteSource;

/// Relay lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Constructed, nothing read yet.
    Idle,
    /// At least one read has been issued.
    Reading,
    /// Inner source finished within the ceiling.
    ExhaustedOk,
    /// A read was attempted after the ceiling was reached.
    ExhaustedOverflow,
    /// The inner source failed or the deadline elapsed.
    Aborted,
}

impl RelayState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RelayState::ExhaustedOk | RelayState::ExhaustedOverflow | RelayState::Aborted
        )
    }
}

/// Read-only stream that delivers at most `ceiling` bytes from `inner`.
pub struct BoundedRelayStream<R> {
    inner: Option<R>,
    ceiling: u64,
    delivered: u64,
    media_type: Option<String>,
    state: RelayState,
    deadline: Option<Pin<Box<Sleep>>>,
}

impl<R> BoundedRelayStream<R> {
    pub fn new(inner: R, ceiling: u64, media_type: Option<String>) -> Self {
        Self {
            inner: Some(inner),
            ceiling,
            delivered: 0,
            media_type,
            state: RelayState::Idle,
            deadline: None,
        }
    }

    /// Abort reads that are still running at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(Box::pin(tokio::time::sleep_until(deadline)));
        self
    }

    /// Media type carried alongside the stream. Not enforced.
    pub fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Bytes handed to callers so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    /// Current read position; identical to [`delivered`](Self::delivered).
    pub fn position(&self) -> u64 {
        self.delivered
    }

    pub fn state(&self) -> RelayState {
        self.state
    }

    /// Whether the inner source is still held.
    pub fn holds_source(&self) -> bool {
        self.inner.is_some()
    }

    pub fn set_len(&mut self, _len: u64) -> Result<(), RelayError> {
        Err(RelayError::Unsupported("set_len"))
    }

    pub fn set_position(&mut self, _position: u64) -> Result<(), RelayError> {
        Err(RelayError::Unsupported("set_position"))
    }

    fn finish(&mut self, state: RelayState) {
        self.state = state;
        self.inner = None;
        self.deadline = None;
    }
}

impl<R: ByteSource> BoundedRelayStream<R> {
    /// Declared length of the inner source. Passed through, not bounded.
    pub fn total_len(&self) -> Option<u64> {
        self.inner.as_ref().and_then(|inner| inner.total_len())
    }
}

impl<R> std::fmt::Debug for BoundedRelayStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedRelayStream")
            .field("ceiling", &self.ceiling)
            .field("delivered", &self.delivered)
            .field("media_type", &self.media_type)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for BoundedRelayStream<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        match this.state {
            RelayState::ExhaustedOk => return Poll::Ready(Ok(())),
            RelayState::ExhaustedOverflow => {
                return Poll::Ready(Err(RelayError::ExceedsMaximumSize {
                    ceiling: this.ceiling,
                }
                .into()))
            }
            RelayState::Aborted => return Poll::Ready(Err(RelayError::Aborted.into())),
            RelayState::Idle | RelayState::Reading => {}
        }

        if let Some(deadline) = this.deadline.as_mut() {
            if deadline.as_mut().poll(cx).is_ready() {
                let delivered = this.delivered;
                this.finish(RelayState::Aborted);
                return Poll::Ready(Err(RelayError::TimedOut { delivered }.into()));
            }
        }

        if this.delivered >= this.ceiling {
            this.finish(RelayState::ExhaustedOverflow);
            return Poll::Ready(Err(RelayError::ExceedsMaximumSize {
                ceiling: this.ceiling,
            }
            .into()));
        }

        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(Ok(()));
        };
        this.state = RelayState::Reading;

        let allowance = usize::try_from(this.ceiling - this.delivered).unwrap_or(usize::MAX);
        let limit = buf.remaining().min(allowance);
        if limit == 0 {
            return Poll::Ready(Ok(()));
        }

        let mut clamped = ReadBuf::new(buf.initialize_unfilled_to(limit));
        match Pin::new(inner).poll_read(cx, &mut clamped) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Err(err)) => {
                this.finish(RelayState::Aborted);
                return Poll::Ready(Err(err));
            }
            Poll::Ready(Ok(())) => {}
        }
        let read = clamped.filled().len();
        buf.advance(read);

        this.delivered += read as u64;
        if read == 0 {
            this.finish(RelayState::ExhaustedOk);
        }
        Poll::Ready(Ok(()))
    }
}

impl<R> AsyncWrite for BoundedRelayStream<R>
where
    R: Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(RelayError::Unsupported("write").into()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl<R> AsyncSeek for BoundedRelayStream<R>
where
    R: Unpin,
{
    fn start_seek(self: Pin<&mut Self>, _position: SeekFrom) -> io::Result<()> {
        Err(RelayError::Unsupported("seek").into())
    }

    fn poll_complete(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<u64>> {
        Poll::Ready(Ok(self.delivered))
    }
}
