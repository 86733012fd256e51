//! Byte sources the relay can wrap.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::{StreamExt, TryStreamExt};
use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::io::StreamReader;

/// A readable body whose total length may be known up front.
pub trait ByteSource: AsyncRead + Unpin {
    /// Total length of the source, if declared. Not bounded by the relay.
    fn total_len(&self) -> Option<u64>;
}

/// Body of an upstream GET response, exposed as `AsyncRead`.
pub struct UpstreamBody {
    reader: StreamReader<BoxStream<'static, io::Result<Bytes>>, Bytes>,
    content_length: Option<u64>,
}

impl UpstreamBody {
    pub fn from_response(response: reqwest::Response) -> Self {
        let content_length = response.content_length();
        let stream = response.bytes_stream().map_err(io::Error::other).boxed();
        Self {
            reader: StreamReader::new(stream),
            content_length,
        }
    }
}

impl std::fmt::Debug for UpstreamBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamBody")
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl AsyncRead for UpstreamBody {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.reader).poll_read(cx, buf)
    }
}

impl ByteSource for UpstreamBody {
    fn total_len(&self) -> Option<u64> {
        self.content_length
    }
}

impl<T: AsRef<[u8]> + Unpin> ByteSource for io::Cursor<T> {
    fn total_len(&self) -> Option<u64> {
        Some(self.get_ref().as_ref().len() as u64)
    }
}
