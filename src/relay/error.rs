//! Relay error definitions.

use std::io;

use thiserror::Error;

/// Errors raised by [`BoundedRelayStream`](super::BoundedRelayStream).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The ceiling was reached and another read was attempted.
    #[error("stream exceeds maximum allowed size of {ceiling} bytes")]
    ExceedsMaximumSize { ceiling: u64 },

    /// The relay is read-only and forward-only.
    #[error("{0} is not supported on a relay stream")]
    Unsupported(&'static str),

    /// The request deadline elapsed while the body was still being relayed.
    #[error("relay deadline elapsed after {delivered} bytes")]
    TimedOut { delivered: u64 },

    /// The inner source failed earlier; the relay no longer reads.
    #[error("relay aborted after an earlier failure")]
    Aborted,
}

impl RelayError {
    /// Recover a relay error that was surfaced through an `io::Error`.
    pub fn from_io(err: &io::Error) -> Option<&RelayError> {
        err.get_ref()?.downcast_ref::<RelayError>()
    }
}

impl From<RelayError> for io::Error {
    fn from(err: RelayError) -> Self {
        let kind = match err {
            RelayError::Unsupported(_) => io::ErrorKind::Unsupported,
            RelayError::TimedOut { .. } => io::ErrorKind::TimedOut,
            RelayError::ExceedsMaximumSize { .. } | RelayError::Aborted => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}
