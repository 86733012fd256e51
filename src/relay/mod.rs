//! Bounded relay subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamBody (reqwest byte stream as AsyncRead)
//!     → bounded.rs (clamp every read to the remaining allowance)
//!     → ReaderStream → axum response body
//! ```
//!
//! # Design Decisions
//! - The ceiling is checked before every read, not once at the end
//! - Reads are clamped so a single read can never cross the ceiling
//! - The inner source is dropped as soon as the relay reaches a terminal state

pub mod bounded;
pub mod error;
pub mod source;

pub use bounded::{BoundedRelayStream, RelayState};
pub use error::RelayError;
pub use source::{ByteSource, UpstreamBody};
