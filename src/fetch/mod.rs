//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! FetchRequest (absolute Url + mode)
//!     → fetcher.rs (HEAD/GET under the operation deadline)
//!     → outcome.rs (status-only, too-large, or content + byte source)
//!     → relay (content only)
//! ```
//!
//! # Design Decisions
//! - One reqwest client built at startup; default headers never change
//! - Non-success upstream statuses are outcomes, not errors
//! - Timeouts and transport failures are errors and stay distinct

pub mod client;
pub mod error;
pub mod fetcher;
pub mod outcome;

pub use client::build_client;
pub use error::FetchError;
pub use fetcher::Fetcher;
pub use outcome::{FetchMode, FetchRequest, UpstreamContent, UpstreamOutcome};
