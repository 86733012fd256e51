//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, handler)
//!     → request.rs (query → FetchRequest, request ID)
//!     → fetch::Fetcher (upstream call under the deadline)
//!     → response.rs (outcome/error → status, bounded body)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuidV4, SafeUrlQuery, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
