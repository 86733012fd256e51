//! Size-bounded HTTP content proxy library.
//!
//! Fetches untrusted, user-supplied URLs and relays them to the caller with a
//! hard byte ceiling and a single operation-wide deadline.

pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::schema::ProxyConfig;
pub use fetch::Fetcher;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::BoundedRelayStream;
