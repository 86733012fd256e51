//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → Metrics → Bind listener → Build server → Serve
//!
//! Shutdown (shutdown.rs):
//!     trigger() or OS signal → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last, after the outbound client is built

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
