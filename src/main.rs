//! Safe URL proxy.
//!
//! Fetches a user-supplied URL on behalf of a web client and streams it back,
//! never relaying more than the configured byte ceiling.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                   SAFE URL PROXY                      │
//!   GET /api/        │  ┌─────────┐    ┌─────────┐    ┌───────────────┐     │
//!   GetSafeUrl?url=  │  │  http   │───▶│ request │───▶│    fetch      │─────┼──▶ Upstream
//!   ─────────────────┼─▶│ server  │    │ (query) │    │ HEAD / GET    │◀────┼─── server
//!                    │  └─────────┘    └─────────┘    └──────┬────────┘     │
//!                    │                                       │              │
//!   ◀────────────────┼───────────── response ◀──── relay (bounded) ◀───────┘ │
//!                    │                                                       │
//!                    │  config · observability · lifecycle                   │
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use safe_url_proxy::config::{load_config, ProxyConfig};
use safe_url_proxy::lifecycle::startup;
use safe_url_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "safe-url-proxy")]
#[command(about = "Size-bounded proxy for untrusted image URLs", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "SAFE_URL_PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("failed to load {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => ProxyConfig::default(),
    };

    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        timeout_ms = config.fetch.timeout_ms,
        max_size_bytes = config.fetch.max_size_bytes,
        "safe-url-proxy starting"
    );

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Proxy terminated with error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Shutdown complete");
    ExitCode::SUCCESS
}
