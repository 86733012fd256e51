//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID)
//! - Build the shared Fetcher once
//! - Serve until a shutdown signal arrives

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{FetchConfig, ProxyConfig};
use crate::fetch::{FetchError, Fetcher};
use crate::http::request::{MakeRequestUuidV4, SafeUrlQuery, X_REQUEST_ID};
use crate::http::response::{outcome_response, ProxyError};
use crate::observability::metrics;

/// Path the proxy endpoint is mounted on.
pub const SAFE_URL_PATH: &str = "/api/GetSafeUrl";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<Fetcher>,
}

/// HTTP server for the safe URL proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(config.fetch.clone())?;
        Ok(Self::with_fetcher(config, fetcher))
    }

    /// Create a server around an already built fetcher.
    pub fn with_fetcher(config: ProxyConfig, fetcher: Fetcher) -> Self {
        let state = AppState {
            fetcher: Arc::new(fetcher),
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route(SAFE_URL_PATH, get(safe_url_handler))
            .route("/healthz", get(health_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuidV4))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Stops when `shutdown` fires; in-flight requests are drained first.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            timeout_ms = self.config.fetch.timeout_ms,
            max_size_bytes = self.config.fetch.max_size_bytes,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown requested");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Proxy handler.
/// Validates the target, fetches it, and relays the bounded body.
async fn safe_url_handler(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> Response {
    let start_time = Instant::now();
    let config: &FetchConfig = state.fetcher.config();

    let request = match SafeUrlQuery::from_query(raw.as_deref()).into_fetch_request() {
        Ok(request) => request,
        Err(err) => {
            tracing::error!(error = %err, "Rejecting request");
            metrics::record_request("invalid", err.status().as_u16(), start_time);
            return err.into_response();
        }
    };

    tracing::debug!(url = %request.target, mode = request.mode.as_str(), "Fetching upstream");

    let deadline = state.fetcher.deadline();
    match state.fetcher.fetch(&request.target, request.mode, deadline).await {
        Ok(outcome) => {
            metrics::record_request(request.mode.as_str(), outcome.status().as_u16(), start_time);
            outcome_response(outcome, config.max_size_bytes, deadline)
        }
        Err(err) => {
            let err = ProxyError::from(err);
            metrics::record_request(request.mode.as_str(), err.status().as_u16(), start_time);
            err.into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
