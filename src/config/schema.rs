//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Browser-like signature sent on every outbound request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36 Edg/139.0.0.0 PWABuilderHttpAgent";

/// Operation-wide deadline for one proxied request.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Largest body the relay will ever deliver (10 MiB).
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Media type reported when the upstream does not declare one.
pub const DEFAULT_FALLBACK_CONTENT_TYPE: &str = "image/png";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Outbound fetch limits and client signature.
    pub fetch: FetchConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Outbound fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total time budget for the upstream call(s) and body relay, in milliseconds.
    pub timeout_ms: u64,

    /// Byte ceiling for a relayed body. Declared lengths above this are rejected
    /// up front; undeclared bodies are cut off mid-stream.
    pub max_size_bytes: u64,

    /// User-Agent header installed as a client default.
    pub user_agent: String,

    /// Content type reported when the upstream sends none.
    pub fallback_content_type: String,

    /// Honour HTTP(S)_PROXY environment variables for outbound calls.
    pub use_system_proxy: bool,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_size_bytes: DEFAULT_MAX_SIZE_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fallback_content_type: DEFAULT_FALLBACK_CONTENT_TYPE.to_string(),
            use_system_proxy: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.fetch.timeout(), Duration::from_secs(30));
        assert_eq!(config.fetch.max_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.fetch.fallback_content_type, "image/png");
        assert!(config.fetch.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [fetch]
            timeout_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.fetch.timeout_ms, 500);
        assert_eq!(config.fetch.max_size_bytes, DEFAULT_MAX_SIZE_BYTES);
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }
}
