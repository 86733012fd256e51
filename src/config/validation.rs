//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ceiling > 0)
//! - Check addresses parse and the client signature is a legal header value
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} is not a valid header value")]
    InvalidHeader(&'static str),
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    let fetch = &config.fetch;
    if fetch.timeout_ms == 0 {
        errors.push(ValidationError::Zero("fetch.timeout_ms"));
    }
    if fetch.max_size_bytes == 0 {
        errors.push(ValidationError::Zero("fetch.max_size_bytes"));
    }
    if fetch.user_agent.trim().is_empty() {
        errors.push(ValidationError::Empty("fetch.user_agent"));
    } else if HeaderValue::from_str(&fetch.user_agent).is_err() {
        errors.push(ValidationError::InvalidHeader("fetch.user_agent"));
    }
    if fetch.fallback_content_type.trim().is_empty() {
        errors.push(ValidationError::Empty("fetch.fallback_content_type"));
    } else if HeaderValue::from_str(&fetch.fallback_content_type).is_err() {
        errors.push(ValidationError::InvalidHeader("fetch.fallback_content_type"));
    }

    let observability = &config.observability;
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
