//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the upstream base URL and fixed path
//! - Validate header names and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),
    #[error("upstream.base_url `{0}` is not an http(s) URL")]
    UpstreamUrl(String),
    #[error("upstream.path `{0}` must start with '/'")]
    UpstreamPath(String),
    #[error("upstream.token_header `{0}` is not a valid header name")]
    TokenHeader(String),
    #[error("upstream.timeout_secs must be greater than zero")]
    ZeroTimeout,
    #[error("token.secret must not be empty")]
    EmptySecret,
    #[error("token.subject must not be empty")]
    EmptySubject,
    #[error("limits.max_body_size must be greater than zero")]
    ZeroBodyLimit,
    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    match Url::parse(&config.upstream.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => errors.push(ValidationError::UpstreamUrl(config.upstream.base_url.clone())),
    }

    if !config.upstream.path.starts_with('/') {
        errors.push(ValidationError::UpstreamPath(config.upstream.path.clone()));
    }

    if HeaderName::from_bytes(config.upstream.token_header.as_bytes()).is_err() {
        errors.push(ValidationError::TokenHeader(config.upstream.token_header.clone()));
    }

    if config.upstream.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.token.secret.is_empty() {
        errors.push(ValidationError::EmptySecret);
    }
    if config.token.subject.is_empty() {
        errors.push(ValidationError::EmptySubject);
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
