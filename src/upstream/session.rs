//! Shared connection to the fixed upstream.
//!
//! # Responsibilities
//! - Own the pooled HTTP client bound to the upstream base URL
//! - Build the single outbound call for a proxied request
//! - Relay status, content type and raw body back unchanged
//!
//! # Design Decisions
//! - The inbound path is dropped; every call goes to `base_url + path`
//! - The inbound query string is copied byte for byte
//! - No retries; a transport error is returned to the caller as is
//! - Closed exactly once at shutdown, after in-flight requests drained

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::UpstreamConfig;

/// Content type reported when the upstream does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors raised while talking to the upstream.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("invalid upstream configuration: {0}")]
    Config(String),
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream session is closed")]
    Closed,
}

/// What the upstream answered, exactly as received.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: HeaderValue,
    pub body: Bytes,
}

/// Reusable client session bound to one upstream endpoint.
pub struct UpstreamSession {
    client: reqwest::Client,
    endpoint: Url,
    token_header: HeaderName,
    closed: AtomicBool,
}

impl UpstreamSession {
    /// Open a session from configuration.
    pub fn open(config: &UpstreamConfig) -> Result<Self, UpstreamError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| UpstreamError::Config(format!("base_url: {}", e)))?;
        let endpoint = base
            .join(&config.path)
            .map_err(|e| UpstreamError::Config(format!("path: {}", e)))?;
        let token_header = HeaderName::from_bytes(config.token_header.as_bytes())
            .map_err(|e| UpstreamError::Config(format!("token_header: {}", e)))?;

        let mut builder = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        tracing::info!(endpoint = %endpoint, "Upstream session opened");

        Ok(Self {
            client,
            endpoint,
            token_header,
            closed: AtomicBool::new(false),
        })
    }

    /// The URL every request is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Close the session. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        let first = !self.closed.swap(true, Ordering::AcqRel);
        if first {
            tracing::info!(endpoint = %self.endpoint, "Upstream session closed");
        }
        first
    }

    /// Build the outbound URL for an inbound raw query string.
    pub fn target_url(&self, query: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        url.set_query(query);
        url
    }

    /// Send one request upstream.
    ///
    /// `body` is `None` when the caller sent no body at all, in which case
    /// none is sent upstream either. `Some` of an empty buffer is sent with
    /// `Content-Length: 0`.
    pub async fn forward(
        &self,
        query: Option<&str>,
        body: Option<Bytes>,
        token: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        if self.is_closed() {
            return Err(UpstreamError::Closed);
        }

        let token = HeaderValue::from_str(token)
            .map_err(|e| UpstreamError::Config(format!("token header value: {}", e)))?;

        let mut request = self
            .client
            .post(self.target_url(query))
            .header(self.token_header.clone(), token);
        if let Some(body) = body {
            // reqwest omits the length for an empty body; keep the framing.
            request = request.header(header::CONTENT_LENGTH, body.len()).body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        let body = response.bytes().await?;

        tracing::debug!(
            status = %status,
            bytes = body.len(),
            "Upstream responded"
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
