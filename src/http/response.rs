//! Response handling and error mapping.
//!
//! # Responsibilities
//! - Relay the upstream answer to the client unchanged
//! - Map per-request failures to HTTP status codes
//!
//! # Design Decisions
//! - Only status, `Content-Type` and body are relayed
//! - Upstream transport failures result in 502 Bad Gateway
//! - Bodies over the configured limit result in 413 Payload Too Large
//! - Errors never touch the statistics store

use axum::extract::rejection::BytesRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::upstream::{UpstreamError, UpstreamResponse};

/// Everything that can go wrong while proxying one request.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to issue identity token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] BytesRejection),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::BodyRead(rejection) => rejection.status(),
            GatewayError::Upstream(UpstreamError::Closed) => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Upstream(UpstreamError::Config(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Upstream(UpstreamError::Transport(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match status {
            StatusCode::BAD_GATEWAY => "Upstream request failed",
            StatusCode::SERVICE_UNAVAILABLE => "Upstream unavailable",
            StatusCode::PAYLOAD_TOO_LARGE => "Request body too large",
            StatusCode::BAD_REQUEST => "Unreadable request body",
            _ => "Internal gateway error",
        };
        (status, message).into_response()
    }
}

/// Turn the upstream answer into the client response.
pub fn relay(upstream: UpstreamResponse) -> Response {
    (
        upstream.status,
        [(header::CONTENT_TYPE, upstream.content_type)],
        upstream.body,
    )
        .into_response()
}
