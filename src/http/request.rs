//! Inbound request inspection.
//!
//! # Responsibilities
//! - Tell a request that sent no body apart from one that sent an empty body
//! - Read the request ID stamped by the request-id layer
//!
//! # Design Decisions
//! - A body "exists" when the client framed one (`Content-Length` or
//!   `Transfer-Encoding`), even if it is zero bytes long
//! - Request ID added as early as possible for tracing

use axum::http::{header, HeaderMap};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Whether the client sent a body at all.
pub fn has_body(headers: &HeaderMap) -> bool {
    headers.contains_key(header::CONTENT_LENGTH) || headers.contains_key(header::TRANSFER_ENCODING)
}

/// The request ID assigned to this request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
