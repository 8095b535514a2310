//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler (query string, optional body, token)
//!     → session.rs (POST base_url + fixed path, token header)
//!     → upstream service
//!     → UpstreamResponse (status, content type, raw body)
//! ```

pub mod session;

pub use session::{UpstreamError, UpstreamResponse, UpstreamSession, DEFAULT_CONTENT_TYPE};
