//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → GET /status  → handlers.rs → stats snapshot as JSON
//!     → POST /{any}  → handlers.rs
//!         → identity (issue token)
//!         → request.rs (body present?)
//!         → upstream (forward to fixed endpoint)
//!         → stats increment
//!         → response.rs (relay status, content type, body)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use response::GatewayError;
pub use server::{build_router, AppState, HttpServer};
