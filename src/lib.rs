//! JWT gateway library.
//!
//! A small reverse proxy that signs every POST with a fresh identity token,
//! forwards it to one fixed upstream and relays the answer unchanged.

pub mod config;
pub mod http;
pub mod identity;
pub mod lifecycle;
pub mod observability;
pub mod stats;
pub mod upstream;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
