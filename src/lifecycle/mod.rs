//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (HttpServer::new):
//!     Config → stats store (start_ts = now, count = 0) → open upstream session
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight → Close upstream session
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then shared resources, then listener
//! - The upstream session closes only after the server stopped serving

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
