//! Identity assertion subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler
//!     → token.rs (claims: iat, jti, user, date)
//!     → HS256 signature with the configured secret
//!     → token string placed in the upstream token header
//! ```

pub mod token;

pub use token::{Claims, TokenIssuer, DEFAULT_SIGNING_SECRET};
