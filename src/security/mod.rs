//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming auth request (login, register):
//!     → client_ip.rs (derive key, honouring the trusted-proxy boundary)
//!     → rate_limit.rs (fixed window per key)
//!     → Pass to handler, or 429
//! ```
//!
//! # Design Decisions
//! - Only authentication endpoints are limited
//! - Forwarded headers are untrusted unless the peer is a known proxy
//! - The limiter table is bounded and swept in the background

pub mod client_ip;
pub mod rate_limit;

pub use client_ip::ClientIpResolver;
pub use rate_limit::{rate_limit_middleware, FixedWindowLimiter, RateDecision};
