//! Upstream API access.
//!
//! # Data Flow
//! ```text
//! handler (token, path, body)
//!     → client.rs (one HTTP call, bounded timeout)
//!     → JSON value, or UpstreamError (Unreachable | Rejected)
//! ```

pub mod client;

pub use client::{error_message, UpstreamClient, UpstreamError};
