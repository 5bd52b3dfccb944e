//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Page navigation (path, cookies)
//!     → guard.rs (classify: ALLOW or REDIRECT)
//!     → matcher.rs (protected prefix checks)
//!     → renderer hand-off, or redirect
//! ```
//!
//! # Design Decisions
//! - Protected prefixes are fixed at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - No network calls: the guard runs on every navigation

pub mod guard;
pub mod matcher;

pub use guard::{route_guard_middleware, GuardDecision, RouteGuard};
pub use matcher::PathPrefixMatcher;
