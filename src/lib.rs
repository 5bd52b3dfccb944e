//! Edge session gateway for the fitness dashboard.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌────────────────────────────────────────────────────────┐
//!                        │                    SESSION GATEWAY                      │
//!                        │                                                         │
//!   Browser request      │  ┌───────────┐   ┌────────────┐   ┌──────────────────┐  │
//!   ─────────────────────┼─▶│   http    │──▶│ rate limit │──▶│ auth handlers    │──┼──▶ Upstream
//!                        │  │  server   │   │ (auth only)│   └──────────────────┘  │     API
//!                        │  └─────┬─────┘   └────────────┘                          │
//!                        │        │         ┌────────────┐   ┌──────────────────┐  │
//!                        │        ├────────▶│  require   │──▶│ aggregate /      │──┼──▶
//!                        │        │         │  session   │   │ onboarding       │  │
//!                        │        │         └────────────┘   └──────────────────┘  │
//!                        │        │         ┌────────────┐   ┌──────────────────┐  │
//!                        │        └────────▶│route guard │──▶│ page hand-off    │  │
//!                        │                  └────────────┘   └──────────────────┘  │
//!                        │                                                         │
//!                        │  Cross-cutting: config · session codec · observability  │
//!                        │                 · lifecycle                             │
//!                        └────────────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod session;
pub mod upstream;

// Domain
pub mod aggregate;
pub mod onboarding;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
