//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request id, request span)
//!     → /api/auth/*        → deadline.rs → rate limit → handlers::auth
//!     → /api/session       → handlers::session
//!     → /api/<forwarded>   → auth.rs (require_session) → handlers → upstream
//!     → everything else    → route guard → handlers::pages
//!     → error.rs ({"message"} bodies for every failure)
//! ```

pub mod auth;
pub mod deadline;
pub mod error;
pub mod handlers;
pub mod request;
pub mod server;

pub use auth::{require_session, Authenticated};
pub use error::GatewayError;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{build_router, AppState, GatewayServer, StartupError};
