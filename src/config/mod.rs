//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (overlay API_BASE_URL, JWT_SECRET, APP_ENV, ...)
//!     → validation.rs (semantic checks, base URL normalization)
//!     → GatewayConfig (validated, immutable)
//!     → shared with subsystems at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ClientIpConfig, Environment, GatewayConfig, LogFormat, ObservabilityConfig, RateLimitConfig,
    SessionConfig, VerificationMode,
};
