//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the session gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API settings.
    pub upstream: UpstreamConfig,

    /// Session cookie and token verification settings.
    pub session: SessionConfig,

    /// Onboarding completion marker cookie.
    pub onboarding: OnboardingConfig,

    /// Rate limiting for authentication endpoints.
    pub rate_limit: RateLimitConfig,

    /// Client address derivation.
    pub client_ip: ClientIpConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request hardening.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Deployment context.
    pub deployment: DeploymentConfig,
}

impl GatewayConfig {
    /// True when running in a production deployment.
    pub fn is_production(&self) -> bool {
        self.deployment.environment == Environment::Production
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API. Normalized during validation.
    pub base_url: Option<String>,
}

/// Token verification strategy for session cookies.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationMode {
    /// HMAC signature verified against `jwt_secret`.
    #[default]
    Signature,
    /// Three non-empty segments only. Local development opt-in.
    Structural,
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie carrying the bearer token.
    pub cookie_name: String,

    /// Cookie max-age in seconds.
    pub max_age_secs: u64,

    /// How tokens are validated before being trusted.
    pub verification: VerificationMode,

    /// Shared HMAC secret for signature verification.
    pub jwt_secret: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".to_string(),
            max_age_secs: 60 * 60 * 24 * 7,
            verification: VerificationMode::Signature,
            jwt_secret: None,
        }
    }
}

/// Onboarding marker cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OnboardingConfig {
    pub cookie_name: String,
    pub max_age_secs: u64,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            cookie_name: "onboarding_done".to_string(),
            max_age_secs: 60 * 60 * 24 * 365,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting on authentication endpoints.
    pub enabled: bool,

    /// Fixed window length in seconds.
    pub window_secs: u64,

    /// Requests allowed per key within one window.
    pub max_requests: u32,

    /// Upper bound on tracked keys.
    pub max_entries: usize,

    /// How often expired windows are swept out of the table.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: 60,
            max_requests: 10,
            max_entries: 100_000,
            sweep_interval_secs: 60,
        }
    }
}

/// Client address derivation.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientIpConfig {
    /// Peers allowed to set `X-Forwarded-For` / `X-Real-IP`.
    pub trusted_proxies: Vec<String>,

    /// Trust forwarded headers from any peer. Only safe behind a proxy
    /// that overwrites them.
    pub trust_all_proxies: bool,
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for credential exchange (login, register), in seconds.
    /// Must not be shorter than `upstream_secs`.
    pub request_secs: u64,

    /// Deadline for a single upstream call, in seconds.
    pub upstream_secs: u64,

    /// Connection establishment timeout for upstream calls, in seconds.
    pub connect_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 15,
            connect_secs: 5,
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeploymentConfig {
    pub environment: Environment,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.session.cookie_name, "session");
        assert_eq!(config.session.max_age_secs, 604_800);
        assert_eq!(config.session.verification, VerificationMode::Signature);
        assert_eq!(config.onboarding.max_age_secs, 31_536_000);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.rate_limit.max_requests, 10);
        assert!(!config.is_production());
    }

    #[test]
    fn test_partial_toml() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [session]
            verification = "structural"

            [deployment]
            environment = "production"
            "#,
        )
        .unwrap();
        assert_eq!(config.session.verification, VerificationMode::Structural);
        assert_eq!(config.session.cookie_name, "session");
        assert!(config.is_production());
    }
}
