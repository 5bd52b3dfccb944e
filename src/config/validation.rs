//! Configuration validation.
//!
//! Serde handles syntax; this module checks semantics. Validation is a pure
//! function that reports every problem, not just the first.

use std::net::IpAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::{GatewayConfig, VerificationMode};

/// Upstream used when no base URL is configured outside production.
pub const DEVELOPMENT_BASE_URL: &str = "http://localhost:3000";

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("upstream base URL is required in production (set API_BASE_URL)")]
    MissingBaseUrl,

    #[error("upstream base URL '{0}' is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("signature verification requires a JWT secret (set JWT_SECRET)")]
    MissingJwtSecret,

    #[error("structural token checks are not allowed in production")]
    StructuralInProduction,

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("timeouts.request_secs ({request}) is shorter than timeouts.upstream_secs ({upstream})")]
    DeadlineShorterThanUpstream { request: u64, upstream: u64 },

    #[error("trusted proxy '{0}' is not an IP address")]
    InvalidTrustedProxy(String),

    #[error("bind address '{0}' is not a socket address")]
    InvalidBindAddress(String),
}

/// Normalize a raw base URL: add `https://` when no scheme is present and
/// trim one trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidBaseUrl(raw.to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let normalized = with_scheme
        .strip_suffix('/')
        .unwrap_or(&with_scheme)
        .to_string();

    Url::parse(&normalized).map_err(|_| ValidationError::InvalidBaseUrl(raw.to_string()))?;
    Ok(normalized)
}

/// Resolve the effective upstream base URL for a configuration.
pub fn resolve_base_url(config: &GatewayConfig) -> Result<String, ValidationError> {
    match config.upstream.base_url.as_deref() {
        Some(raw) if !raw.trim().is_empty() => normalize_base_url(raw),
        _ if config.is_production() => Err(ValidationError::MissingBaseUrl),
        _ => Ok(DEVELOPMENT_BASE_URL.to_string()),
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config
        .listener
        .bind_address
        .parse::<std::net::SocketAddr>()
        .is_err()
    {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Err(e) = resolve_base_url(config) {
        errors.push(e);
    }

    match config.session.verification {
        VerificationMode::Signature => {
            let has_secret = config
                .session
                .jwt_secret
                .as_deref()
                .is_some_and(|s| !s.is_empty());
            if !has_secret {
                errors.push(ValidationError::MissingJwtSecret);
            }
        }
        VerificationMode::Structural if config.is_production() => {
            errors.push(ValidationError::StructuralInProduction);
        }
        VerificationMode::Structural => {}
    }

    let positive = [
        ("rate_limit.window_secs", config.rate_limit.window_secs),
        ("rate_limit.max_requests", u64::from(config.rate_limit.max_requests)),
        ("rate_limit.max_entries", config.rate_limit.max_entries as u64),
        ("rate_limit.sweep_interval_secs", config.rate_limit.sweep_interval_secs),
        ("timeouts.request_secs", config.timeouts.request_secs),
        ("timeouts.upstream_secs", config.timeouts.upstream_secs),
        ("timeouts.connect_secs", config.timeouts.connect_secs),
        ("session.max_age_secs", config.session.max_age_secs),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.timeouts.request_secs < config.timeouts.upstream_secs {
        errors.push(ValidationError::DeadlineShorterThanUpstream {
            request: config.timeouts.request_secs,
            upstream: config.timeouts.upstream_secs,
        });
    }

    for proxy in &config.client_ip.trusted_proxies {
        if proxy.parse::<IpAddr>().is_err() {
            errors.push(ValidationError::InvalidTrustedProxy(proxy.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
