//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{resolve_base_url, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, overlay the process
/// environment, then validate and normalize it.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    finalize(apply_env(config, |key| std::env::var(key).ok()))
}

/// Overlay environment variables on top of file configuration.
///
/// `API_BASE_URL` wins over `PUBLIC_API_URL`; both win over the file.
pub fn apply_env<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("API_BASE_URL").or_else(|| non_empty("PUBLIC_API_URL")) {
        config.upstream.base_url = Some(url);
    }
    if let Some(secret) = non_empty("JWT_SECRET") {
        config.session.jwt_secret = Some(secret);
    }
    if let Some(addr) = non_empty("BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Some(env) = non_empty("APP_ENV") {
        config.deployment.environment = if env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        };
    }
    config
}

/// Validate and store the normalized upstream base URL.
pub fn finalize(mut config: GatewayConfig) -> Result<GatewayConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    let base_url = resolve_base_url(&config).map_err(|e| ConfigError::Validation(vec![e]))?;
    config.upstream.base_url = Some(base_url);
    Ok(config)
}
