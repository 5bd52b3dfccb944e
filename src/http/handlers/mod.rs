//! Browser-facing JSON handlers.

pub mod auth;
pub mod diets;
pub mod directory;
pub mod health;
pub mod onboarding;
pub mod pages;
pub mod session;
pub mod workouts;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::http::error::GatewayError;

/// Decode a JSON request body. Malformed bodies are client errors.
pub(crate) fn parse_json<T: DeserializeOwned>(body: &Bytes) -> Result<T, GatewayError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        GatewayError::InvalidInput("Invalid payload.".to_string())
    })
}
