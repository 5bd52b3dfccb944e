//! Error taxonomy of the browser-facing surface.
//!
//! Every failure leaves the gateway as `{"message": string}` with the status
//! of its taxonomy entry. Upstream business errors keep their status.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::onboarding::OnboardingInputError;
use crate::upstream::UpstreamError;

/// User-facing message for every upstream connectivity failure.
pub const UNREACHABLE_MESSAGE: &str = "Could not reach the server. Please try again.";

/// Fallback when an upstream rejection carries no message.
pub const GENERIC_REJECTION: &str = "The request could not be completed.";

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client data failed validation (400).
    #[error("{0}")]
    InvalidInput(String),

    /// Missing or invalid session (401).
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid session, wrong role (403).
    #[error("{0}")]
    Forbidden(String),

    /// Too many authentication attempts (429).
    #[error("Too many attempts. Try again in {retry_after_secs} seconds.")]
    RateLimited { retry_after_secs: u64 },

    /// Network failure, timeout, or unparseable upstream body (502).
    #[error("{}", UNREACHABLE_MESSAGE)]
    UpstreamUnreachable,

    /// Upstream business error, status passed through.
    #[error("{message}")]
    UpstreamRejected { status: StatusCode, message: String },
}

impl GatewayError {
    pub fn invalid_session() -> Self {
        GatewayError::Unauthenticated("Invalid session.".to_string())
    }

    /// Convert an upstream failure, using `fallback` when the upstream
    /// rejection has no message of its own.
    pub fn from_upstream(err: UpstreamError, fallback: &str) -> Self {
        match err {
            UpstreamError::Unreachable(cause) => {
                tracing::debug!(cause = %cause, "Upstream unreachable");
                GatewayError::UpstreamUnreachable
            }
            UpstreamError::Rejected { status, message } => GatewayError::UpstreamRejected {
                status,
                message: message.unwrap_or_else(|| fallback.to_string()),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::UpstreamUnreachable => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamRejected { status, .. } => *status,
        }
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        GatewayError::from_upstream(err, GENERIC_REJECTION)
    }
}

impl From<OnboardingInputError> for GatewayError {
    fn from(err: OnboardingInputError) -> Self {
        GatewayError::InvalidInput(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, Json(json!({ "message": self.to_string() }))).into_response();
        if let GatewayError::RateLimited { retry_after_secs } = self {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(GatewayError::InvalidInput("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(GatewayError::invalid_session().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(GatewayError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            GatewayError::RateLimited { retry_after_secs: 5 }.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(GatewayError::UpstreamUnreachable.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_rejection_passthrough() {
        let err = GatewayError::from_upstream(
            UpstreamError::Rejected {
                status: StatusCode::CONFLICT,
                message: None,
            },
            "Registration failed.",
        );
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Registration failed.");
    }

    #[test]
    fn test_unreachable_hides_cause() {
        let err: GatewayError = UpstreamError::Unreachable("connection refused 10.0.0.3".into()).into();
        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = GatewayError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.headers()[header::RETRY_AFTER], "42");
    }
}
