//! HTTP client for the upstream API.
//!
//! # Responsibilities
//! - Attach `Authorization: Bearer <token>` when a token is given
//! - Enforce a per-call deadline
//! - Normalize error bodies (`{message: string | string[]}`) to one string
//!
//! # Design Decisions
//! - Exactly one attempt per call; no retries at this layer
//! - Network errors, timeouts and non-JSON success bodies are all
//!   "unreachable"; the cause is logged, never returned to the browser
//! - Dropping the returned future cancels the in-flight request

use axum::http::{header, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure, timeout, or an unparseable success body.
    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    /// Upstream answered with a non-2xx status.
    #[error("upstream rejected request with status {status}")]
    Rejected {
        status: StatusCode,
        message: Option<String>,
    },
}

impl UpstreamError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Rejected { status, .. } => Some(*status),
            UpstreamError::Unreachable(_) => None,
        }
    }
}

/// Client bound to one upstream base URL.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// `base_url` must already be normalized (scheme present, no trailing slash).
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Value, UpstreamError> {
        self.send(Method::GET, path, Some(token), None).await
    }

    pub async fn put(&self, path: &str, token: &str, body: &Value) -> Result<Value, UpstreamError> {
        self.send(Method::PUT, path, Some(token), Some(body)).await
    }

    /// Issue one request. A 204 or empty success body yields `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(method = %method, path = %path, timeout = e.is_timeout(), error = %e, "Upstream request failed");
                metrics::record_upstream("unreachable");
                return Err(UpstreamError::Unreachable(e.to_string()));
            }
        };

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(method = %method, path = %path, error = %e, "Failed to read upstream body");
            metrics::record_upstream("unreachable");
            UpstreamError::Unreachable(e.to_string())
        })?;

        if !status.is_success() {
            tracing::debug!(method = %method, path = %path, status = %status, "Upstream rejected request");
            metrics::record_upstream("rejected");
            return Err(UpstreamError::Rejected {
                status,
                message: error_message(&bytes),
            });
        }

        metrics::record_upstream("ok");
        if status == StatusCode::NO_CONTENT || bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(method = %method, path = %path, error = %e, "Upstream returned a non-JSON body");
            UpstreamError::Unreachable(format!("non-JSON body: {e}"))
        })
    }
}

/// Extract `message` from an error body, joining arrays with `", "`.
pub fn error_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let message = match value.get("message")? {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!message.is_empty()).then_some(message)
}
