//! Credential exchange with the upstream. The gateway never sees passwords
//! beyond forwarding them; it only relays the issued token.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::http::error::GatewayError;
use crate::http::handlers::parse_json;
use crate::http::server::AppState;

pub async fn login(State(state): State<AppState>, body: Bytes) -> Result<Response, GatewayError> {
    exchange(&state, "/auth/login", &body, "Login failed.", StatusCode::OK).await
}

pub async fn register(State(state): State<AppState>, body: Bytes) -> Result<Response, GatewayError> {
    exchange(&state, "/auth/register", &body, "Registration failed.", StatusCode::CREATED).await
}

async fn exchange(
    state: &AppState,
    path: &str,
    body: &Bytes,
    fallback: &str,
    success: StatusCode,
) -> Result<Response, GatewayError> {
    let credentials: Value = parse_json(body)?;
    let issued = state
        .upstream
        .send(Method::POST, path, None, Some(&credentials))
        .await
        .map_err(|e| GatewayError::from_upstream(e, fallback))?;

    let Some(token) = access_token(&issued) else {
        tracing::warn!(path = %path, "Upstream accepted credentials without an access token");
        return Err(GatewayError::UpstreamUnreachable);
    };

    Ok((success, Json(json!({ "accessToken": token }))).into_response())
}

fn access_token(body: &Value) -> Option<&str> {
    body.get("accessToken")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}
