//! Session cookie issue and removal.

use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::http::error::GatewayError;
use crate::http::handlers::parse_json;
use crate::http::server::AppState;
use crate::session::cookie::is_cookie_safe;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody {
    #[serde(default)]
    access_token: Option<String>,
}

/// Store a freshly issued token in the session cookie. Tokens the configured
/// codec would not accept are refused rather than stored.
pub async fn create(State(state): State<AppState>, body: Bytes) -> Result<Response, GatewayError> {
    let body: SessionBody = parse_json(&body)?;
    let token = body
        .access_token
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GatewayError::InvalidInput("accessToken is required.".to_string()))?;

    if !is_cookie_safe(&token) {
        return Err(GatewayError::InvalidInput("Invalid access token.".to_string()));
    }
    let Some(session) = state.codec.decode(&token) else {
        return Err(GatewayError::InvalidInput("Invalid access token.".to_string()));
    };
    let cookie = state
        .session_cookie
        .header_value(&token)
        .ok_or_else(|| GatewayError::InvalidInput("Invalid access token.".to_string()))?;

    tracing::info!(subject = %session.subject, role = %session.role, "Session established");
    Ok(([(header::SET_COOKIE, cookie)], Json(json!({ "ok": true }))).into_response())
}

pub async fn destroy(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.session_cookie.clear())],
        Json(json!({ "ok": true })),
    )
        .into_response()
}
