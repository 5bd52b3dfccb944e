use axum::{
    body::Bytes,
    extract::{Path, State},
    http::Method,
    Extension, Json,
};
use serde_json::{json, Value};

use crate::http::auth::Authenticated;
use crate::http::error::GatewayError;
use crate::http::handlers::parse_json;
use crate::http::server::AppState;

/// Ids are interpolated into upstream paths, so only URL-safe characters pass.
fn workout_path(id: &str) -> Result<String, GatewayError> {
    let valid = !id.is_empty()
        && id.len() <= 128
        && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if valid {
        Ok(format!("/workouts/{id}"))
    } else {
        Err(GatewayError::InvalidInput("Invalid workout id.".to_string()))
    }
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Value>, GatewayError> {
    let path = workout_path(&id)?;
    let changes: Value = parse_json(&body)?;

    let updated = state
        .upstream
        .send(Method::PUT, &path, Some(&auth.token), Some(&changes))
        .await
        .map_err(|e| GatewayError::from_upstream(e, "Could not update the workout."))?;
    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    Path(id): Path<String>,
) -> Result<Json<Value>, GatewayError> {
    let path = workout_path(&id)?;

    state
        .upstream
        .send(Method::DELETE, &path, Some(&auth.token), None)
        .await
        .map_err(|e| GatewayError::from_upstream(e, "Could not delete the workout."))?;
    Ok(Json(json!({ "ok": true })))
}
