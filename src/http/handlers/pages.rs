//! Renderer stand-in for page navigations that passed the route guard.

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::http::server::AppState;

pub async fn render(State(state): State<AppState>, uri: Uri) -> Response {
    let path = uri.path();
    if state.guard.is_known_page(path) {
        Json(json!({ "page": path })).into_response()
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found." }))).into_response()
    }
}
