use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;

use crate::http::auth::Authenticated;
use crate::http::error::GatewayError;
use crate::http::handlers::parse_json;
use crate::http::server::AppState;

/// Create a diet plan. A non-blank `title` is required before anything is
/// sent upstream.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let diet: Value = parse_json(&body)?;
    if !has_title(&diet) {
        return Err(GatewayError::InvalidInput("Title is required.".to_string()));
    }

    let created = state
        .upstream
        .send(Method::POST, "/diets", Some(&auth.token), Some(&diet))
        .await
        .map_err(|e| GatewayError::from_upstream(e, "Could not create the diet."))?;

    Ok((StatusCode::CREATED, Json(created)).into_response())
}

fn has_title(diet: &Value) -> bool {
    diet.get("title")
        .and_then(Value::as_str)
        .is_some_and(|t| !t.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_title_required() {
        assert!(has_title(&json!({"title": "Cutting"})));
        assert!(!has_title(&json!({"title": "   "})));
        assert!(!has_title(&json!({"title": 3})));
        assert!(!has_title(&json!({"dailyCalories": 2000})));
        assert!(!has_title(&json!([])));
    }
}
