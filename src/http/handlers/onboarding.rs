use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::json;

use crate::http::auth::Authenticated;
use crate::http::error::GatewayError;
use crate::http::handlers::parse_json;
use crate::http::server::AppState;
use crate::onboarding::{OnboardingBody, OnboardingOrchestrator, OnboardingRequest};

/// Apply the onboarding writes and mark onboarding as done. Only invalid
/// measurements fail the request; step failures come back as warnings.
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth): Extension<Authenticated>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let body: OnboardingBody = parse_json(&body)?;
    let request = OnboardingRequest::try_from(body)?;

    let outcome = OnboardingOrchestrator::new(&state.upstream, &auth.token)
        .run(&auth.session, &request)
        .await;

    Ok((
        [(header::SET_COOKIE, state.onboarding_cookie.encode_for_transport("true"))],
        Json(json!({
            "ok": true,
            "bmi": outcome.bmi,
            "warnings": outcome.warning_messages(),
        })),
    )
        .into_response())
}
