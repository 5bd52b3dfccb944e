//! Whole-request deadline for routes that make a single upstream call.
//!
//! Routes that orchestrate several upstream calls are not wrapped: each of
//! their calls is already bounded by the upstream client, and a step that
//! times out becomes a warning or an empty partial result instead of
//! failing the request.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::time::Duration;

use crate::http::error::GatewayError;

/// Cancel the request once `limit` elapses and answer `UpstreamUnreachable`.
pub async fn request_deadline(
    State(limit): State<Duration>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    match tokio::time::timeout(limit, next.run(request)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(path = %path, limit_ms = limit.as_millis() as u64, "Request deadline exceeded");
            GatewayError::UpstreamUnreachable.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, middleware, routing::get, Router};
    use tower::ServiceExt;

    use crate::http::error::UNREACHABLE_MESSAGE;

    fn router(limit: Duration) -> Router {
        Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    "late"
                }),
            )
            .route("/fast", get(|| async { "done" }))
            .route_layer(middleware::from_fn_with_state(limit, request_deadline))
    }

    #[tokio::test]
    async fn test_elapsed_deadline_is_unreachable() {
        let res = router(Duration::from_millis(50))
            .oneshot(Request::get("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_GATEWAY);

        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_fast_request_passes() {
        let res = router(Duration::from_secs(5))
            .oneshot(Request::get("/fast").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
