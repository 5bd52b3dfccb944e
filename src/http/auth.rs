//! Authenticated forwarding.
//!
//! `require_session` runs in front of every JSON API handler that talks to
//! the upstream on the caller's behalf. Without a session cookie that the
//! configured codec accepts, the request ends here with 401 and the handler
//! never runs, so no upstream call is made.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::error::GatewayError;
use crate::http::server::AppState;
use crate::session::{Role, Session};

/// Bearer token and decoded claims attached to authenticated requests.
#[derive(Clone, Debug)]
pub struct Authenticated {
    pub token: String,
    pub session: Session,
}

impl Authenticated {
    /// Reject callers whose role is not `role`.
    pub fn require_role(&self, role: Role, message: &str) -> Result<(), GatewayError> {
        if self.session.role == role {
            Ok(())
        } else {
            Err(GatewayError::Forbidden(message.to_string()))
        }
    }
}

pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = state.session_cookie.read(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Missing session cookie");
        return GatewayError::invalid_session().into_response();
    };

    let Some(session) = state.codec.decode(&token) else {
        tracing::debug!(path = %request.uri().path(), "Session cookie rejected by codec");
        return GatewayError::invalid_session().into_response();
    };

    request.extensions_mut().insert(Authenticated { token, session });
    next.run(request).await
}
