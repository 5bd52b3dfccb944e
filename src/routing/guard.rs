//! Route guard for page navigations.
//!
//! # State Machine
//! ```text
//! protected prefix  && no valid session  → REDIRECT(/login)
//! /login | /register && valid session    → REDIRECT(/dashboard)
//! otherwise                              → ALLOW
//! ```
//!
//! Rules are evaluated in order and the guard is total. Session validity is
//! decided locally (cookie + codec); the guard never calls the upstream.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::matcher::PathPrefixMatcher;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/dashboard";

/// Page prefixes that need a session to render.
pub const PROTECTED_PREFIXES: [&str; 9] = [
    "/dashboard",
    "/professionals",
    "/clients",
    "/workouts",
    "/diets",
    "/progress",
    "/subscriptions",
    "/profile",
    "/onboarding",
];

/// Outcome for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    protected: Vec<PathPrefixMatcher>,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(PROTECTED_PREFIXES)
    }
}

impl RouteGuard {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected: prefixes.into_iter().map(PathPrefixMatcher::new).collect(),
        }
    }

    pub fn is_protected(&self, path: &str) -> bool {
        self.protected.iter().any(|m| m.matches(path))
    }

    fn is_auth_page(path: &str) -> bool {
        path == LOGIN_PATH || path == REGISTER_PATH
    }

    /// Whether the decision for `path` depends on the session at all.
    pub fn consults_session(&self, path: &str) -> bool {
        Self::is_auth_page(path) || self.is_protected(path)
    }

    /// Pages the renderer knows about.
    pub fn is_known_page(&self, path: &str) -> bool {
        path == "/" || self.consults_session(path)
    }

    pub fn evaluate(&self, path: &str, has_valid_session: bool) -> GuardDecision {
        if self.is_protected(path) && !has_valid_session {
            return GuardDecision::Redirect(LOGIN_PATH);
        }
        if Self::is_auth_page(path) && has_valid_session {
            return GuardDecision::Redirect(HOME_PATH);
        }
        GuardDecision::Allow
    }
}

/// Middleware applied to page routes only.
pub async fn route_guard_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    let session = if state.guard.consults_session(&path) {
        state
            .session_cookie
            .read(request.headers())
            .and_then(|token| state.codec.decode(&token))
    } else {
        None
    };

    match state.guard.evaluate(&path, session.is_some()) {
        GuardDecision::Allow => {
            if let Some(session) = session {
                request.extensions_mut().insert(session);
            }
            next.run(request).await
        }
        GuardDecision::Redirect(target) => {
            tracing::debug!(path = %path, target = target, "Route guard redirect");
            metrics::record_guard_redirect(target);
            Redirect::temporary(target).into_response()
        }
    }
}
