//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build shared state from configuration
//! - Mount the JSON surface under `/api`, page navigations as the fallback
//! - Wire up middleware (tracing, request id, body limit, metrics, deadline)
//! - Run the rate-limit sweeper alongside the server
//! - Drain gracefully on shutdown

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::validation::{resolve_base_url, ValidationError};
use crate::config::{GatewayConfig, VerificationMode};
use crate::http::auth::require_session;
use crate::http::deadline::request_deadline;
use crate::http::handlers::{auth, diets, directory, health, onboarding, pages, session, workouts};
use crate::http::request::{make_request_span, UuidRequestId, X_REQUEST_ID};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::track_metrics;
use crate::routing::{route_guard_middleware, RouteGuard};
use crate::security::{rate_limit_middleware, ClientIpResolver, FixedWindowLimiter};
use crate::session::{CookieSpec, SessionCodec};
use crate::upstream::UpstreamClient;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("failed to build upstream client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<SessionCodec>,
    pub session_cookie: Arc<CookieSpec>,
    pub onboarding_cookie: Arc<CookieSpec>,
    pub guard: Arc<RouteGuard>,
    pub limiter: Arc<FixedWindowLimiter>,
    pub client_ip: Arc<ClientIpResolver>,
    pub rate_limit_enabled: bool,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, StartupError> {
        let secret = config.session.jwt_secret.as_deref().filter(|s| !s.is_empty());
        let codec = match (config.session.verification, secret) {
            (VerificationMode::Signature, Some(secret)) => SessionCodec::with_secret(secret.as_bytes()),
            (VerificationMode::Signature, None) => return Err(ValidationError::MissingJwtSecret.into()),
            (VerificationMode::Structural, _) => {
                tracing::warn!("Session signatures are NOT verified (structural mode)");
                SessionCodec::structural()
            }
        };

        let secure = config.is_production();
        let upstream = UpstreamClient::new(
            resolve_base_url(config)?,
            Duration::from_secs(config.timeouts.upstream_secs),
            Duration::from_secs(config.timeouts.connect_secs),
        )?;

        Ok(Self {
            codec: Arc::new(codec),
            session_cookie: Arc::new(CookieSpec::new(
                config.session.cookie_name.clone(),
                Duration::from_secs(config.session.max_age_secs),
                secure,
            )),
            onboarding_cookie: Arc::new(CookieSpec::new(
                config.onboarding.cookie_name.clone(),
                Duration::from_secs(config.onboarding.max_age_secs),
                secure,
            )),
            guard: Arc::new(RouteGuard::default()),
            limiter: Arc::new(FixedWindowLimiter::from_config(&config.rate_limit)),
            client_ip: Arc::new(ClientIpResolver::from_config(&config.client_ip)),
            rate_limit_enabled: config.rate_limit.enabled,
            upstream,
        })
    }
}

/// HTTP server for the session gateway.
pub struct GatewayServer {
    router: Router,
    state: AppState,
    config: GatewayConfig,
}

impl GatewayServer {
    pub fn new(config: GatewayConfig) -> Result<Self, StartupError> {
        let state = AppState::from_config(&config)?;
        let router = build_router(&config, state.clone());
        Ok(Self { router, state, config })
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.state.upstream.base_url(),
            verification = ?self.state.codec.mode(),
            "HTTP server starting"
        );

        if self.state.rate_limit_enabled {
            let every = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
            tokio::spawn(self.state.limiter.clone().run_sweeper(every, shutdown.subscribe()));
        }

        let mut stop = shutdown.subscribe();
        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the router with all middleware layers.
///
/// Only the credential exchange carries a whole-request deadline. Forwarded
/// routes rely on the per-call upstream timeout so that onboarding and
/// search can degrade step by step.
pub fn build_router(config: &GatewayConfig, state: AppState) -> Router {
    let deadline = Duration::from_secs(config.timeouts.request_secs);
    let credentials = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .route_layer(middleware::from_fn_with_state(deadline, request_deadline));

    let forwarded = Router::new()
        .route("/diets", post(diets::create))
        .route("/workouts/{id}", put(workouts::update).delete(workouts::remove))
        .route("/professionals/search", get(directory::search_professionals))
        .route("/clients/search", get(directory::search_clients))
        .route("/onboarding/complete", post(onboarding::complete))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    let api = Router::new()
        .route("/session", post(session::create).delete(session::destroy))
        .merge(credentials)
        .merge(forwarded)
        .route_layer(middleware::from_fn(track_metrics));

    let pages = Router::new()
        .fallback(pages::render)
        .layer(middleware::from_fn_with_state(state.clone(), route_guard_middleware))
        .layer(middleware::from_fn(track_metrics))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .fallback_service(pages)
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
        .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.upstream.base_url = Some("http://127.0.0.1:9".to_string());
        config.session.jwt_secret = Some("unit-secret".to_string());
        config
    }

    #[tokio::test]
    async fn test_signature_mode_needs_secret() {
        let mut config = config();
        config.session.jwt_secret = None;
        assert!(matches!(
            AppState::from_config(&config),
            Err(StartupError::Config(ValidationError::MissingJwtSecret))
        ));

        config.session.verification = VerificationMode::Structural;
        let state = AppState::from_config(&config).unwrap();
        assert_eq!(state.codec.mode(), VerificationMode::Structural);
    }

    #[tokio::test]
    async fn test_empty_secret_is_missing() {
        let mut config = config();
        config.session.jwt_secret = Some(String::new());
        assert!(matches!(
            AppState::from_config(&config),
            Err(StartupError::Config(ValidationError::MissingJwtSecret))
        ));
        assert!(GatewayServer::new(config).is_err());
    }

    #[tokio::test]
    async fn test_pages_are_guarded() {
        let router = GatewayServer::new(config()).unwrap().router();

        let res = router
            .clone()
            .oneshot(Request::get("/progress/week").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.headers()[header::LOCATION], "/login");
        assert!(res.headers().contains_key("x-request-id"));

        let res = router
            .oneshot(Request::get("/register").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_requires_session_before_upstream() {
        let router = GatewayServer::new(config()).unwrap().router();
        let res = router
            .oneshot(
                Request::put("/api/workouts/w1")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"title":"Legs"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
