//! Shared utilities for integration tests: mock upstreams, a gateway on an
//! ephemeral port, and token signing.

#![allow(dead_code)]

use axum::{extract::Request, middleware::Next, Router};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;

use session_gateway::config::GatewayConfig;
use session_gateway::{GatewayServer, Shutdown};

pub const SECRET: &str = "integration-secret";

/// A mock upstream API that records every call it receives.
pub struct MockUpstream {
    pub addr: SocketAddr,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockUpstream {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Calls received so far, as `"METHOD /path"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

/// Serve `router` on an ephemeral port.
pub async fn start_mock_upstream(router: Router) -> MockUpstream {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorder = calls.clone();
    let router = router.layer(axum::middleware::from_fn(move |req: Request, next: Next| {
        let recorder = recorder.clone();
        async move {
            recorder
                .lock()
                .unwrap()
                .push(format!("{} {}", req.method(), req.uri().path()));
            next.run(req).await
        }
    }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    MockUpstream { addr, calls }
}

/// An address nothing listens on.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// A running gateway. Shut down on drop.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_gateway(upstream_url: &str) -> TestGateway {
    start_gateway_with(upstream_url, |_| {}).await
}

pub async fn start_gateway_with<F>(upstream_url: &str, configure: F) -> TestGateway
where
    F: FnOnce(&mut GatewayConfig),
{
    let mut config = GatewayConfig::default();
    config.upstream.base_url = Some(upstream_url.to_string());
    config.session.jwt_secret = Some(SECRET.to_string());
    config.timeouts.upstream_secs = 2;
    config.timeouts.connect_secs = 1;
    configure(&mut config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = GatewayServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();
    tokio::spawn(async move {
        let _ = server.run(listener, &server_shutdown).await;
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap();

    TestGateway {
        addr,
        client,
        shutdown,
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Token signed with [`SECRET`], valid for an hour.
pub fn sign_token(subject: &str, email: &str, role: &str) -> String {
    sign_with(subject, email, role, SECRET, now_secs() + 3600)
}

pub fn sign_with(subject: &str, email: &str, role: &str, secret: &str, exp: u64) -> String {
    let claims = json!({
        "sub": subject,
        "email": email,
        "role": role,
        "iat": now_secs(),
        "exp": exp,
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

pub fn expired_token(subject: &str, email: &str, role: &str) -> String {
    sign_with(subject, email, role, SECRET, now_secs() - 60)
}

/// `Cookie` header value carrying a session token.
pub fn session_cookie(token: &str) -> String {
    format!("session={token}")
}
