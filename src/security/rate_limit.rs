//! Fixed-window rate limiting for authentication endpoints.
//!
//! Each key gets a counter that lives for one window. The first request
//! after the window elapses starts a new window with a count of one. Bursts
//! of up to twice the limit are possible across a window boundary; this is
//! coarse abuse protection, not quota enforcement.

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::time;

use crate::config::RateLimitConfig;
use crate::http::error::GatewayError;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Outcome of one rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub limited: bool,
    /// Time until the key's window resets.
    pub retry_after: Duration,
}

/// In-memory fixed-window limiter.
///
/// Updates to a single key happen under its shard lock, so concurrent
/// requests from one client never lose increments.
pub struct FixedWindowLimiter {
    windows: DashMap<String, Window>,
    window: Duration,
    max_requests: u32,
    max_entries: usize,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32, max_entries: usize) -> Self {
        Self {
            windows: DashMap::new(),
            window,
            max_requests,
            max_entries,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            Duration::from_secs(config.window_secs),
            config.max_requests,
            config.max_entries,
        )
    }

    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Count one request for `key` at `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        if !self.windows.contains_key(key) && self.windows.len() >= self.max_entries {
            self.evict_expired(now);
            if self.windows.len() >= self.max_entries {
                tracing::warn!(
                    client = %key,
                    entries = self.windows.len(),
                    "Rate limit table full, rejecting untracked client"
                );
                return RateDecision {
                    limited: true,
                    retry_after: self.window,
                };
            }
        }

        let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            reset_at: now + self.window,
        });

        if now >= entry.reset_at {
            *entry = Window {
                count: 1,
                reset_at: now + self.window,
            };
        } else {
            entry.count = entry.count.saturating_add(1);
        }

        RateDecision {
            limited: entry.count > self.max_requests,
            retry_after: entry.reset_at.saturating_duration_since(now),
        }
    }

    /// Drop every window that has elapsed. Returns how many were removed.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, w| w.reset_at > now);
        let removed = before.saturating_sub(self.windows.len());
        metrics::record_rate_limit_entries(self.windows.len());
        removed
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Periodically evict expired windows until shutdown.
    pub async fn run_sweeper(self: Arc<Self>, every: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval(every);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.evict_expired(Instant::now());
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.len(), "Evicted expired rate limit windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Middleware limiting authentication attempts per client.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !state.rate_limit_enabled {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let key = state.client_ip.client_key(request.headers(), peer);

    let decision = state.limiter.check(&key);
    if decision.limited {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        metrics::record_rate_limited(request.uri().path());
        return GatewayError::RateLimited {
            retry_after_secs: decision.retry_after.as_secs().max(1),
        }
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn limiter(max: u32) -> FixedWindowLimiter {
        FixedWindowLimiter::new(Duration::from_secs(60), max, 1000)
    }

    #[test]
    fn test_allows_max_then_limits() {
        let limiter = limiter(10);
        let now = Instant::now();
        for i in 1..=10 {
            assert!(!limiter.check_at("1.2.3.4", now).limited, "request {i}");
        }
        assert!(limiter.check_at("1.2.3.4", now).limited);
        assert!(!limiter.check_at("5.6.7.8", now).limited);
    }

    #[test]
    fn test_window_resets() {
        let limiter = limiter(2);
        let start = Instant::now();
        limiter.check_at("k", start);
        limiter.check_at("k", start);
        assert!(limiter.check_at("k", start + Duration::from_secs(59)).limited);

        let decision = limiter.check_at("k", start + Duration::from_secs(60));
        assert!(!decision.limited);
        assert_eq!(decision.retry_after, Duration::from_secs(60));
    }

    #[test]
    fn test_retry_after_counts_down() {
        let limiter = limiter(1);
        let start = Instant::now();
        limiter.check_at("k", start);
        let decision = limiter.check_at("k", start + Duration::from_secs(45));
        assert!(decision.limited);
        assert_eq!(decision.retry_after, Duration::from_secs(15));
    }

    #[test]
    fn test_eviction() {
        let limiter = limiter(5);
        let start = Instant::now();
        limiter.check_at("a", start);
        limiter.check_at("b", start + Duration::from_secs(30));
        assert_eq!(limiter.evict_expired(start + Duration::from_secs(61)), 1);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_full_table_evicts_then_rejects() {
        let limiter = FixedWindowLimiter::new(Duration::from_secs(60), 5, 2);
        let start = Instant::now();
        limiter.check_at("a", start);
        limiter.check_at("b", start);
        assert!(limiter.check_at("c", start).limited);
        assert!(!limiter.check_at("a", start).limited);

        let later = start + Duration::from_secs(61);
        assert!(!limiter.check_at("c", later).limited);
        assert_eq!(limiter.len(), 1);
    }

    #[test]
    fn test_concurrent_increments_are_counted() {
        let limiter = Arc::new(limiter(801));
        let now = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        limiter.check_at("shared", now);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(!limiter.check_at("shared", now).limited);
        assert!(limiter.check_at("shared", now).limited);
    }

    proptest! {
        #[test]
        fn prop_windowing_law(max in 1u32..50, windows in 1usize..4) {
            let limiter = limiter(max);
            let start = Instant::now();
            for w in 0..windows {
                let at = start + Duration::from_secs(60 * w as u64);
                for _ in 0..max {
                    prop_assert!(!limiter.check_at("k", at).limited);
                }
                prop_assert!(limiter.check_at("k", at).limited);
            }
        }
    }
}
