use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{Extension, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::endpoints::response::json_error;
use crate::middleware::client::{client_ip, TrustedProxies};

/// Fixed-window request counter keyed by client address.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: u32,
    state: Arc<Mutex<Windows>>,
}

#[derive(Debug)]
struct Windows {
    clients: HashMap<String, FixedWindow>,
    last_sweep: Instant,
}

#[derive(Debug, Clone, Copy)]
struct FixedWindow {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            state: Arc::new(Mutex::new(Windows {
                clients: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Counts one request for `client`; false once the window's budget is spent.
    pub fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now())
    }

    pub fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if now.saturating_duration_since(state.last_sweep) >= self.window {
            let window = self.window;
            state
                .clients
                .retain(|_, entry| now.saturating_duration_since(entry.started) < window);
            state.last_sweep = now;
        }

        let entry = state.clients.entry(client.to_string()).or_insert(FixedWindow {
            started: now,
            count: 0,
        });
        if now.saturating_duration_since(entry.started) >= self.window {
            *entry = FixedWindow { started: now, count: 0 };
        }

        entry.count = entry.count.saturating_add(1);
        entry.count <= self.max_requests
    }

    pub fn tracked_clients(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clients
            .len()
    }
}

pub async fn rate_limit(
    Extension(limiter): Extension<RateLimiter>,
    Extension(trusted): Extension<TrustedProxies>,
    req: Request,
    next: Next,
) -> Response {
    let client = client_ip(&req, &trusted);
    if !limiter.check(&client) {
        tracing::warn!(client = %client, path = %req.uri().path(), "rate limit exceeded");
        return json_error(StatusCode::TOO_MANY_REQUESTS, "Too many requests");
    }
    next.run(req).await
}
