//! Per-client throttling of the public auth routes
//!
//! Each (route, client) pair gets a fixed window; requests past the route's
//! quota inside the window are rejected with `TooManyRequests`.

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::security_log;
use crate::state::AppState;

/// Windows idle longer than this are dropped by [`RateLimiter::prune`]
pub const IDLE_WINDOW_TTL: Duration = Duration::from_secs(300);

/// Public routes that are throttled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthRoute {
    Login,
    RegisterMember,
}

impl AuthRoute {
    /// (requests allowed, window length)
    pub fn quota(self) -> (u32, Duration) {
        match self {
            Self::Login => (5, Duration::from_secs(60)),
            Self::RegisterMember => (3, Duration::from_secs(60)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::RegisterMember => "register_member",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    opened_at: Instant,
    hits: u32,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<(AuthRoute, String), Window>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one request from `client`; `false` once the quota is spent
    pub async fn allow(&self, route: AuthRoute, client: &str) -> bool {
        let (max_hits, length) = route.quota();
        let now = Instant::now();
        let mut windows = self.windows.lock().await;

        let window = windows
            .entry((route, client.to_owned()))
            .or_insert(Window { opened_at: now, hits: 0 });
        if now.duration_since(window.opened_at) >= length {
            *window = Window { opened_at: now, hits: 0 };
        }
        window.hits += 1;
        window.hits <= max_hits
    }

    /// Drop windows opened more than `max_age` ago
    pub async fn prune(&self, max_age: Duration) {
        let now = Instant::now();
        self.windows
            .lock()
            .await
            .retain(|_, window| now.duration_since(window.opened_at) < max_age);
    }

    pub async fn tracked(&self) -> usize {
        self.windows.lock().await.len()
    }
}

/// First `X-Forwarded-For` hop, else the socket peer, else `"unknown"`
fn client_key(request: &Request) -> String {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|hop| !hop.is_empty());
    if let Some(hop) = forwarded {
        return hop.to_owned();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or_else(|| "unknown".to_owned(), |ConnectInfo(addr)| addr.ip().to_string())
}

async fn throttle(
    state: &AppState,
    route: AuthRoute,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_key(&request);
    if !state.rate_limiter.allow(route, &client).await {
        security_log!("WARN", "rate_limited", route = route.as_str(), client = client);
        return Err(AppError::new(ErrorCode::TooManyRequests));
    }
    Ok(next.run(request).await)
}

pub async fn login_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    throttle(&state, AuthRoute::Login, request, next).await
}

pub async fn register_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    throttle(&state, AuthRoute::RegisterMember, request, next).await
}
