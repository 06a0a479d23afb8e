//! Per-client rate limiting, active only in production.
//!
//! The client key is the first `X-Forwarded-For` entry, then `X-Real-IP`,
//! then the peer address. The limiter's lock is released inside
//! [`RateLimiter::check`](parley_core::ratelimit::RateLimiter::check),
//! before the inner stages run.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::http::error::AppError;
use crate::state::AppState;

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.settings.rate_limit_enabled {
        let peer = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let client = client_key(req.headers(), peer);

        if !state.limiter.check(&client) {
            tracing::debug!(%client, "rate limit exceeded");
            return AppError::RateLimitExceeded.into_response();
        }
    }
    next.run(req).await
}

fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(forwarded) = header("x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).find(|ip| !ip.is_empty()) {
            return first.to_string();
        }
    }
    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_string();
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
