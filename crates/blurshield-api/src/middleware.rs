//! Auth, CORS, and rate-limiting layers — shaped after the original
//! codebase's `middleware.rs`, scaled down to one static API key and a
//! single global rate limiter (this service has no per-user identity).

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::state::AppState;

pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub fn rate_limiter(requests_per_second: u32) -> Arc<GlobalRateLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::new(10).unwrap()));
    Arc::new(RateLimiter::direct(quota))
}

pub async fn rate_limit_layer(
    State(limiter): State<Arc<GlobalRateLimiter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if limiter.check().is_err() {
        return (StatusCode::TOO_MANY_REQUESTS, [("Retry-After", "1")], "rate limit exceeded").into_response();
    }
    next.run(request).await
}

/// Checks `X-API-Key` against `AppState::config.api_key`. A no-op when
/// `DEV_MODE` is set or no key is configured — `ApiConfig::auth_enabled`
/// is the single source of truth for that decision.
pub async fn api_key_layer(State(state): State<AppState>, request: Request<Body>, next: Next) -> Response {
    if !state.config.auth_enabled() {
        return next.run(request).await;
    }

    let expected = state.config.api_key.as_deref().unwrap_or_default();
    let provided = request
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => next.run(request).await,
        Some(_) => (StatusCode::FORBIDDEN, "invalid API key").into_response(),
        None => (StatusCode::UNAUTHORIZED, "missing X-API-Key header").into_response(),
    }
}

/// No-wildcard CORS: explicit origins only, matching the "no wildcards"
/// configuration note this service carries unlike the original
/// codebase's permissive `*` default.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    use axum::http::{header, HeaderName, Method};

    let allowed_origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    if allowed_origins.len() != origins.len() {
        warn!("one or more ALLOWED_ORIGINS entries failed to parse and were dropped");
    }

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, HeaderName::from_static("x-api-key")])
        .allow_origin(allowed_origins)
        .max_age(std::time::Duration::from_secs(600))
}

/// Hardcoded, always-valid security headers applied to every response.
pub async fn security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Content-Type-Options", HeaderValue::from_static("nosniff"));
    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "Referrer-Policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        "Cross-Origin-Resource-Policy",
        HeaderValue::from_static("same-origin"),
    );

    response
}

/// Logs method/path/status/duration for every request except `/health`.
pub async fn request_logging(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    if uri.path() != "/health" {
        info!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            duration_ms = %start.elapsed().as_millis(),
            "request completed"
        );
    }

    response
}
