//! Route table.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::detect::{detect, detect_batch};
use crate::handlers::export::export;
use crate::handlers::health::health;
use crate::handlers::stream::detect_video;
use crate::handlers::upload::upload_video;
use crate::middleware::{
    api_key_layer, cors_layer, rate_limit_layer, rate_limiter, request_logging, security_headers,
};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let limiter = rate_limiter(state.config.rate_limit_rps);

    let api_routes = Router::new()
        .route("/upload-video", post(upload_video))
        .route("/detect-video/:video_id", post(detect_video))
        .route("/export/:video_id", post(export))
        .route("/detect-batch", post(detect_batch))
        .route("/detect", post(detect))
        .layer(middleware::from_fn_with_state(limiter, rate_limit_layer))
        .layer(middleware::from_fn_with_state(state.clone(), api_key_layer))
        // Upload size is enforced explicitly while streaming the
        // multipart body to disk in `handlers::upload`, against the
        // runtime-configured `MAX_UPLOAD_SIZE_MB` — axum's static
        // 2MB default would reject every video before that check runs.
        .layer(DefaultBodyLimit::disable());

    let health_routes = Router::new().route("/health", get(health));

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
