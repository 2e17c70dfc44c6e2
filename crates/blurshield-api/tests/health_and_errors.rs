//! HTTP-level exercises against the real router, using a stub detector
//! pool so these don't need a YuNet model file on disk — the same
//! substitution used throughout the media crate's own tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use blurshield_media::{BoundingBox, Detector, DetectorInput, DetectorPool, MediaResult};
use serde_json::{json, Value};
use tower::ServiceExt;

use blurshield_api::{create_router, ApiConfig, AppState};

struct StubDetector;

impl Detector for StubDetector {
    fn detect(&mut self, _image: &DetectorInput) -> MediaResult<Vec<(BoundingBox, f64)>> {
        Ok(vec![])
    }
}

fn test_state(api_key: Option<&str>, dev_mode: bool) -> AppState {
    let pool = Arc::new(DetectorPool::new(1, || Ok(Box::new(StubDetector) as Box<dyn Detector>)).unwrap());
    let mut config = ApiConfig::from_env();
    config.api_key = api_key.map(String::from);
    config.dev_mode = dev_mode;
    config.rate_limit_rps = 1000;
    AppState::new(config, pool)
}

#[tokio::test]
async fn health_reports_the_detector_backend() {
    let app = create_router(test_state(None, true));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["model"], "yunet");
}

#[tokio::test]
async fn missing_api_key_is_rejected_when_auth_is_enabled() {
    let app = create_router(test_state(Some("secret"), false));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/detect")
                .header("content-type", "application/json")
                .body(Body::from(json!({"image": ""}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dev_mode_bypasses_the_api_key_check() {
    let app = create_router(test_state(Some("secret"), true));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/detect")
                .header("content-type", "application/json")
                .body(Body::from(json!({"image": "not-valid-base64!!"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    // Reaches the handler (no 401); fails later on bad base64 instead.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detect_batch_rejects_an_oversized_batch() {
    let app = create_router(test_state(None, true));

    let batch: Vec<Value> = (0..30).map(|i| json!({"frame_index": i, "image": ""})).collect();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/detect-batch")
                .header("content-type", "application/json")
                .body(Body::from(json!({"batch": batch}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn detect_video_for_an_unknown_id_is_not_found() {
    let app = create_router(test_state(None, true));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/detect-video/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detect_video_with_a_malformed_id_is_a_bad_request() {
    let app = create_router(test_state(None, true));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/detect-video/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
