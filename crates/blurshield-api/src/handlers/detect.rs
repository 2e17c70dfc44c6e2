//! `POST /detect` and `POST /detect-batch`: single-shot detection
//! against client-submitted still frames, decoded with the same
//! `opencv::imgcodecs` entry point the original codebase's debug dumps
//! use in the other direction.

use axum::extract::State;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use opencv::core::Vector;
use opencv::imgcodecs;
use opencv::prelude::MatTraitConst as _;
use serde::{Deserialize, Serialize};
use tracing::warn;

use blurshield_models::Detection;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const MAX_BATCH_FRAMES: usize = 25;

#[derive(Deserialize)]
pub struct DetectRequest {
    image: String,
}

#[derive(Serialize)]
pub struct DetectResponse {
    faces: Vec<Detection>,
}

#[derive(Deserialize)]
pub struct BatchFrame {
    frame_index: u32,
    image: String,
}

#[derive(Deserialize)]
pub struct DetectBatchRequest {
    batch: Vec<BatchFrame>,
}

#[derive(Serialize)]
pub struct BatchFrameResult {
    frame_index: u32,
    faces: Vec<Detection>,
}

#[derive(Serialize)]
pub struct DetectBatchResponse {
    results: Vec<BatchFrameResult>,
}

pub async fn detect(
    State(state): State<AppState>,
    Json(request): Json<DetectRequest>,
) -> ApiResult<Json<DetectResponse>> {
    let faces = detect_one_frame(&state, &request.image).await?;
    Ok(Json(DetectResponse { faces }))
}

pub async fn detect_batch(
    State(state): State<AppState>,
    Json(request): Json<DetectBatchRequest>,
) -> ApiResult<Json<DetectBatchResponse>> {
    if request.batch.is_empty() || request.batch.len() > MAX_BATCH_FRAMES {
        return Err(ApiError::bad_request(format!(
            "batch must contain 1-{MAX_BATCH_FRAMES} frames, got {}",
            request.batch.len()
        )));
    }

    let mut results = Vec::with_capacity(request.batch.len());
    for frame in request.batch {
        let faces = match detect_one_frame(&state, &frame.image).await {
            Ok(faces) => faces,
            Err(e) => {
                warn!(frame_index = frame.frame_index, error = %e, "batch frame failed, reporting no faces");
                Vec::new()
            }
        };
        results.push(BatchFrameResult { frame_index: frame.frame_index, faces });
    }

    Ok(Json(DetectBatchResponse { results }))
}

async fn detect_one_frame(state: &AppState, image_b64: &str) -> ApiResult<Vec<Detection>> {
    let bytes = BASE64
        .decode(image_b64)
        .map_err(|e| ApiError::bad_request(format!("invalid base64 image: {e}")))?;

    // Lease on the async side (it awaits the pool semaphore), then move
    // the lease into the blocking pool for the synchronous decode +
    // detect call — the same handoff `pool.rs`'s own tests exercise.
    let mut lease = state.pool.lease().await;
    let detections = tokio::task::spawn_blocking(move || -> ApiResult<_> {
        let buf = Vector::from_slice(&bytes);
        let image = imgcodecs::imdecode(&buf, imgcodecs::IMREAD_COLOR)
            .map_err(|e| ApiError::bad_request(format!("failed to decode image: {e}")))?;

        if image.empty() {
            return Err(ApiError::bad_request("decoded image is empty"));
        }

        Ok(lease.detect(&image)?)
    })
    .await
    .map_err(|e| ApiError::internal(format!("detection task panicked: {e}")))??;

    Ok(detections
        .into_iter()
        .map(|(bbox, score)| Detection { bbox, score })
        .collect())
}
