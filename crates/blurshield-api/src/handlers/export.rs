//! `POST /export/{video_id}`: runs the pixelation export and streams the
//! resulting file back as an attachment, the way `clip_delivery.rs`
//! hands a finished clip back to the caller — here there is no object
//! store in front of it, so the file itself is streamed rather than a
//! presigned URL.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::Response;
use axum::Json;
use tokio_util::io::ReaderStream;
use tracing::{info, warn};
use validator::Validate;

use blurshield_models::{ExportSpec, VideoId};
use blurshield_worker::export_video;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn export(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Json(spec): Json<ExportSpec>,
) -> ApiResult<Response> {
    let video_id = VideoId::parse(&video_id).map_err(|e| ApiError::InvalidVideoId(e.to_string()))?;

    spec.validate()
        .map_err(|e| ApiError::bad_request(format!("invalid export request: {e}")))?;

    let input_path = state.input_path(video_id);
    if !input_path.exists() {
        return Err(ApiError::VideoNotFound(video_id.to_string()));
    }
    let output_path = state.output_path(video_id);

    let concurrency = state.pool.size();
    export_video(&input_path, &output_path, spec, concurrency)
        .await
        .map_err(|e| {
            warn!(video_id = %video_id, error = %e, "export failed");
            e
        })?;

    let file = tokio::fs::File::open(&output_path)
        .await
        .map_err(|e| ApiError::internal(format!("failed to open exported file: {e}")))?;
    let body = Body::from_stream(ReaderStream::new(file));

    info!(video_id = %video_id, "export complete, streaming result");

    Ok(Response::builder()
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_DISPOSITION, "attachment; filename=\"blurred-video.mp4\"")
        .body(body)
        .expect("static headers always build a valid response"))
}
