//! `POST /upload-video`: multipart upload, streamed to a temp file and
//! probed with the frame decoder before any detection work is scheduled.

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use blurshield_media::FrameDecoder;
use blurshield_models::{VideoId, VideoMetadata};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi"];
const ALLOWED_CONTENT_TYPES: &[&str] =
    &["video/mp4", "video/webm", "video/quicktime", "video/x-msvideo"];

#[derive(Serialize)]
pub struct UploadResponse {
    pub video_id: VideoId,
    pub metadata: VideoMetadata,
}

pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
        .ok_or_else(|| ApiError::bad_request("missing `file` field"))?;

    if field.name() != Some("file") {
        return Err(ApiError::bad_request("expected a `file` field"));
    }

    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();

    let extension = file_name.rsplit('.').next().unwrap_or_default().to_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::bad_request(format!("unsupported file extension: .{extension}")));
    }
    if !content_type.is_empty() && !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(ApiError::bad_request(format!("unsupported content type: {content_type}")));
    }

    let video_id = VideoId::new();
    let dest_path = state.input_path(video_id);
    let max_bytes = state.config.max_upload_size_bytes();

    if let Err(e) = stream_field_to_file(field, &dest_path, max_bytes).await {
        let _ = tokio::fs::remove_file(&dest_path).await;
        return Err(e);
    }

    let dest_for_probe = dest_path.clone();
    let probe_result = tokio::task::spawn_blocking(move || {
        FrameDecoder::open(&dest_for_probe).map(|d| d.metadata())
    })
    .await
    .map_err(|e| ApiError::internal(format!("probe task panicked: {e}")))?;

    let metadata = match probe_result {
        Ok(metadata) => metadata,
        Err(e) => {
            warn!(video_id = %video_id, error = %e, "uploaded file failed to probe");
            let _ = tokio::fs::remove_file(&dest_path).await;
            return Err(e.into());
        }
    };

    info!(video_id = %video_id, width = metadata.width, height = metadata.height, "video uploaded");
    Ok(Json(UploadResponse { video_id, metadata }))
}

async fn stream_field_to_file(
    mut field: Field<'_>,
    path: &std::path::Path,
    max_bytes: u64,
) -> ApiResult<()> {
    let mut file = tokio::fs::File::create(path)
        .await
        .map_err(|e| ApiError::internal(format!("failed to create temp file: {e}")))?;

    let mut written: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| ApiError::bad_request(format!("failed reading upload: {e}")))?
    {
        written += chunk.len() as u64;
        if written > max_bytes {
            return Err(ApiError::UploadTooLarge);
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| ApiError::internal(format!("failed writing temp file: {e}")))?;
    }
    file.flush()
        .await
        .map_err(|e| ApiError::internal(format!("failed flushing temp file: {e}")))?;
    Ok(())
}
