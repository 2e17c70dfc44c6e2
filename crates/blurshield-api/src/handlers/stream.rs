//! `POST /detect-video/{video_id}?sample_rate=K`: drives the analyzer
//! and relays its progress stream as NDJSON.

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::Response;
use futures_util::StreamExt as _;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use blurshield_models::VideoId;
use blurshield_worker::analyze_video;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SampleRateQuery {
    sample_rate: Option<u32>,
}

const PROGRESS_CHANNEL_CAPACITY: usize = 32;

pub async fn detect_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(query): Query<SampleRateQuery>,
) -> ApiResult<Response> {
    let video_id = VideoId::parse(&video_id).map_err(|e| ApiError::InvalidVideoId(e.to_string()))?;
    let input_path = state.input_path(video_id);
    if !input_path.exists() {
        return Err(ApiError::VideoNotFound(video_id.to_string()));
    }

    let sample_rate = query.sample_rate.unwrap_or(1).clamp(1, 30);
    let (tx, rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
    let pool = state.pool.clone();

    tokio::spawn(async move {
        analyze_video(input_path, sample_rate, pool, tx).await;
    });

    let body_stream = ReceiverStream::new(rx).map(|record| {
        Ok::<_, std::convert::Infallible>(record.to_line())
    });

    Ok(Response::builder()
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(body_stream))
        .expect("static headers always build a valid response"))
}
