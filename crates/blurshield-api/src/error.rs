//! HTTP-facing error type. Internal failures are redacted outside dev
//! mode the same way the original codebase's `ApiError::into_response`
//! hides `Internal`/collaborator-error detail in production.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use blurshield_media::MediaError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("video not found: {0}")]
    VideoNotFound(String),

    #[error("upload too large")]
    UploadTooLarge,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidVideoId(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::VideoNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Media(e) => match e {
                MediaError::InvalidVideo(_) => StatusCode::BAD_REQUEST,
                // Per-frame detection failures never surface as a request
                // failure; a bare MediaError::DetectionFailed reaching here
                // means it escaped that isolation, so treat it as internal.
                MediaError::DetectionFailed(_)
                | MediaError::DecodeFailure(_)
                | MediaError::ExportFailed(_)
                | MediaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self.status_code(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let dev_mode = std::env::var("DEV_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let detail = if self.is_internal() && !dev_mode {
            "an internal error occurred".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: detail })).into_response()
    }
}
