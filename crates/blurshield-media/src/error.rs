//! Errors raised by the decoder, detector pool, and interpolator.

use thiserror::Error;

pub type MediaResult<T> = Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid video: {0}")]
    InvalidVideo(String),

    #[error("detection failed: {0}")]
    DetectionFailed(String),

    #[error("decode failure: {0}")]
    DecodeFailure(String),

    #[error("export failed: {0}")]
    ExportFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MediaError {
    pub fn invalid_video(msg: impl Into<String>) -> Self {
        Self::InvalidVideo(msg.into())
    }

    pub fn detection_failed(msg: impl Into<String>) -> Self {
        Self::DetectionFailed(msg.into())
    }

    pub fn decode_failure(msg: impl Into<String>) -> Self {
        Self::DecodeFailure(msg.into())
    }

    pub fn export_failed(msg: impl Into<String>) -> Self {
        Self::ExportFailed(msg.into())
    }
}
