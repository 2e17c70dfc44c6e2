//! Error types for model construction/validation.

use thiserror::Error;

/// Result type for model construction.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while constructing or validating a model type.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("track {0} has no frames")]
    EmptyTrack(u32),

    #[error("invalid video id: {0}")]
    InvalidVideoId(String),

    #[error("export spec validation failed: {0}")]
    InvalidExportSpec(String),
}
