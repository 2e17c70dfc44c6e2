//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use blurshield_media::DetectorPool;

use crate::config::ApiConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pool: Arc<DetectorPool>,
    pub temp_dir: PathBuf,
}

impl AppState {
    pub fn new(config: ApiConfig, pool: Arc<DetectorPool>) -> Self {
        Self {
            config,
            pool,
            temp_dir: std::env::temp_dir(),
        }
    }

    pub fn input_path(&self, video_id: blurshield_models::VideoId) -> PathBuf {
        self.temp_dir.join(format!("{video_id}.mp4"))
    }

    pub fn output_path(&self, video_id: blurshield_models::VideoId) -> PathBuf {
        self.temp_dir.join(format!("{video_id}_blurred.mp4"))
    }

    /// Detector backend name reported by `/health`.
    pub fn detector_model_name(&self) -> &'static str {
        "yunet"
    }
}
