//! Per-frame detection results streamed from the analyzer.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;

/// A single detected face within one sampled frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(flatten)]
    pub bbox: BoundingBox,
    /// Detector confidence in `[0, 1]`.
    pub score: f64,
}

/// All detections found in a single sampled frame.
///
/// Only emitted for frames where `faces` is non-empty — the analyzer
/// never produces an empty record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameDetection {
    /// Absolute index into the source (unsampled) frame sequence.
    pub frame_index: u32,
    pub faces: Vec<Detection>,
}
