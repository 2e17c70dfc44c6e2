//! Probed properties of an uploaded video.

use serde::{Deserialize, Serialize};

const DEFAULT_FPS: f32 = 30.0;

/// Properties read off a video container at upload time.
///
/// Some containers report `fps <= 0` for malformed or variable-frame-rate
/// files; rather than propagate a value that would make every downstream
/// timestamp computation divide by zero or go negative, construction
/// normalizes it to [`DEFAULT_FPS`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub fps: f32,
    pub width: u32,
    pub height: u32,
    pub frame_count: u32,
}

impl VideoMetadata {
    pub fn new(fps: f32, width: u32, height: u32, frame_count: u32) -> Self {
        let fps = if fps <= 0.0 { DEFAULT_FPS } else { fps };
        Self {
            fps,
            width,
            height,
            frame_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_non_positive_fps() {
        assert_eq!(VideoMetadata::new(0.0, 1920, 1080, 100).fps, DEFAULT_FPS);
        assert_eq!(VideoMetadata::new(-5.0, 1920, 1080, 100).fps, DEFAULT_FPS);
    }

    #[test]
    fn preserves_valid_fps() {
        assert_eq!(VideoMetadata::new(24.0, 1920, 1080, 100).fps, 24.0);
    }
}
