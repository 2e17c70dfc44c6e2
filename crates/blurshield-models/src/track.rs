//! Client-edited face tracks submitted back for export.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingBox;
use crate::error::{ModelError, ModelResult};

/// One keyframe of a track: a scored box anchored to a specific source
/// frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackFrame {
    pub frame_index: u32,
    pub bbox: BoundingBox,
    pub score: f64,
}

/// A sequence of keyframes the client wants blurred across the export,
/// in between which positions are interpolated.
///
/// Frames are kept sorted by `frame_index` so the interpolator can
/// binary-search for the surrounding pair without re-sorting on every
/// lookup. `start_frame`/`end_frame` are derived from the first/last
/// keyframe rather than carried on the wire redundantly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    frames: Vec<TrackFrame>,
}

impl Track {
    /// Build a track from keyframes, rejecting an empty set and sorting
    /// by `frame_index`.
    pub fn new(id: u32, mut frames: Vec<TrackFrame>) -> ModelResult<Self> {
        if frames.is_empty() {
            return Err(ModelError::EmptyTrack(id));
        }
        frames.sort_by_key(|f| f.frame_index);
        Ok(Self { id, frames })
    }

    pub fn frames(&self) -> &[TrackFrame] {
        &self.frames
    }

    pub fn start_frame(&self) -> u32 {
        self.frames[0].frame_index
    }

    pub fn end_frame(&self) -> u32 {
        self.frames[self.frames.len() - 1].frame_index
    }
}
