//! Opens an MP4 writer matching a decoded video's fps and dimensions.

#![cfg(feature = "opencv")]

use std::path::Path;

use blurshield_models::VideoMetadata;
use opencv::core::{Mat, Size};
use opencv::prelude::{MatTraitConst, VideoWriterTrait};
use opencv::videoio::{self, VideoWriter};

use crate::error::{MediaError, MediaResult};

/// Output is always MP4/`mp4v`, silent — OpenCV's writer never carries
/// an audio stream, so "no audio re-encode" is free rather than a
/// feature this crate has to suppress.
pub struct FrameWriter {
    writer: VideoWriter,
}

impl FrameWriter {
    pub fn create(path: &Path, metadata: &VideoMetadata) -> MediaResult<Self> {
        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')
            .map_err(|e| MediaError::export_failed(format!("fourcc: {e}")))?;
        let writer = VideoWriter::new(
            path.to_str().ok_or_else(|| MediaError::export_failed("non-utf8 path"))?,
            fourcc,
            metadata.fps as f64,
            Size::new(metadata.width as i32, metadata.height as i32),
            true,
        )
        .map_err(|e| MediaError::export_failed(format!("failed to open writer: {e}")))?;

        let opened = writer
            .is_opened()
            .map_err(|e| MediaError::export_failed(format!("failed to query writer: {e}")))?;
        if !opened {
            return Err(MediaError::export_failed("writer could not be opened"));
        }

        Ok(Self { writer })
    }

    pub fn write(&mut self, frame: &Mat) -> MediaResult<()> {
        self.writer
            .write(frame)
            .map_err(|e| MediaError::export_failed(format!("failed to write frame: {e}")))
    }
}
