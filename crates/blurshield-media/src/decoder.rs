//! Opens a video file and yields frames at a requested sample stride.

#![cfg(feature = "opencv")]

use std::path::Path;

use blurshield_models::VideoMetadata;
use opencv::core::Mat;
use opencv::prelude::{MatTraitConst, VideoCaptureTrait, VideoCaptureTraitConst};
use opencv::videoio::{self, VideoCapture};

use crate::error::{MediaError, MediaResult};

/// Owned wrapper around one decoded frame.
///
/// `Mat` wraps a native OpenCV pointer and isn't `Send`. Each frame is
/// read on the decode thread and handed to exactly one detection or
/// pixelation task afterward — never touched concurrently — so moving
/// it across that boundary is safe. Asserting it explicitly here is the
/// same idiom the original codebase uses for its FFmpeg frame buffers.
pub struct FrameBuf(pub Mat);

unsafe impl Send for FrameBuf {}

/// An opened video, positioned at the start of the stream.
///
/// `open` fails if the container can't be opened at all, or if its
/// first frame can't be decoded — a container that merely reports a
/// wrong `frame_count` is still accepted; [`FrameDecoder::frames`]
/// tolerates that by reading until end-of-stream instead of trusting
/// the count.
pub struct FrameDecoder {
    capture: VideoCapture,
    metadata: VideoMetadata,
}

impl FrameDecoder {
    pub fn open(path: &Path) -> MediaResult<Self> {
        let mut capture = VideoCapture::from_file(
            path.to_str().ok_or_else(|| MediaError::invalid_video("non-utf8 path"))?,
            videoio::CAP_ANY,
        )
        .map_err(|e| MediaError::invalid_video(format!("failed to open video: {e}")))?;

        let is_opened = capture
            .is_opened()
            .map_err(|e| MediaError::invalid_video(format!("failed to query capture: {e}")))?;
        if !is_opened {
            return Err(MediaError::invalid_video("container could not be opened"));
        }

        let mut probe_frame = Mat::default();
        let read_ok = capture
            .read(&mut probe_frame)
            .map_err(|e| MediaError::invalid_video(format!("failed to read first frame: {e}")))?;
        if !read_ok || probe_frame.empty() {
            return Err(MediaError::invalid_video("first frame could not be decoded"));
        }

        let fps = capture
            .get(videoio::CAP_PROP_FPS)
            .map_err(|e| MediaError::invalid_video(format!("failed to read fps: {e}")))? as f32;
        let width = capture.get(videoio::CAP_PROP_FRAME_WIDTH).unwrap_or(0.0) as u32;
        let height = capture.get(videoio::CAP_PROP_FRAME_HEIGHT).unwrap_or(0.0) as u32;
        let frame_count = capture.get(videoio::CAP_PROP_FRAME_COUNT).unwrap_or(0.0).max(0.0) as u32;

        // Rewind past the probe read so `frames()` starts at index 0.
        capture
            .set(videoio::CAP_PROP_POS_FRAMES, 0.0)
            .map_err(|e| MediaError::invalid_video(format!("failed to rewind: {e}")))?;

        Ok(Self {
            capture,
            metadata: VideoMetadata::new(fps, width, height, frame_count),
        })
    }

    pub fn metadata(&self) -> VideoMetadata {
        self.metadata
    }

    /// Iterate absolute frame indices `0, stride, 2*stride, ...`,
    /// discarding frames in between. Stops at the first index at or
    /// past `frame_count` when the container reported one, otherwise
    /// runs until the first failed read.
    pub fn frames(&mut self, stride: u32) -> FrameIter<'_> {
        FrameIter {
            capture: &mut self.capture,
            frame_count: self.metadata.frame_count,
            stride: stride.max(1),
            next_index: 0,
            current: 0,
            done: false,
        }
    }
}

pub struct FrameIter<'a> {
    capture: &'a mut VideoCapture,
    frame_count: u32,
    stride: u32,
    next_index: u32,
    current: u32,
    done: bool,
}

impl Iterator for FrameIter<'_> {
    type Item = MediaResult<(u32, FrameBuf)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.frame_count > 0 && self.next_index >= self.frame_count {
            self.done = true;
            return None;
        }

        loop {
            let mut frame = Mat::default();
            let read_ok = match self.capture.read(&mut frame) {
                Ok(ok) => ok,
                Err(e) => {
                    self.done = true;
                    return Some(Err(MediaError::decode_failure(format!("read failed: {e}"))));
                }
            };
            if !read_ok || frame.empty() {
                self.done = true;
                return None;
            }

            let index = self.current;
            self.current += 1;

            if index == self.next_index {
                self.next_index += self.stride;
                return Some(Ok((index, FrameBuf(frame))));
            }
            // Sequential-read-and-discard between sampled indices.
        }
    }
}
