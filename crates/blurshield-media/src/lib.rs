//! OpenCV/FFmpeg-facing layer of the face anonymization pipeline:
//! the detector pool, frame decoder, detection engine, and track
//! interpolator.

pub mod error;
pub mod interpolate;
pub mod pool;

#[cfg(feature = "opencv")]
pub mod decoder;
#[cfg(feature = "opencv")]
pub mod detector;
#[cfg(feature = "opencv")]
pub mod writer;

pub use blurshield_models::BoundingBox;
pub use error::{MediaError, MediaResult};
pub use interpolate::find_detection_for_frame;
pub use pool::{Detector, DetectorInput, DetectorLease, DetectorPool};

#[cfg(feature = "opencv")]
pub use decoder::{FrameBuf, FrameDecoder};
#[cfg(feature = "opencv")]
pub use detector::YuNetDetector;
#[cfg(feature = "opencv")]
pub use writer::FrameWriter;

/// `N = max(2, logical_cpu_count)`, overridable by
/// `DETECTOR_POOL_SIZE` — the default size of a [`DetectorPool`].
pub fn default_pool_size() -> usize {
    std::env::var("DETECTOR_POOL_SIZE")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| num_cpus::get().max(2))
}
