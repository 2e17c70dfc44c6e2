//! Shared data model for the face anonymization pipeline.
//!
//! These types are the wire format between the API layer and the
//! analysis/export pipeline: bounding boxes, per-frame detections,
//! client-edited tracks, and the export request shape.

pub mod bbox;
pub mod detection;
pub mod error;
pub mod export_spec;
pub mod ids;
pub mod track;
pub mod video;

pub use bbox::BoundingBox;
pub use detection::{Detection, FrameDetection};
pub use error::{ModelError, ModelResult};
pub use export_spec::ExportSpec;
pub use ids::VideoId;
pub use track::{Track, TrackFrame};
pub use video::VideoMetadata;
