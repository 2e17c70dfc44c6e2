//! Orchestration layer between the HTTP surface and the media crate:
//! progress-streamed detection (C4) and chunked pixelation export (C6),
//! both built on the same detector pool.

pub mod analyzer;
pub mod exporter;
pub mod progress;

pub use analyzer::analyze_video;
pub use exporter::export_video;
pub use progress::ProgressRecord;
