//! NDJSON record shapes emitted by the analyzer — one `serde_json`
//! object per line, the same tagged-enum idiom the media crate's
//! FFmpeg progress parser echoes for incremental stderr lines.

use blurshield_models::FrameDetection;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProgressRecord {
    Progress { progress: f32 },
    Results { results: Vec<FrameDetection> },
    Error { error: String },
}

impl ProgressRecord {
    /// Render as one NDJSON line, trailing `\n` included.
    pub fn to_line(&self) -> String {
        let mut line = serde_json::to_string(self).expect("ProgressRecord always serializes");
        line.push('\n');
        line
    }
}
