//! End-to-end exercises against a small synthetic video: a stub
//! detector stands in for YuNet so these run without a model file on
//! disk, the same substitution `blurshield-media`'s own pool tests use.

use std::sync::Arc;

use blurshield_media::{BoundingBox, Detector, DetectorInput, DetectorPool, MediaResult};
use blurshield_models::ExportSpec;
use opencv::core::{Scalar, Size, CV_8UC3};
use opencv::prelude::*;
use opencv::videoio::VideoWriter;
use tempfile::TempDir;
use tokio::sync::mpsc;

use blurshield_worker::{analyze_video, export_video, ProgressRecord};

/// Always reports one face covering the left half of the frame.
struct StubDetector;

impl Detector for StubDetector {
    fn detect(&mut self, _image: &DetectorInput) -> MediaResult<Vec<(BoundingBox, f64)>> {
        Ok(vec![(BoundingBox::new(0.0, 0.0, 32.0, 64.0), 0.99)])
    }
}

fn stub_pool(size: usize) -> Arc<DetectorPool> {
    Arc::new(DetectorPool::new(size, || Ok(Box::new(StubDetector) as Box<dyn Detector>)).unwrap())
}

/// Writes a silent, solid-color MP4 with `frame_count` frames.
fn write_synthetic_video(path: &std::path::Path, frame_count: i32) {
    let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v').unwrap();
    let mut writer = VideoWriter::new(
        path.to_str().unwrap(),
        fourcc,
        10.0,
        Size::new(64, 64),
        true,
    )
    .unwrap();
    assert!(writer.is_opened().unwrap());

    for i in 0..frame_count {
        let shade = (i % 255) as f64;
        let frame = Mat::new_rows_cols_with_default(64, 64, CV_8UC3, Scalar::all(shade))
            .unwrap();
        writer.write(&frame).unwrap();
    }
}

#[tokio::test]
async fn analyze_video_emits_progress_then_results() {
    let dir = TempDir::new().unwrap();
    let video_path = dir.path().join("input.mp4");
    write_synthetic_video(&video_path, 20);

    let pool = stub_pool(2);
    let (tx, mut rx) = mpsc::channel(32);

    analyze_video(&video_path, 5, pool, tx).await;

    let mut progress_seen = 0;
    let mut results = None;
    while let Some(record) = rx.recv().await {
        match record {
            ProgressRecord::Progress { progress } => {
                progress_seen += 1;
                assert!(progress >= 0.0 && progress <= 100.0);
            }
            ProgressRecord::Results { results: r } => results = Some(r),
            ProgressRecord::Error { error } => panic!("unexpected error: {error}"),
        }
    }

    assert!(progress_seen > 0, "expected at least one progress record");
    let results = results.expect("analyzer must emit a terminal results record");
    // sample_rate 5 over 20 frames -> frames 0, 5, 10, 15, every one a face.
    let indices: Vec<u32> = results.iter().map(|r| r.frame_index).collect();
    assert_eq!(indices, vec![0, 5, 10, 15]);
    for frame in &results {
        assert_eq!(frame.faces.len(), 1);
    }
}

#[tokio::test]
async fn export_video_produces_a_readable_output_file() {
    let dir = TempDir::new().unwrap();
    let input_path = dir.path().join("input.mp4");
    let output_path = dir.path().join("output.mp4");
    write_synthetic_video(&input_path, 12);

    let track = blurshield_models::Track::new(
        1,
        vec![
            blurshield_models::TrackFrame {
                frame_index: 0,
                bbox: BoundingBox::new(0.0, 0.0, 20.0, 20.0),
                score: 0.9,
            },
            blurshield_models::TrackFrame {
                frame_index: 11,
                bbox: BoundingBox::new(0.0, 0.0, 20.0, 20.0),
                score: 0.9,
            },
        ],
    )
    .unwrap();

    let spec = ExportSpec {
        tracks: vec![track],
        selected_track_ids: std::collections::HashSet::from([1]),
        padding: 0.1,
        blur_amount: 10,
        sample_rate: 1,
    };

    export_video(&input_path, &output_path, spec, 2).await.unwrap();

    assert!(output_path.exists());
    assert!(std::fs::metadata(&output_path).unwrap().len() > 0);
}
