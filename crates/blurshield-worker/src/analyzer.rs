//! Progress-streamed analyzer (C4): walks a stored video at a sample
//! stride, dispatches detections through the pool, bounds in-flight
//! work, and emits an append-only NDJSON-ready record sequence.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

use blurshield_media::{BoundingBox, DetectorPool, FrameDecoder};
use blurshield_models::{Detection, FrameDetection};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::progress::ProgressRecord;

/// Frame-decode I/O runs sequentially on a dedicated blocking thread;
/// detection for each decoded frame runs on its own task, leasing a
/// detector and handing the actual (CPU-bound, non-`Send`-friendly)
/// OpenCV call to `spawn_blocking` — exactly the split the media crate
/// exists to make safe.
pub async fn analyze_video(
    video_path: impl AsRef<Path>,
    sample_rate: u32,
    pool: Arc<DetectorPool>,
    progress_tx: mpsc::Sender<ProgressRecord>,
) {
    let sample_rate = sample_rate.clamp(1, 30);
    let video_path = video_path.as_ref().to_path_buf();
    let max_pending = 2 * pool.size().max(1);

    let (meta_tx, meta_rx) = tokio::sync::oneshot::channel();
    let (frame_tx, mut frame_rx) = mpsc::channel(max_pending);

    tokio::task::spawn_blocking(move || {
        let mut decoder = match FrameDecoder::open(&video_path) {
            Ok(d) => d,
            Err(e) => {
                let _ = meta_tx.send(Err(e));
                return;
            }
        };
        let _ = meta_tx.send(Ok(decoder.metadata()));
        for item in decoder.frames(sample_rate) {
            if frame_tx.blocking_send(item).is_err() {
                break; // analyzer stopped consuming (client disconnected)
            }
        }
    });

    let metadata = match meta_rx.await {
        Ok(Ok(metadata)) => metadata,
        Ok(Err(e)) => {
            let _ = progress_tx.send(ProgressRecord::Error { error: e.to_string() }).await;
            return;
        }
        Err(_) => {
            let _ = progress_tx
                .send(ProgressRecord::Error { error: "decoder task terminated unexpectedly".into() })
                .await;
            return;
        }
    };

    let total_steps = if metadata.frame_count > 0 {
        (metadata.frame_count as u64)
            .div_ceil(sample_rate as u64)
            .max(1)
    } else {
        1
    };

    let mut pending: VecDeque<JoinHandle<(u32, Vec<(BoundingBox, f64)>)>> =
        VecDeque::new();
    let mut accumulator: Vec<FrameDetection> = Vec::new();
    let mut completed: u64 = 0;

    while let Some(item) = frame_rx.recv().await {
        match item {
            Ok((frame_index, frame)) => {
                let pool = Arc::clone(&pool);
                pending.push_back(tokio::spawn(async move {
                    let mut lease = pool.lease().await;
                    let detections = match tokio::task::spawn_blocking(move || lease.detect(&frame.0)).await {
                        Ok(Ok(detections)) => detections,
                        Ok(Err(e)) => {
                            // per-frame detector failure is isolated: log and
                            // treat the frame as having no faces.
                            warn!(frame_index, error = %e, "detection failed for frame, reporting no faces");
                            Vec::new()
                        }
                        Err(join_err) => {
                            warn!(frame_index, error = %join_err, "detector task panicked, reporting no faces");
                            Vec::new()
                        }
                    };
                    (frame_index, detections)
                }));

                if pending.len() >= max_pending {
                    let Some(handle) = pending.pop_front() else { continue };
                    if !drain_one(handle, &mut accumulator, &mut completed, total_steps, &progress_tx).await {
                        return;
                    }
                }
            }
            Err(e) => {
                let _ = progress_tx.send(ProgressRecord::Error { error: e.to_string() }).await;
                return;
            }
        }
    }

    while let Some(handle) = pending.pop_front() {
        if !drain_one(handle, &mut accumulator, &mut completed, total_steps, &progress_tx).await {
            return;
        }
    }

    let _ = progress_tx.send(ProgressRecord::Results { results: accumulator }).await;
}

/// Await one in-flight detection, fold it into the accumulator, and
/// emit a progress record. Returns `false` when the client has gone
/// away (the progress channel is closed) so the caller can stop
/// submitting further work.
async fn drain_one(
    handle: JoinHandle<(u32, Vec<(BoundingBox, f64)>)>,
    accumulator: &mut Vec<FrameDetection>,
    completed: &mut u64,
    total_steps: u64,
    progress_tx: &mpsc::Sender<ProgressRecord>,
) -> bool {
    let (frame_index, detections) = match handle.await {
        Ok(pair) => pair,
        Err(join_err) => {
            warn!(error = %join_err, "detection task join failed, reporting no faces");
            return true;
        }
    };

    if !detections.is_empty() {
        accumulator.push(FrameDetection {
            frame_index,
            faces: detections
                .into_iter()
                .map(|(bbox, score)| Detection { bbox, score })
                .collect(),
        });
    }

    *completed += 1;
    let progress = (*completed as f64 / total_steps as f64 * 100.0).min(100.0);
    let progress = (progress * 10.0).round() / 10.0;

    progress_tx
        .send(ProgressRecord::Progress { progress: progress as f32 })
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_steps_rounds_up() {
        assert_eq!((10u64).div_ceil(3), 4);
        assert_eq!((300u64).div_ceil(3), 100);
        assert_eq!((0u64).max(1), 1);
    }
}
