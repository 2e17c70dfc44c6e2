//! Chunk-based pixelation exporter (C6): streams an input video through
//! the decoder, pixelates every selected track's effective bounding box
//! in each frame, and reassembles the output in source-frame order.

use std::path::Path;
use std::sync::Arc;

use blurshield_media::{find_detection_for_frame, FrameBuf, FrameDecoder, FrameWriter, MediaError, MediaResult};
use blurshield_models::{ExportSpec, Track};
use opencv::core::{Mat, Rect};
use opencv::imgproc;
use opencv::prelude::MatTraitConst;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tracing::warn;

/// Export one video. `concurrency` is the shared worker-group size `N`
/// (the detector pool's size) — pixelation itself never touches a
/// detector, but the same bound keeps C6 from competing with C4 for
/// CPU beyond what the rest of the system was sized for.
pub async fn export_video(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    spec: ExportSpec,
    concurrency: usize,
) -> MediaResult<()> {
    let concurrency = concurrency.max(1);
    let chunk_size = 4 * concurrency;

    let selected_tracks: Arc<Vec<Track>> = Arc::new(
        spec.tracks
            .into_iter()
            .filter(|t| spec.selected_track_ids.contains(&t.id))
            .collect(),
    );
    let padding = spec.padding as f64;
    let blur_amount = spec.blur_amount;

    let input_path = input_path.as_ref().to_path_buf();
    let output_path = output_path.as_ref().to_path_buf();

    let (meta_tx, meta_rx) = oneshot::channel();
    let (frame_tx, mut frame_rx) = mpsc::channel(chunk_size);

    let decode_handle = tokio::task::spawn_blocking(move || {
        let mut decoder = match FrameDecoder::open(&input_path) {
            Ok(d) => d,
            Err(e) => {
                let _ = meta_tx.send(Err(e));
                return;
            }
        };
        let _ = meta_tx.send(Ok(decoder.metadata()));
        for item in decoder.frames(1) {
            if frame_tx.blocking_send(item).is_err() {
                break;
            }
        }
    });

    let metadata = match meta_rx.await {
        Ok(Ok(metadata)) => metadata,
        Ok(Err(e)) => return Err(e),
        Err(_) => return Err(MediaError::export_failed("decoder task terminated unexpectedly")),
    };

    let (write_tx, mut write_rx) = mpsc::channel::<FrameBuf>(chunk_size);
    let write_output = output_path.clone();
    let writer_handle = tokio::task::spawn_blocking(move || -> MediaResult<()> {
        let mut writer = FrameWriter::create(&write_output, &metadata)?;
        while let Some(frame) = write_rx.blocking_recv() {
            writer.write(&frame.0)?;
        }
        Ok(())
    });

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut chunk: Vec<(u32, FrameBuf)> = Vec::with_capacity(chunk_size);
    let mut export_err: Option<MediaError> = None;

    while let Some(item) = frame_rx.recv().await {
        match item {
            Ok((index, frame)) => {
                chunk.push((index, frame));
                if chunk.len() == chunk_size {
                    let drained = std::mem::take(&mut chunk);
                    if let Err(e) = process_and_forward_chunk(
                        drained,
                        &selected_tracks,
                        padding,
                        blur_amount,
                        metadata.width,
                        metadata.height,
                        &semaphore,
                        &write_tx,
                    )
                    .await
                    {
                        export_err = Some(e);
                        break;
                    }
                }
            }
            Err(e) => {
                export_err = Some(e);
                break;
            }
        }
    }

    if export_err.is_none() && !chunk.is_empty() {
        if let Err(e) = process_and_forward_chunk(
            chunk,
            &selected_tracks,
            padding,
            blur_amount,
            metadata.width,
            metadata.height,
            &semaphore,
            &write_tx,
        )
        .await
        {
            export_err = Some(e);
        }
    }

    drop(write_tx);
    let _ = decode_handle.await;
    let write_result = writer_handle
        .await
        .map_err(|e| MediaError::export_failed(format!("writer task panicked: {e}")))?;

    if let Some(e) = export_err {
        return Err(e);
    }
    write_result
}

/// Dispatch every frame in the chunk to the bounded worker group,
/// collect the `(frameIndex, processedFrame)` pairs, sort by index, and
/// forward them to the writer task in that order. Per-frame failures
/// are logged and the frame is passed through unmodified rather than
/// aborting the whole export.
#[allow(clippy::too_many_arguments)]
async fn process_and_forward_chunk(
    chunk: Vec<(u32, FrameBuf)>,
    selected_tracks: &Arc<Vec<Track>>,
    padding: f64,
    blur_amount: u32,
    width: u32,
    height: u32,
    semaphore: &Arc<Semaphore>,
    write_tx: &mpsc::Sender<FrameBuf>,
) -> MediaResult<()> {
    let mut set = tokio::task::JoinSet::new();
    for (index, frame) in chunk {
        let tracks = Arc::clone(selected_tracks);
        let permit = Arc::clone(semaphore)
            .acquire_owned()
            .await
            .expect("export semaphore is never closed");
        set.spawn_blocking(move || {
            let _permit = permit;
            let processed = process_frame(frame.0, index, &tracks, padding, blur_amount, width, height);
            (index, FrameBuf(processed))
        });
    }

    let mut results = Vec::new();
    while let Some(res) = set.join_next().await {
        let pair = res.map_err(|e| MediaError::export_failed(format!("pixelation task panicked: {e}")))?;
        results.push(pair);
    }
    results.sort_by_key(|(index, _)| *index);

    for (_, frame) in results {
        if write_tx.send(frame).await.is_err() {
            return Err(MediaError::export_failed("writer task terminated early"));
        }
    }
    Ok(())
}

/// Pixelate every selected track's effective region in one frame.
fn process_frame(
    mut frame: Mat,
    frame_index: u32,
    tracks: &[Track],
    padding: f64,
    blur_amount: u32,
    width: u32,
    height: u32,
) -> Mat {
    for track in tracks {
        let Some(detection) = find_detection_for_frame(track, frame_index) else {
            continue;
        };
        let bbox = detection.bbox;

        let x = (bbox.x - bbox.w * padding).floor().max(0.0) as i32;
        let y = (bbox.y - bbox.h * padding).floor().max(0.0) as i32;
        let w = ((bbox.w * (1.0 + 2.0 * padding)).floor() as i32).min(width as i32 - x);
        let h = ((bbox.h * (1.0 + 2.0 * padding)).floor() as i32).min(height as i32 - y);
        if w <= 0 || h <= 0 {
            continue;
        }

        if let Err(e) = pixelate_region(&mut frame, x, y, w, h, blur_amount) {
            warn!(frame_index, track = track.id, error = %e, "pixelation failed for region, leaving it unmodified");
        }
    }
    frame
}

/// Two-pass nearest-neighbor resize: downsample the region to hide
/// detail, then upsample back to its original size, producing the
/// blocky pixelation look. Writes back through the ROI, which aliases
/// `frame`'s own buffer.
fn pixelate_region(frame: &mut Mat, x: i32, y: i32, w: i32, h: i32, blur_amount: u32) -> MediaResult<()> {
    let rect = Rect::new(x, y, w, h);
    let region = Mat::roi(frame, rect).map_err(|e| MediaError::export_failed(format!("roi: {e}")))?;

    let small_w = (w / blur_amount.max(1) as i32).max(1);
    let small_h = (h / blur_amount.max(1) as i32).max(1);

    let mut small = Mat::default();
    imgproc::resize(
        &region,
        &mut small,
        opencv::core::Size::new(small_w, small_h),
        0.0,
        0.0,
        imgproc::INTER_NEAREST,
    )
    .map_err(|e| MediaError::export_failed(format!("downsample: {e}")))?;

    let mut pixelated = Mat::default();
    imgproc::resize(
        &small,
        &mut pixelated,
        opencv::core::Size::new(w, h),
        0.0,
        0.0,
        imgproc::INTER_NEAREST,
    )
    .map_err(|e| MediaError::export_failed(format!("upsample: {e}")))?;

    let mut dst = Mat::roi(frame, rect).map_err(|e| MediaError::export_failed(format!("roi: {e}")))?;
    pixelated
        .copy_to(&mut dst)
        .map_err(|e| MediaError::export_failed(format!("copy back into frame: {e}")))?;
    Ok(())
}
