//! OpenCV YuNet face detector: one [`Detector`] backing each pool slot.

#![cfg(feature = "opencv")]

use std::path::Path;

use opencv::core::{Mat, Ptr, Size};
use opencv::objdetect::FaceDetectorYN;
use opencv::prelude::{FaceDetectorYNTrait, MatTraitConst};
use opencv::{dnn, imgproc};
use tracing::warn;

use crate::error::{MediaError, MediaResult};
use crate::pool::Detector;
use crate::BoundingBox;

/// Faces smaller/larger than this never change the fact that detection
/// always runs on an image no larger than `MAX_DETECTION_DIM` on its
/// longest side; inference cost scales with input pixels, so oversized
/// frames are downscaled before the network ever sees them.
const MAX_DETECTION_DIM: i32 = 1280;

const SCORE_THRESHOLD: f32 = 0.3;
const NMS_THRESHOLD: f32 = 0.3;
const TOP_K: i32 = 5000;

/// Well-known install locations for the YuNet ONNX model, checked in
/// order. Overridable entirely by passing an explicit path to
/// [`YuNetDetector::new`].
pub const DEFAULT_MODEL_PATHS: &[&str] = &[
    "/app/models/face_detection_yunet_2023mar.onnx",
    "./models/face_detection_yunet_2023mar.onnx",
];

pub fn find_default_model_path() -> Option<&'static str> {
    DEFAULT_MODEL_PATHS.iter().copied().find(|p| Path::new(p).exists())
}

/// YuNet face detector using OpenCV's `dnn`-backed `FaceDetectorYN`.
///
/// Holds no per-frame state beyond the network itself: `input_size` is
/// reconfigured on every [`Detector::detect`] call, since the pool's
/// detectors are shared across videos of different dimensions.
pub struct YuNetDetector {
    detector: Ptr<FaceDetectorYN>,
}

// `Ptr<FaceDetectorYN>` wraps a native OpenCV handle and doesn't derive
// `Send` on its own. Every detector lives behind a `DetectorPool` lease,
// which guarantees exclusive access from exactly one task at a time, so
// handing a detector to a different thread than the one that created it
// is safe — the same reasoning the original codebase documents for its
// own native frame/handle wrappers.
unsafe impl Send for YuNetDetector {}

impl YuNetDetector {
    pub fn new(model_path: &str) -> MediaResult<Self> {
        let detector = FaceDetectorYN::create(
            model_path,
            "",
            Size::new(320, 320),
            SCORE_THRESHOLD,
            NMS_THRESHOLD,
            TOP_K,
            dnn::DNN_BACKEND_DEFAULT,
            dnn::DNN_TARGET_CPU,
        )
        .map_err(|e| MediaError::detection_failed(format!("failed to load YuNet model: {e}")))?;

        Ok(Self { detector })
    }
}

impl Detector for YuNetDetector {
    fn detect(&mut self, frame: &Mat) -> MediaResult<Vec<(BoundingBox, f64)>> {
        if frame.empty() {
            return Ok(Vec::new());
        }

        let orig_w = frame.cols();
        let orig_h = frame.rows();
        if orig_w <= 0 || orig_h <= 0 {
            return Ok(Vec::new());
        }

        let longest = orig_w.max(orig_h);
        let scale = if longest > MAX_DETECTION_DIM {
            MAX_DETECTION_DIM as f64 / longest as f64
        } else {
            1.0
        };
        let scaled_w = ((orig_w as f64) * scale).round().max(1.0) as i32;
        let scaled_h = ((orig_h as f64) * scale).round().max(1.0) as i32;

        let scaled = if scale < 1.0 {
            let mut resized = Mat::default();
            imgproc::resize(
                frame,
                &mut resized,
                Size::new(scaled_w, scaled_h),
                0.0,
                0.0,
                imgproc::INTER_LINEAR,
            )
            .map_err(|e| MediaError::detection_failed(format!("resize before detect: {e}")))?;
            resized
        } else {
            frame.clone()
        };

        self.detector
            .set_input_size(Size::new(scaled_w, scaled_h))
            .map_err(|e| MediaError::detection_failed(format!("set_input_size: {e}")))?;

        let mut faces = Mat::default();
        self.detector
            .detect(&scaled, &mut faces)
            .map_err(|e| MediaError::detection_failed(format!("detect: {e}")))?;

        parse_detection_rows(&faces, scale)
    }
}

/// YuNet's output rows are
/// `[x, y, w, h, x_re, y_re, x_le, y_le, x_n, y_n, x_ml, y_ml, x_mr, y_mr, score]`;
/// only the box and the trailing score matter here. `scale` is the
/// factor the frame was shrunk by before detection (`<= 1`); dividing
/// it back out maps the box into original-frame coordinates.
fn parse_detection_rows(faces: &Mat, scale: f64) -> MediaResult<Vec<(BoundingBox, f64)>> {
    let rows = faces.rows();
    if rows <= 0 || faces.cols() < 15 {
        return Ok(Vec::new());
    }

    let mut out = Vec::with_capacity(rows as usize);
    for i in 0..rows {
        let (x, y, w, h, score) = match (
            faces.at_2d::<f32>(i, 0),
            faces.at_2d::<f32>(i, 1),
            faces.at_2d::<f32>(i, 2),
            faces.at_2d::<f32>(i, 3),
            faces.at_2d::<f32>(i, 14),
        ) {
            (Ok(x), Ok(y), Ok(w), Ok(h), Ok(score)) => {
                (*x as f64, *y as f64, *w as f64, *h as f64, *score as f64)
            }
            _ => {
                warn!(row = i, "YuNet output row missing expected columns, skipping");
                continue;
            }
        };

        if w <= 0.0 || h <= 0.0 {
            continue;
        }

        let bbox = BoundingBox::new(x, y, w, h).unscale(scale);
        out.push((bbox, score));
    }
    Ok(out)
}
