//! Reconstructs a per-frame bounding box from a sparsely-sampled track.
//!
//! Generalizes the linear interpolation already used for crop windows
//! elsewhere in this codebase to scored face detections.

use blurshield_models::{BoundingBox, Detection, Track};

/// Frames further than this from a track's first/last keyframe never
/// get an interpolated box — past that distance a detection is
/// considered stale rather than merely sparse.
const MAX_GAP: u32 = 20;

/// Frames of slack tolerated when only one neighboring keyframe (not
/// two) brackets the query index. Distinct from `ExportSpec::padding`,
/// which is a geometric fraction, not a frame count.
const EDGE_PADDING: u32 = 0;

/// Find the effective detection for `track` at `frame_idx`: exact,
/// interpolated between the two bracketing keyframes, or absent.
pub fn find_detection_for_frame(track: &Track, frame_idx: u32) -> Option<Detection> {
    let frames = track.frames();

    let lower_bound = frames[0].frame_index.saturating_sub(MAX_GAP);
    let upper_bound = frames[frames.len() - 1].frame_index.saturating_add(MAX_GAP);
    if frame_idx < lower_bound || frame_idx > upper_bound {
        return None;
    }

    match frames.binary_search_by_key(&frame_idx, |f| f.frame_index) {
        Ok(i) => Some(Detection {
            bbox: frames[i].bbox,
            score: frames[i].score,
        }),
        Err(insert_pos) => {
            let prev = insert_pos.checked_sub(1).map(|i| frames[i]);
            let next = frames.get(insert_pos).copied();
            match (prev, next) {
                (Some(p), None) => {
                    (frame_idx - p.frame_index <= EDGE_PADDING).then(|| Detection {
                        bbox: p.bbox,
                        score: p.score,
                    })
                }
                (None, Some(n)) => {
                    (n.frame_index - frame_idx <= EDGE_PADDING).then(|| Detection {
                        bbox: n.bbox,
                        score: n.score,
                    })
                }
                (Some(p), Some(n)) => {
                    let gap = n.frame_index - p.frame_index;
                    if gap > MAX_GAP {
                        return None;
                    }
                    let t = (frame_idx - p.frame_index) as f64 / gap as f64;
                    Some(Detection {
                        bbox: BoundingBox::lerp(&p.bbox, &n.bbox, t),
                        score: p.score * (1.0 - t) + n.score * t,
                    })
                }
                (None, None) => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blurshield_models::TrackFrame;

    fn track_with(frames: Vec<(u32, f64, f64, f64, f64, f64)>) -> Track {
        let frames = frames
            .into_iter()
            .map(|(idx, x, y, w, h, score)| TrackFrame {
                frame_index: idx,
                bbox: BoundingBox::new(x, y, w, h),
                score,
            })
            .collect();
        Track::new(1, frames).unwrap()
    }

    #[test]
    fn exact_hit_returns_that_frame_unmodified() {
        let track = track_with(vec![(10, 0.0, 0.0, 1.0, 1.0, 1.0), (35, 0.0, 0.0, 1.0, 1.0, 1.0)]);
        let d = find_detection_for_frame(&track, 10).unwrap();
        assert_eq!(d.bbox, BoundingBox::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(d.score, 1.0);
    }

    #[test]
    fn gap_over_threshold_returns_none_strictly_inside_the_gap() {
        let track = track_with(vec![(10, 0.0, 0.0, 1.0, 1.0, 1.0), (35, 0.0, 0.0, 1.0, 1.0, 1.0)]);
        assert!(find_detection_for_frame(&track, 20).is_none());
    }

    #[test]
    fn interpolates_linearly_within_a_small_gap() {
        let track = Track::new(
            7,
            vec![
                TrackFrame {
                    frame_index: 0,
                    bbox: BoundingBox::new(10.0, 10.0, 20.0, 20.0),
                    score: 0.9,
                },
                TrackFrame {
                    frame_index: 10,
                    bbox: BoundingBox::new(30.0, 10.0, 20.0, 20.0),
                    score: 0.9,
                },
            ],
        )
        .unwrap();

        // Halfway between the two keyframes, the box should be halfway too.
        let d = find_detection_for_frame(&track, 5).unwrap();
        assert_eq!(d.bbox, BoundingBox::new(20.0, 10.0, 20.0, 20.0));
    }

    #[test]
    fn one_before_first_keyframe_returns_none() {
        let track = track_with(vec![(10, 0.0, 0.0, 1.0, 1.0, 1.0)]);
        assert!(find_detection_for_frame(&track, 9).is_none());
    }

    #[test]
    fn far_outside_window_returns_none() {
        let track = track_with(vec![(10, 0.0, 0.0, 1.0, 1.0, 1.0)]);
        assert!(find_detection_for_frame(&track, 100).is_none());
        // frame_idx underflow guard: querying near zero on a track that
        // starts late must not panic.
        assert!(find_detection_for_frame(&track, 0).is_none());
    }

    #[test]
    fn every_frame_in_a_small_gap_yields_the_exact_linear_value() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(20.0, 0.0, 10.0, 10.0);
        let track = Track::new(
            1,
            vec![
                TrackFrame {
                    frame_index: 100,
                    bbox: a,
                    score: 1.0,
                },
                TrackFrame {
                    frame_index: 110,
                    bbox: b,
                    score: 1.0,
                },
            ],
        )
        .unwrap();

        for k in 0..=10u32 {
            let d = find_detection_for_frame(&track, 100 + k).unwrap();
            let t = k as f64 / 10.0;
            assert_eq!(d.bbox, BoundingBox::lerp(&a, &b, t));
        }
    }
}
