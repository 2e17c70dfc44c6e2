//! The request body submitted to the pixelation export endpoint.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::track::Track;

/// Client-supplied export request: the tracks to blur, which of them to
/// actually apply, and the pixelation parameters.
///
/// `tracks` typically arrives as the (possibly client-edited) output of
/// a prior `/detect-video` call; `selected_track_ids` lets the client
/// omit tracks it decided were false positives without re-submitting
/// the whole detection result.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_selection_is_subset"))]
pub struct ExportSpec {
    pub tracks: Vec<Track>,

    #[validate(length(max = 100))]
    pub selected_track_ids: HashSet<u32>,

    #[validate(range(min = 0.0, max = 2.0))]
    pub padding: f32,

    #[validate(range(min = 1, max = 50))]
    pub blur_amount: u32,

    #[validate(range(min = 1, max = 60))]
    pub sample_rate: u32,
}

fn validate_selection_is_subset(spec: &ExportSpec) -> Result<(), ValidationError> {
    let known: HashSet<u32> = spec.tracks.iter().map(|t| t.id).collect();
    if spec.selected_track_ids.iter().all(|id| known.contains(id)) {
        Ok(())
    } else {
        Err(ValidationError::new("selected_track_ids references an unknown track id"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BoundingBox;
    use crate::track::TrackFrame;

    fn spec(tracks: Vec<Track>, selected: HashSet<u32>) -> ExportSpec {
        ExportSpec {
            tracks,
            selected_track_ids: selected,
            padding: 0.2,
            blur_amount: 15,
            sample_rate: 5,
        }
    }

    fn track(id: u32) -> Track {
        Track::new(
            id,
            vec![TrackFrame {
                frame_index: 0,
                bbox: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                score: 0.9,
            }],
        )
        .unwrap()
    }

    #[test]
    fn accepts_selection_within_tracks() {
        let s = spec(vec![track(1), track(2)], HashSet::from([1]));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn rejects_selection_outside_tracks() {
        let s = spec(vec![track(1)], HashSet::from([99]));
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_blur_amount() {
        let mut s = spec(vec![track(1)], HashSet::from([1]));
        s.blur_amount = 0;
        assert!(s.validate().is_err());
        s.blur_amount = 51;
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_padding() {
        let mut s = spec(vec![track(1)], HashSet::from([1]));
        s.padding = -0.1;
        assert!(s.validate().is_err());
        s.padding = 2.1;
        assert!(s.validate().is_err());
    }
}
