//! Bounding boxes in source-frame pixel coordinates.

use serde::{Deserialize, Serialize};

/// A bounding box in source-frame pixel coordinates, top-left origin.
///
/// Not constrained to integers: interpolation produces fractional
/// coordinates, and consumers truncate to integers only when indexing
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    /// Linearly interpolate between two boxes, `t` in `[0, 1]`.
    pub fn lerp(a: &BoundingBox, b: &BoundingBox, t: f64) -> BoundingBox {
        BoundingBox {
            x: a.x + t * (b.x - a.x),
            y: a.y + t * (b.y - a.y),
            w: a.w + t * (b.w - a.w),
            h: a.h + t * (b.h - a.h),
        }
    }

    /// Scale every component by `1/s` — used to invert a detection-time
    /// downscale back to original-frame coordinates.
    pub fn unscale(&self, s: f64) -> BoundingBox {
        BoundingBox {
            x: self.x / s,
            y: self.y / s,
            w: self.w / s,
            h: self.h / s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_midpoint() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(10.0, 20.0, 20.0, 30.0);
        let mid = BoundingBox::lerp(&a, &b, 0.5);
        assert_eq!(mid.x, 5.0);
        assert_eq!(mid.y, 10.0);
        assert_eq!(mid.w, 15.0);
        assert_eq!(mid.h, 20.0);
    }

    #[test]
    fn lerp_endpoints() {
        let a = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let b = BoundingBox::new(5.0, 6.0, 7.0, 8.0);
        assert_eq!(BoundingBox::lerp(&a, &b, 0.0), a);
        assert_eq!(BoundingBox::lerp(&a, &b, 1.0), b);
    }

    #[test]
    fn unscale_inverts_detection_downscale() {
        let scaled = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
        let original = scaled.unscale(0.5);
        assert_eq!(original, BoundingBox::new(20.0, 20.0, 40.0, 40.0));
    }
}
