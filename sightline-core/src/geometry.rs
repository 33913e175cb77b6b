//! Axis-aligned detection rectangles in normalized frame coordinates.
//!
//! Edges are fractions of the frame: `left`/`right` against the width and
//! `lower`/`upper` against the height, with `lower` nearer the bottom of the
//! frame (and so nearer the camera). `left < right` and `lower < upper` are
//! expected but not enforced; degenerate boxes have zero or negative area and
//! never overlap anything.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Intersections smaller than this are treated as no overlap when computing IoU.
pub const IOU_TOLERANCE: f64 = 0.000_000_1;

/// A single labelled detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub right: f64,
    pub lower: f64,
    pub upper: f64,
    /// Detection confidence, 0.0 (doubt) to 1.0 (certainty).
    pub confidence: f64,
    pub label: String,
}

impl BoundingBox {
    pub fn new(
        left: f64,
        right: f64,
        lower: f64,
        upper: f64,
        confidence: f64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            left,
            right,
            lower,
            upper,
            confidence,
            label: label.into(),
        }
    }

    /// Build a box from a pixel rectangle in image convention (`y` grows
    /// downwards), normalizing against the frame size.
    ///
    /// A zero frame dimension yields a zero-area box at the origin.
    pub fn from_pixels(
        (x_min, y_min, x_max, y_max): (f64, f64, f64, f64),
        frame_width: u32,
        frame_height: u32,
        confidence: f64,
        label: impl Into<String>,
    ) -> Self {
        if frame_width == 0 || frame_height == 0 {
            return Self::new(0.0, 0.0, 0.0, 0.0, confidence, label);
        }

        let width = frame_width as f64;
        let height = frame_height as f64;

        Self::new(
            x_min / width,
            x_max / width,
            1.0 - y_max / height,
            1.0 - y_min / height,
            confidence,
            label,
        )
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.upper - self.lower
    }

    /// Area of the box. May be zero or negative for degenerate input.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Whether every edge is a finite number
    pub fn is_finite(&self) -> bool {
        [self.left, self.right, self.lower, self.upper]
            .iter()
            .all(|edge| edge.is_finite())
    }

    /// Width of the horizontal span shared with `other`, 0.0 if the spans
    /// do not overlap.
    pub fn horizontal_overlap(&self, other: &BoundingBox) -> f64 {
        if !(self.is_finite() && other.is_finite()) {
            return 0.0;
        }

        let width = self.right.min(other.right) - self.left.max(other.left);
        if width > 0.0 {
            width
        } else {
            0.0
        }
    }

    /// Area shared with `other`. Never negative; 0.0 when the boxes are
    /// disjoint on either axis.
    pub fn overlap_area(&self, other: &BoundingBox) -> f64 {
        // min/max skip a NaN operand, so non-finite edges are rejected first
        if !(self.is_finite() && other.is_finite()) {
            return 0.0;
        }

        let width = self.right.min(other.right) - self.left.max(other.left);
        let height = self.upper.min(other.upper) - self.lower.max(other.lower);

        if !(width > 0.0 && height > 0.0) {
            return 0.0;
        }

        width * height
    }

    /// Intersection over union with `other`.
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let intersection = self.overlap_area(other);
        if intersection < IOU_TOLERANCE {
            return 0.0;
        }

        let union = self.area() + other.area() - intersection;
        if !(union > 0.0) {
            return 0.0;
        }

        intersection / union
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "left: {:?}, right: {:?}, lower: {:?}, upper: {:?}, conf: {:?}, label: {}",
            self.left, self.right, self.lower, self.upper, self.confidence, self.label
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let b = BoundingBox::new(0.2, 0.3, 0.2, 0.6, 0.5, "test1");
        assert_eq!(
            b.to_string(),
            "left: 0.2, right: 0.3, lower: 0.2, upper: 0.6, conf: 0.5, label: test1"
        );
    }

    #[test]
    fn test_display_whole_numbers_keep_decimal_point() {
        let b = BoundingBox::new(0.0, 1.0, 0.0, 1.0, 1.0, "wall");
        assert_eq!(
            b.to_string(),
            "left: 0.0, right: 1.0, lower: 0.0, upper: 1.0, conf: 1.0, label: wall"
        );
    }

    #[test]
    fn test_area() {
        let b = BoundingBox::new(0.0, 0.5, 0.0, 0.2, 0.5, "a");
        assert!((b.area() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_area_is_not_positive() {
        let flat = BoundingBox::new(0.2, 0.2, 0.3, 0.3, 0.5, "flat");
        let inverted = BoundingBox::new(0.5, 0.2, 0.3, 0.4, 0.5, "inverted");
        assert_eq!(flat.area(), 0.0);
        assert!(inverted.area() < 0.0);
    }

    #[test]
    fn test_overlap_area_partial() {
        let a = BoundingBox::new(0.0, 0.2, 0.0, 0.2, 0.5, "a");
        let b = BoundingBox::new(0.1, 0.3, 0.1, 0.3, 0.5, "b");
        assert!((a.overlap_area(&b) - 0.01).abs() < 1e-12);
        assert!((b.overlap_area(&a) - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_overlap_area_disjoint_on_one_axis() {
        let a = BoundingBox::new(0.0, 0.2, 0.0, 0.2, 0.5, "a");
        let beside = BoundingBox::new(0.3, 0.5, 0.0, 0.2, 0.5, "b");
        let above = BoundingBox::new(0.0, 0.2, 0.3, 0.5, 0.5, "c");
        assert_eq!(a.overlap_area(&beside), 0.0);
        assert_eq!(a.overlap_area(&above), 0.0);
    }

    #[test]
    fn test_overlap_area_touching_edges() {
        let a = BoundingBox::new(0.0, 0.2, 0.0, 0.2, 0.5, "a");
        let b = BoundingBox::new(0.2, 0.4, 0.0, 0.2, 0.5, "b");
        assert_eq!(a.overlap_area(&b), 0.0);
    }

    #[test]
    fn test_overlap_area_nan_edges() {
        let a = BoundingBox::new(f64::NAN, 0.2, 0.0, 0.2, 0.5, "a");
        let b = BoundingBox::new(0.0, 0.2, 0.0, 0.2, 0.5, "b");
        assert_eq!(a.overlap_area(&b), 0.0);
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(b.overlap_area(&a), 0.0);
        assert!(!a.is_finite());
        assert!(b.is_finite());
    }

    #[test]
    fn test_overlap_area_infinite_edges() {
        let a = BoundingBox::new(0.0, f64::INFINITY, 0.0, 0.2, 0.5, "a");
        let b = BoundingBox::new(0.0, 0.2, f64::NEG_INFINITY, 0.2, 0.5, "b");
        let c = BoundingBox::new(0.0, 0.2, 0.0, 0.2, 0.5, "c");
        assert_eq!(a.overlap_area(&c), 0.0);
        assert_eq!(c.overlap_area(&b), 0.0);
        assert_eq!(a.horizontal_overlap(&c), 0.0);
    }

    #[test]
    fn test_iou_identical() {
        let a = BoundingBox::new(0.1, 0.4, 0.1, 0.6, 0.5, "a");
        assert_eq!(a.iou(&a), 1.0);
    }

    #[test]
    fn test_iou_known_value() {
        let a = BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.7, "a");
        let b = BoundingBox::new(0.0499, 0.15, 0.05, 0.15, 0.7, "a");
        let iou = a.iou(&b);
        assert!(iou > 0.143 && iou < 0.144, "iou was {}", iou);
    }

    #[test]
    fn test_iou_below_tolerance_is_zero() {
        let a = BoundingBox::new(0.0, 0.1, 0.0, 0.1, 0.5, "a");
        let b = BoundingBox::new(0.0999999, 0.2, 0.0999999, 0.2, 0.5, "b");
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn test_iou_with_degenerate_box() {
        let a = BoundingBox::new(0.1, 0.4, 0.1, 0.6, 0.5, "a");
        let flat = BoundingBox::new(0.2, 0.2, 0.2, 0.5, 0.5, "flat");
        assert_eq!(a.iou(&flat), 0.0);
        assert_eq!(flat.iou(&flat), 0.0);
    }

    #[test]
    fn test_horizontal_overlap() {
        let a = BoundingBox::new(0.33, 0.66, 0.1, 0.5, 0.5, "a");
        let b = BoundingBox::new(0.10, 0.34, 0.45, 0.55, 0.5, "b");
        let c = BoundingBox::new(0.10, 0.32, 0.45, 0.55, 0.5, "c");
        assert!(a.horizontal_overlap(&b) > 0.0);
        assert_eq!(a.horizontal_overlap(&c), 0.0);
    }

    #[test]
    fn test_from_pixels_flips_vertical_axis() {
        let b = BoundingBox::from_pixels((64.0, 0.0, 320.0, 120.0), 640, 480, 0.8, "cup");
        assert!((b.left - 0.1).abs() < 1e-12);
        assert!((b.right - 0.5).abs() < 1e-12);
        assert!((b.lower - 0.75).abs() < 1e-12);
        assert!((b.upper - 1.0).abs() < 1e-12);
        assert_eq!(b.label, "cup");
    }

    #[test]
    fn test_from_pixels_zero_frame() {
        let b = BoundingBox::from_pixels((10.0, 10.0, 20.0, 20.0), 0, 480, 0.8, "cup");
        assert_eq!(b.area(), 0.0);
    }
}
