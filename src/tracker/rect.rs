use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
///
/// Stored as TLBR (left, top, right, bottom). Boxes with `right < left` or
/// `bottom < top` are accepted but count as zero area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    /// Left x coordinate
    pub left: f32,
    /// Top y coordinate
    pub top: f32,
    /// Right x coordinate
    pub right: f32,
    /// Bottom y coordinate
    pub bottom: f32,
}

impl BBox {
    /// Create a BBox from TLBR format (x1, y1, x2, y2).
    #[inline]
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Create a BBox from TLWH format (top-left x, top-left y, width, height).
    #[inline]
    pub fn from_tlwh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    /// Create a BBox from center format (center x, center y, width, height).
    #[inline]
    pub fn from_xywh(cx: f32, cy: f32, width: f32, height: f32) -> Self {
        Self::new(
            cx - width / 2.0,
            cy - height / 2.0,
            cx + width / 2.0,
            cy + height / 2.0,
        )
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    /// Integer pixel coordinates, truncated toward zero.
    #[inline]
    pub fn to_pixels(&self) -> [i32; 4] {
        [
            self.left as i32,
            self.top as i32,
            self.right as i32,
            self.bottom as i32,
        ]
    }

    #[inline]
    pub fn width(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }

    #[inline]
    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }

    /// Area of the box, never negative.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Whether every coordinate is a finite number.
    pub fn is_finite(&self) -> bool {
        self.to_tlbr().iter().all(|v| v.is_finite())
    }

    /// Copy of the box with every coordinate truncated toward zero.
    #[inline]
    pub fn truncated(&self) -> Self {
        let [x1, y1, x2, y2] = self.to_pixels();
        Self::new(x1 as f32, y1 as f32, x2 as f32, y2 as f32)
    }

    /// Intersection over Union with another box, in `[0, 1]`.
    ///
    /// Two degenerate boxes have a union of zero and yield `0.0`. Areas are
    /// accumulated in f64 so extreme finite coordinates cannot overflow.
    pub fn iou(&self, other: &BBox) -> f32 {
        let x1 = self.left.max(other.left) as f64;
        let y1 = self.top.max(other.top) as f64;
        let x2 = self.right.min(other.right) as f64;
        let y2 = self.bottom.min(other.bottom) as f64;

        let inter_width = (x2 - x1).max(0.0);
        let inter_height = (y2 - y1).max(0.0);
        let inter_area = inter_width * inter_height;

        let union_area = self.area_f64() + other.area_f64() - inter_area;

        if union_area > 0.0 {
            (inter_area / union_area).clamp(0.0, 1.0) as f32
        } else {
            0.0
        }
    }

    fn area_f64(&self) -> f64 {
        let width = (self.right as f64 - self.left as f64).max(0.0);
        let height = (self.bottom as f64 - self.top as f64).max(0.0);
        width * height
    }
}

impl From<[f32; 4]> for BBox {
    fn from([left, top, right, bottom]: [f32; 4]) -> Self {
        Self::new(left, top, right, bottom)
    }
}

impl From<BBox> for [f32; 4] {
    fn from(bbox: BBox) -> Self {
        bbox.to_tlbr()
    }
}

use ndarray::Array2;

/// Calculate IoU matrix between two sets of bounding boxes.
///
/// Returns a matrix of shape (M, N) where M is the length of `boxes_a`
/// and N is the length of `boxes_b`.
pub fn iou_batch(boxes_a: &[BBox], boxes_b: &[BBox]) -> Array2<f32> {
    let mut ious = Array2::zeros((boxes_a.len(), boxes_b.len()));
    for (i, a) in boxes_a.iter().enumerate() {
        for (j, b) in boxes_b.iter().enumerate() {
            ious[[i, j]] = a.iou(b);
        }
    }
    ious
}
