//! Mapping pointer positions on a drawing surface into canvas space.

use crate::constants::CANVAS_HALF_EXTENT;
use crate::types::Point2;

/// Size of the on-screen drawing surface, in pixels or any other unit the
/// pointer positions are reported in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasRect {
    pub width: f32,
    pub height: f32,
}

impl CanvasRect {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Whether the rectangle can be used for normalization
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Normalize a position measured from the canvas centre (y up).
    ///
    /// The canvas edges map to -0.5 and 0.5. Positions outside the surface
    /// are clamped onto its border. Returns `None` for an empty rectangle.
    pub fn normalize(&self, local_x: f32, local_y: f32) -> Option<Point2> {
        if !self.is_valid() {
            return None;
        }
        let x = (local_x / self.width).clamp(-CANVAS_HALF_EXTENT, CANVAS_HALF_EXTENT);
        let y = (local_y / self.height).clamp(-CANVAS_HALF_EXTENT, CANVAS_HALF_EXTENT);
        Some(Point2::new(x, y))
    }

    /// Normalize a position measured from the top-left corner (y down),
    /// the convention of most windowing systems.
    pub fn normalize_top_left(&self, px: f32, py: f32) -> Option<Point2> {
        self.normalize(px - self.width * 0.5, self.height * 0.5 - py)
    }
}
