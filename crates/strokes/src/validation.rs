use thiserror::Error;

use crate::types::{Point2, ToolKind};

/// Reasons a point list cannot form a stroke of a given tool
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrokeShapeError {
    #[error("Brush stroke has no points")]
    EmptyBrush,
    #[error("{tool} stroke needs exactly {expected} points, got {found}")]
    WrongPointCount {
        tool: ToolKind,
        expected: usize,
        found: usize,
    },
    #[error("Invalid stroke width: {0}")]
    InvalidWidth(f32),
    #[error("Point {index} is not finite")]
    NonFinitePoint { index: usize },
    #[error("Color channel {channel} is not finite")]
    NonFiniteColor { channel: usize },
}

/// Hashable key for exact point equality.
///
/// Adding 0.0 folds -0.0 into 0.0 so the key agrees with `==`.
pub fn point_key(point: Point2) -> (u32, u32) {
    ((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())
}

/// Clamp a simplification threshold to a usable value (NaN and negatives become 0)
pub fn sanitize_threshold(threshold: f32) -> f32 {
    if threshold > 0.0 { threshold } else { 0.0 }
}
