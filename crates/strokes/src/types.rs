//! Core stroke types.
//!
//! A stroke's tool decides how its points are read back: brush points are
//! independent cells along a path, a line is exactly two endpoints and a
//! curve is exactly four Bezier control points. The shape is a sum type so
//! line and curve strokes cannot hold the wrong number of points.

use serde::{Deserialize, Serialize};

use crate::validation::StrokeShapeError;

/// A point in normalized canvas space, centred on the canvas (-0.5..0.5).
pub type Point2 = glam::Vec2;

/// Color as [r, g, b, a] in 0..1
pub type Rgba = [f32; 4];

/// Drawing tool that produced a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ToolKind {
    Brush = 0,
    Line = 1,
    Curve = 2,
}

impl ToolKind {
    /// Exact point count this tool requires, `None` for brush paths
    pub fn expected_points(self) -> Option<usize> {
        match self {
            ToolKind::Brush => None,
            ToolKind::Line => Some(2),
            ToolKind::Curve => Some(4),
        }
    }

    /// Token used in the record format
    pub fn as_str(self) -> &'static str {
        match self {
            ToolKind::Brush => "brush",
            ToolKind::Line => "line",
            ToolKind::Curve => "curve",
        }
    }

    /// Decode the integer token written by older records
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(ToolKind::Brush),
            1 => Some(ToolKind::Line),
            2 => Some(ToolKind::Curve),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Non-empty ordered point path of a brush stroke
#[derive(Debug, Clone, PartialEq)]
pub struct BrushPath {
    points: Vec<Point2>,
}

impl BrushPath {
    /// Wrap a point path, rejecting empty paths
    pub fn new(points: Vec<Point2>) -> Result<Self, StrokeShapeError> {
        if points.is_empty() {
            return Err(StrokeShapeError::EmptyBrush);
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false, kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Geometry-bearing payload of a stroke
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeShape {
    /// Stamped cells along a path
    Brush(BrushPath),
    /// One straight segment between two endpoints
    Line([Point2; 2]),
    /// Cubic Bezier control points P0..P3
    Curve([Point2; 4]),
}

impl StrokeShape {
    pub fn tool(&self) -> ToolKind {
        match self {
            StrokeShape::Brush(_) => ToolKind::Brush,
            StrokeShape::Line(_) => ToolKind::Line,
            StrokeShape::Curve(_) => ToolKind::Curve,
        }
    }

    pub fn points(&self) -> &[Point2] {
        match self {
            StrokeShape::Brush(path) => path.points(),
            StrokeShape::Line(points) => points,
            StrokeShape::Curve(points) => points,
        }
    }
}

/// One sealed stroke: tool shape, color and width.
///
/// Fields are private so a stroke cannot be altered once built; width is
/// always positive, every point finite and every color channel in 0..=1.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    color: Rgba,
    width: f32,
    shape: StrokeShape,
}

impl Stroke {
    /// Build a stroke from an already-typed shape.
    ///
    /// Color channels outside 0..=1 are clamped; non-finite ones are rejected.
    pub fn new(color: Rgba, width: f32, shape: StrokeShape) -> Result<Self, StrokeShapeError> {
        if !(width > 0.0 && width.is_finite()) {
            return Err(StrokeShapeError::InvalidWidth(width));
        }
        if let Some(index) = shape.points().iter().position(|p| !p.is_finite()) {
            return Err(StrokeShapeError::NonFinitePoint { index });
        }
        if let Some(channel) = color.iter().position(|c| !c.is_finite()) {
            return Err(StrokeShapeError::NonFiniteColor { channel });
        }
        Ok(Self {
            color: color.map(|c| c.clamp(0.0, 1.0)),
            width,
            shape,
        })
    }

    /// Build a stroke from a tool kind and a loose point list.
    ///
    /// This is the boundary where point counts are checked; past it the
    /// shape type guarantees them.
    pub fn from_points(
        tool: ToolKind,
        color: Rgba,
        width: f32,
        points: Vec<Point2>,
    ) -> Result<Self, StrokeShapeError> {
        let shape = match tool {
            ToolKind::Brush => StrokeShape::Brush(BrushPath::new(points)?),
            ToolKind::Line => {
                let found = points.len();
                let points: [Point2; 2] = points
                    .try_into()
                    .map_err(|_| StrokeShapeError::WrongPointCount {
                        tool,
                        expected: 2,
                        found,
                    })?;
                StrokeShape::Line(points)
            }
            ToolKind::Curve => {
                let found = points.len();
                let points: [Point2; 4] = points
                    .try_into()
                    .map_err(|_| StrokeShapeError::WrongPointCount {
                        tool,
                        expected: 4,
                        found,
                    })?;
                StrokeShape::Curve(points)
            }
        };
        Self::new(color, width, shape)
    }

    /// Convenience constructor for a straight line stroke
    pub fn line(color: Rgba, width: f32, from: Point2, to: Point2) -> Result<Self, StrokeShapeError> {
        Self::new(color, width, StrokeShape::Line([from, to]))
    }

    /// Convenience constructor for a curve stroke
    pub fn curve(color: Rgba, width: f32, controls: [Point2; 4]) -> Result<Self, StrokeShapeError> {
        Self::new(color, width, StrokeShape::Curve(controls))
    }

    /// Convenience constructor for a brush stroke
    pub fn brush(color: Rgba, width: f32, points: Vec<Point2>) -> Result<Self, StrokeShapeError> {
        Self::new(color, width, StrokeShape::Brush(BrushPath::new(points)?))
    }

    pub fn tool(&self) -> ToolKind {
        self.shape.tool()
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn shape(&self) -> &StrokeShape {
        &self.shape
    }

    pub fn points(&self) -> &[Point2] {
        self.shape.points()
    }
}

/// Ordered list of strokes, the unit of persistence.
///
/// Order is meaningful: later strokes are layered over earlier ones and all
/// geometry is additive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrokeRecord {
    pub strokes: Vec<Stroke>,
}

impl StrokeRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_strokes(strokes: Vec<Stroke>) -> Self {
        Self { strokes }
    }

    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Stroke> {
        self.strokes.iter()
    }

    /// Total number of recorded points across all strokes
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(|s| s.points().len()).sum()
    }
}

impl<'a> IntoIterator for &'a StrokeRecord {
    type Item = &'a Stroke;
    type IntoIter = std::slice::Iter<'a, Stroke>;

    fn into_iter(self) -> Self::IntoIter {
        self.strokes.iter()
    }
}
