//! Curved walls swept along a cubic Bezier curve.
//!
//! The curve is sampled at `segments + 1` evenly spaced parameters. Each
//! sample becomes a cross-section of four vertices (bottom-left,
//! bottom-right, top-left, top-right) offset sideways by half the wall
//! thickness, and consecutive cross-sections are stitched into quads.

use glam::Vec3;
use tracing::debug;

use crate::mesh::{GeometryPrimitive, PrimitiveKind};

/// Vertices per cross-section
pub const VERTICES_PER_SAMPLE: usize = 4;
/// Indices per interval: two front and two top triangles
pub const INDICES_PER_INTERVAL: usize = 12;
/// Indices per interval when the back side is closed as well
pub const INDICES_PER_INTERVAL_DOUBLE_SIDED: usize = 18;

/// Point on the cubic Bezier curve P0..P3 at parameter `t` (Bernstein form).
pub fn bezier_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;
    p0 * (uu * u) + p1 * (3.0 * uu * t) + p2 * (3.0 * u * tt) + p3 * (tt * t)
}

/// Ribbon primitive plus the samples whose tangent had to be substituted
#[derive(Debug, Clone, PartialEq)]
pub struct RibbonMesh {
    pub primitive: GeometryPrimitive,
    /// Sample indices where the curve tangent was zero or vertical
    pub degenerate_samples: Vec<usize>,
}

/// Builds ribbon walls along Bezier curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveRibbonBuilder {
    /// Number of intervals along the curve, at least 1
    pub segments: u32,
    pub thickness: f32,
    pub height: f32,
    /// Also emit the right-hand side of the wall
    pub double_sided: bool,
}

impl Default for CurveRibbonBuilder {
    fn default() -> Self {
        Self {
            segments: 20,
            thickness: 0.5,
            height: 3.0,
            double_sided: false,
        }
    }
}

impl CurveRibbonBuilder {
    pub fn new(segments: u32, thickness: f32, height: f32) -> Self {
        Self {
            segments: segments.max(1),
            thickness,
            height,
            double_sided: false,
        }
    }

    pub fn with_double_sided(mut self, double_sided: bool) -> Self {
        self.double_sided = double_sided;
        self
    }

    /// Indices emitted per interval with the current settings
    pub fn indices_per_interval(&self) -> usize {
        if self.double_sided {
            INDICES_PER_INTERVAL_DOUBLE_SIDED
        } else {
            INDICES_PER_INTERVAL
        }
    }

    /// Sweep the wall along the curve P0..P3.
    ///
    /// The result is untagged (`stroke_index` None, white) and collides as
    /// a triangle mesh.
    pub fn build(&self, p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> RibbonMesh {
        let segments = self.segments.max(1) as usize;
        let samples: Vec<Vec3> = (0..=segments)
            .map(|i| bezier_point(p0, p1, p2, p3, i as f32 / segments as f32))
            .collect();

        let (offsets, degenerate_samples) = self.side_offsets(&samples, p3 - p0);

        let mut primitive = GeometryPrimitive::new(PrimitiveKind::Ribbon, None, [1.0; 4]);
        primitive.positions.reserve(samples.len() * VERTICES_PER_SAMPLE);
        primitive
            .indices
            .reserve(segments * self.indices_per_interval());

        let rise = Vec3::Y * self.height;
        for (point, offset) in samples.iter().zip(&offsets) {
            let left = *point - *offset;
            let right = *point + *offset;
            primitive
                .positions
                .extend_from_slice(&[left, right, left + rise, right + rise]);
        }

        for interval in 0..segments {
            let i0 = (interval * VERTICES_PER_SAMPLE) as u32;
            let i1 = i0 + VERTICES_PER_SAMPLE as u32;
            // left face
            primitive
                .indices
                .extend_from_slice(&[i0, i0 + 2, i1, i0 + 2, i1 + 2, i1]);
            // top
            primitive
                .indices
                .extend_from_slice(&[i0 + 2, i0 + 3, i1 + 2, i0 + 3, i1 + 3, i1 + 2]);
            if self.double_sided {
                primitive
                    .indices
                    .extend_from_slice(&[i0 + 1, i1 + 1, i0 + 3, i0 + 3, i1 + 1, i1 + 3]);
            }
        }

        primitive.recalculate_normals();
        primitive.mesh_collider = true;

        if !degenerate_samples.is_empty() {
            debug!(
                "Ribbon had {} degenerate tangent samples",
                degenerate_samples.len()
            );
        }

        RibbonMesh {
            primitive,
            degenerate_samples,
        }
    }

    /// Half-thickness sideways offsets for every sample.
    ///
    /// A tangent that is zero or parallel to up reuses the last good
    /// direction, then the chord, then +Z.
    fn side_offsets(&self, samples: &[Vec3], chord: Vec3) -> (Vec<Vec3>, Vec<usize>) {
        let last = samples.len() - 1;
        let half = self.thickness * 0.5;
        let mut offsets = Vec::with_capacity(samples.len());
        let mut degenerate = Vec::new();
        let mut previous: Option<Vec3> = None;

        for i in 0..samples.len() {
            let next = samples[(i + 1).min(last)];
            let prev = samples[i.saturating_sub(1)];
            let tangent = next - prev;

            let side = match side_direction(tangent) {
                Some(side) => side,
                None => {
                    degenerate.push(i);
                    previous
                        .or_else(|| side_direction(chord))
                        .unwrap_or_else(|| Vec3::Z.cross(Vec3::Y))
                }
            };
            previous = Some(side);
            offsets.push(side * half);
        }

        (offsets, degenerate)
    }
}

/// Unit vector to the right of `tangent` on the ground plane
fn side_direction(tangent: Vec3) -> Option<Vec3> {
    tangent.cross(Vec3::Y).try_normalize()
}
