//! Straight wall segments and brush cells as extruded boxes.
//!
//! A segment between two ground points becomes a unit cube stretched to
//! `(thickness, height, length)`, turned so its local +Z runs along the
//! segment, and lifted so its base sits on the points.

use glam::{Mat3, Quat, Vec3};

use crate::mesh::{BoxTransform, CollisionBox, GeometryPrimitive, PrimitiveKind};

/// Segments shorter than this are treated as a single point
pub const EPSILON: f32 = 1e-6;

/// Box placement for one segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBox {
    pub transform: BoxTransform,
    /// The endpoints coincided and the cube fallback was used
    pub degenerate: bool,
}

/// Rotation whose local +Z points along `forward` with local +Y as close to
/// `up` as possible.
///
/// Falls back to +Z as the up hint when `forward` is parallel to `up`, and
/// to identity when `forward` has no length.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let Some(forward) = forward.try_normalize() else {
        return Quat::IDENTITY;
    };

    let right = up
        .cross(forward)
        .try_normalize()
        .or_else(|| Vec3::Z.cross(forward).try_normalize())
        .unwrap_or(Vec3::X);
    let up = forward.cross(right);

    Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
}

/// Turns segments and cells into boxes with matching colliders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentExtruder {
    shrink: f32,
}

impl Default for SegmentExtruder {
    fn default() -> Self {
        Self { shrink: 1.0 }
    }
}

impl SegmentExtruder {
    /// Create an extruder whose colliders are scaled by `shrink`.
    ///
    /// Values outside `(0, 1]` are clamped into it; NaN becomes 1.
    pub fn new(shrink: f32) -> Self {
        let shrink = if shrink.is_nan() {
            1.0
        } else {
            shrink.clamp(f32::MIN_POSITIVE, 1.0)
        };
        Self { shrink }
    }

    pub fn shrink(&self) -> f32 {
        self.shrink
    }

    /// Box placement for the segment `p1 -> p2`.
    ///
    /// Coincident endpoints produce a `thickness x height x thickness` cube
    /// centred over `p1` with no rotation.
    pub fn segment_box(&self, p1: Vec3, p2: Vec3, thickness: f32, height: f32) -> SegmentBox {
        let direction = p2 - p1;
        let length = direction.length();
        let lift = Vec3::Y * (height * 0.5);

        if !(length >= EPSILON) {
            return SegmentBox {
                transform: BoxTransform {
                    center: p1 + lift,
                    rotation: Quat::IDENTITY,
                    scale: Vec3::new(thickness, height, thickness),
                },
                degenerate: true,
            };
        }

        SegmentBox {
            transform: BoxTransform {
                center: (p1 + p2) * 0.5 + lift,
                rotation: look_rotation(direction, Vec3::Y),
                scale: Vec3::new(thickness, height, length),
            },
            degenerate: false,
        }
    }

    /// Collider for a box, scaled by this extruder's shrink factor
    pub fn collider(&self, transform: &BoxTransform) -> CollisionBox {
        CollisionBox::from_transform(transform, self.shrink)
    }

    /// Extrude the segment `p1 -> p2` into a single wall box.
    ///
    /// The result is untagged (`stroke_index` None, white); the compiler
    /// fills in its source stroke.
    pub fn extrude(&self, p1: Vec3, p2: Vec3, thickness: f32, height: f32) -> GeometryPrimitive {
        let segment = self.segment_box(p1, p2, thickness, height);
        self.single_box(PrimitiveKind::Wall, segment.transform)
    }

    /// Axis-aligned box of `size` standing on `center`.
    pub fn cell_transform(&self, center: Vec3, size: Vec3) -> BoxTransform {
        BoxTransform {
            center: center + Vec3::Y * (size.y * 0.5),
            rotation: Quat::IDENTITY,
            scale: size,
        }
    }

    /// A single brush cell as its own primitive.
    pub fn extrude_cell(&self, center: Vec3, size: Vec3) -> GeometryPrimitive {
        self.single_box(PrimitiveKind::BrushBatch, self.cell_transform(center, size))
    }

    fn single_box(&self, kind: PrimitiveKind, transform: BoxTransform) -> GeometryPrimitive {
        let mut primitive = GeometryPrimitive::new(kind, None, [1.0; 4]);
        primitive.append_box(&transform);
        primitive.colliders.push(self.collider(&transform));
        primitive.transform = Some(transform);
        primitive
    }
}
