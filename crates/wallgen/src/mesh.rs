//! Geometry primitives produced by the compiler.
//!
//! A [`GeometryPrimitive`] is a plain triangle list plus the collision data
//! physics needs. Primitives own their buffers; nothing is shared between
//! them, so they can be uploaded or serialized independently.

#[cfg(feature = "bevy")]
use bevy::asset::RenderAssetUsages;
#[cfg(feature = "bevy")]
use bevy::mesh::{Indices, PrimitiveTopology};
#[cfg(feature = "bevy")]
use bevy::prelude::Mesh;
use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use strokes::Rgba;

/// What a primitive was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// Extruded box over a straight line stroke
    Wall,
    /// All cells or wall segments of one brush stroke
    BrushBatch,
    /// Curved wall swept along a Bezier curve
    Ribbon,
    /// Ground plane under the board
    Ground,
}

/// Placement of a single unit box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxTransform {
    pub center: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl BoxTransform {
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.center)
    }

    /// Transform a point given in unit-cube space
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.center + self.rotation * (local * self.scale)
    }
}

/// Oriented box collider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub orientation: Quat,
}

impl CollisionBox {
    /// Collider matching a box transform, scaled down by `shrink`
    pub fn from_transform(transform: &BoxTransform, shrink: f32) -> Self {
        Self {
            center: transform.center,
            half_extents: transform.scale * 0.5 * shrink,
            orientation: transform.rotation,
        }
    }

    /// Whether a world point lies inside (or on) the box
    pub fn contains(&self, point: Vec3) -> bool {
        let local = self.orientation.inverse() * (point - self.center);
        local.abs().cmple(self.half_extents + Vec3::splat(1e-5)).all()
    }

    /// The eight corners in world space
    pub fn corners(&self) -> [Vec3; 8] {
        let mut corners = [Vec3::ZERO; 8];
        for (i, corner) in corners.iter_mut().enumerate() {
            let sign = Vec3::new(
                if i & 1 == 0 { -1.0 } else { 1.0 },
                if i & 2 == 0 { -1.0 } else { 1.0 },
                if i & 4 == 0 { -1.0 } else { 1.0 },
            );
            *corner = self.center + self.orientation * (sign * self.half_extents);
        }
        corners
    }
}

/// Faces of the unit cube as (normal, u, v) with `u x v == normal`.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::Y, Vec3::Z),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::Z, Vec3::X),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::Y, Vec3::X),
];

/// Vertices per box (4 per face so every face keeps a flat normal)
pub const BOX_VERTEX_COUNT: usize = 24;
/// Indices per box
pub const BOX_INDEX_COUNT: usize = 36;

/// Triangle mesh with collision data, one per compiled stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryPrimitive {
    pub kind: PrimitiveKind,
    /// Source stroke, `None` for generated geometry such as the ground
    pub stroke_index: Option<usize>,
    pub color: Rgba,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// Triangle list into `positions`
    pub indices: Vec<u32>,
    /// Set when the primitive is exactly one box
    pub transform: Option<BoxTransform>,
    /// Box colliders; empty means no box collision
    pub colliders: Vec<CollisionBox>,
    /// Physics should collide against the triangle mesh itself
    pub mesh_collider: bool,
}

impl GeometryPrimitive {
    /// Create an empty primitive
    pub fn new(kind: PrimitiveKind, stroke_index: Option<usize>, color: Rgba) -> Self {
        Self {
            kind,
            stroke_index,
            color,
            positions: Vec::new(),
            normals: Vec::new(),
            indices: Vec::new(),
            transform: None,
            colliders: Vec::new(),
            mesh_collider: false,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a unit cube placed by `transform`.
    ///
    /// Faces are wound counter-clockwise seen from outside and carry flat
    /// normals.
    pub fn append_box(&mut self, transform: &BoxTransform) {
        self.positions.reserve(BOX_VERTEX_COUNT);
        self.normals.reserve(BOX_VERTEX_COUNT);
        self.indices.reserve(BOX_INDEX_COUNT);

        for (normal, u, v) in CUBE_FACES {
            let base = self.positions.len() as u32;
            let face_center = normal * 0.5;
            for (su, sv) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                let local = face_center + u * su + v * sv;
                self.positions.push(transform.transform_point(local));
                self.normals.push(transform.rotation * normal);
            }
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    /// Append raw triangles, offsetting their indices past the current
    /// vertices.
    pub fn append_triangles(&mut self, positions: &[Vec3], normals: &[Vec3], indices: &[u32]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(positions);
        self.normals.extend_from_slice(normals);
        self.indices.extend(indices.iter().map(|i| base + i));
    }

    /// Replace the normals with ones computed from the triangles
    pub fn recalculate_normals(&mut self) {
        self.normals = recalculate_normals(&self.positions, &self.indices);
    }

    /// Axis-aligned bounds as (min, max), `None` when empty
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(min, max), p| (min.min(*p), max.max(*p))),
        )
    }

    /// Whether every vertex, normal and collider value is finite
    pub fn is_finite(&self) -> bool {
        self.positions.iter().all(|p| p.is_finite())
            && self.normals.iter().all(|n| n.is_finite())
            && self.colliders.iter().all(|c| {
                c.center.is_finite() && c.half_extents.is_finite() && c.orientation.is_finite()
            })
    }

    /// Convert to a Bevy mesh with position, normal and vertex color
    /// attributes
    #[cfg(feature = "bevy")]
    pub fn to_bevy_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.positions.iter().map(|p| p.to_array()).collect();
        let normals: Vec<[f32; 3]> = self.normals.iter().map(|n| n.to_array()).collect();
        let colors: Vec<[f32; 4]> = vec![self.color; self.positions.len()];

        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::default(),
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
        mesh.insert_indices(Indices::U32(self.indices.clone()));
        mesh
    }
}

/// Per-vertex normals as the area-weighted average of adjacent face
/// normals. Vertices no triangle touches, or whose faces cancel out, get +Y.
pub fn recalculate_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut accumulated = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (Some(&pa), Some(&pb), Some(&pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        // Cross product length is twice the triangle area
        let face = (pb - pa).cross(pc - pa);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    accumulated
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> GeometryPrimitive {
        let mut primitive = GeometryPrimitive::new(PrimitiveKind::Wall, Some(0), [1.0; 4]);
        primitive.append_box(&BoxTransform {
            center: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        });
        primitive
    }

    #[test]
    fn test_box_counts() {
        let primitive = unit_box();
        assert_eq!(primitive.vertex_count(), BOX_VERTEX_COUNT);
        assert_eq!(primitive.indices.len(), BOX_INDEX_COUNT);
        assert_eq!(primitive.triangle_count(), 12);
    }

    #[test]
    fn test_box_faces_wound_outward() {
        let primitive = unit_box();
        for triangle in primitive.indices.chunks_exact(3) {
            let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| primitive.positions[i as usize]);
            let face_normal = (b - a).cross(c - a).normalize();
            let centroid = (a + b + c) / 3.0;
            assert!(face_normal.dot(centroid) > 0.0, "Face points inward: {triangle:?}");
            assert!(face_normal.abs_diff_eq(primitive.normals[triangle[0] as usize], 1e-6));
        }
    }

    #[test]
    fn test_box_bounds_follow_scale() {
        let mut primitive = GeometryPrimitive::new(PrimitiveKind::Wall, None, [1.0; 4]);
        primitive.append_box(&BoxTransform {
            center: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::IDENTITY,
            scale: Vec3::new(2.0, 4.0, 6.0),
        });
        let (min, max) = primitive.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec3::ZERO, 1e-6));
        assert!(max.abs_diff_eq(Vec3::new(2.0, 4.0, 6.0), 1e-6));
    }

    #[test]
    fn test_recalculate_normals_flat_quad() {
        let positions = [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(5.0, 5.0, 5.0),
        ];
        let normals = recalculate_normals(&positions, &[0, 1, 2, 0, 2, 3]);
        for normal in &normals[..4] {
            assert!(normal.abs_diff_eq(Vec3::Y, 1e-6));
        }
        // untouched vertex
        assert_eq!(normals[4], Vec3::Y);
    }

    #[test]
    fn test_recalculate_normals_area_weighted() {
        // A large triangle facing +Y and a tiny one facing +X share vertex 0
        let positions = [
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.1, 0.0),
            Vec3::new(0.0, 0.0, 0.1),
        ];
        let normals = recalculate_normals(&positions, &[0, 1, 2, 0, 3, 4]);
        assert!(normals[0].y > 0.99);
        assert!(normals[3].abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_collision_box_contains() {
        let collider = CollisionBox {
            center: Vec3::new(5.0, 1.0, 0.0),
            half_extents: Vec3::new(0.5, 1.0, 5.0),
            orientation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        };
        // local Z maps to world X after the quarter turn
        assert!(collider.contains(Vec3::new(9.9, 1.0, 0.0)));
        assert!(!collider.contains(Vec3::new(5.0, 1.0, 2.0)));
        for corner in collider.corners() {
            assert!(collider.contains(corner));
        }
    }

    #[test]
    fn test_append_triangles_offsets_indices() {
        let mut primitive = unit_box();
        primitive.append_triangles(
            &[Vec3::ZERO, Vec3::X, Vec3::Z],
            &[Vec3::Y; 3],
            &[0, 2, 1],
        );
        assert_eq!(&primitive.indices[36..], &[24, 26, 25]);
        assert_eq!(primitive.vertex_count(), 27);
    }
}
