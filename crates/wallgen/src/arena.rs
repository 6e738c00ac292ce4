//! Combined vertex/index buffers for uploading a whole level at once.
//!
//! Every primitive is copied into one shared arena. Indices are rebased so
//! they address the arena's vertex array directly, and each primitive keeps
//! a [`PrimitiveRange`] so it can still be drawn or picked on its own.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
#[cfg(feature = "bevy")]
use bevy::asset::RenderAssetUsages;
#[cfg(feature = "bevy")]
use bevy::mesh::{Indices, PrimitiveTopology};
#[cfg(feature = "bevy")]
use bevy::prelude::Mesh;
use serde::Serialize;

use crate::mesh::{GeometryPrimitive, PrimitiveKind};

/// Interleaved vertex as laid out in the GPU buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Where one primitive lives inside the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimitiveRange {
    pub kind: PrimitiveKind,
    pub stroke_index: Option<usize>,
    pub vertex_start: u32,
    pub vertex_count: u32,
    pub index_start: u32,
    pub index_count: u32,
}

/// All primitives of a level packed into shared buffers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeshArena {
    vertices: Vec<GpuVertex>,
    indices: Vec<u32>,
    ranges: Vec<PrimitiveRange>,
}

impl MeshArena {
    /// Pack `primitives` in order.
    pub fn from_primitives<'a>(primitives: impl IntoIterator<Item = &'a GeometryPrimitive>) -> Self {
        let mut arena = Self::default();
        for primitive in primitives {
            arena.push(primitive);
        }
        arena
    }

    /// Append one primitive and return its range.
    ///
    /// Every position becomes a vertex; missing normals are filled with +Y.
    pub fn push(&mut self, primitive: &GeometryPrimitive) -> PrimitiveRange {
        let vertex_start = self.vertices.len() as u32;
        let index_start = self.indices.len() as u32;

        self.vertices.extend(
            primitive
                .positions
                .iter()
                .zip(primitive.normals.iter().chain(std::iter::repeat(&Vec3::Y)))
                .map(|(position, normal)| GpuVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    color: primitive.color,
                }),
        );
        self.indices
            .extend(primitive.indices.iter().map(|i| vertex_start + i));

        let range = PrimitiveRange {
            kind: primitive.kind,
            stroke_index: primitive.stroke_index,
            vertex_start,
            vertex_count: self.vertices.len() as u32 - vertex_start,
            index_start,
            index_count: self.indices.len() as u32 - index_start,
        };
        self.ranges.push(range);
        range
    }

    pub fn gpu_vertices(&self) -> &[GpuVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn ranges(&self) -> &[PrimitiveRange] {
        &self.ranges
    }

    /// Vertex buffer contents as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Indices of the primitive at `range_index`, already rebased
    pub fn primitive_indices(&self, range_index: usize) -> Option<&[u32]> {
        let range = self.ranges.get(range_index)?;
        let start = range.index_start as usize;
        self.indices.get(start..start + range.index_count as usize)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Convert the whole arena into one Bevy mesh
    #[cfg(feature = "bevy")]
    pub fn to_bevy_mesh(&self) -> Mesh {
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.position).collect();
        let normals: Vec<[f32; 3]> = self.vertices.iter().map(|v| v.normal).collect();
        let colors: Vec<[f32; 4]> = self.vertices.iter().map(|v| v.color).collect();

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
