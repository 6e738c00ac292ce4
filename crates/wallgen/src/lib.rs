//! Stroke-to-geometry compiler for wallsketch.
//!
//! This crate turns a sealed stroke record into level geometry:
//! - **Extrude**: straight segments and brush cells as oriented boxes
//! - **Ribbon**: curved walls swept along cubic Bezier curves
//! - **Compiler**: per-stroke dispatch, brush batching, collider lists
//! - **Arena**: one shared vertex/index buffer for upload
//!
//! Everything here is synchronous and pure. Degenerate strokes are repaired
//! and reported as warnings instead of failing the build.

pub mod arena;
pub mod compiler;
pub mod extrude;
pub mod mesh;
pub mod ribbon;

pub use arena::{GpuVertex, MeshArena, PrimitiveRange};
pub use compiler::{
    ColliderDescriptor, ColliderShape, CompiledLevel, GeometryCompiler, GeometryWarning,
    world_point,
};
pub use extrude::{SegmentBox, SegmentExtruder, look_rotation};
pub use mesh::{BoxTransform, CollisionBox, GeometryPrimitive, PrimitiveKind, recalculate_normals};
pub use ribbon::{CurveRibbonBuilder, RibbonMesh, bezier_point};
