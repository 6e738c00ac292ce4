//! JSON export of a compiled level

use serde::Serialize;
use wallgen::{ColliderDescriptor, CompiledLevel, GeometryPrimitive, GeometryWarning, MeshArena};
use wallsketch_config::BoardExtents;

#[derive(Debug, Serialize)]
pub struct LevelStats {
    pub strokes: usize,
    pub rejected_strokes: usize,
    pub primitives: usize,
    pub vertices: usize,
    pub triangles: usize,
}

/// Everything a level loader needs, borrowed from the compiled level
#[derive(Debug, Serialize)]
pub struct LevelExport<'a> {
    pub board: BoardExtents,
    pub stats: LevelStats,
    pub primitives: &'a [GeometryPrimitive],
    pub colliders: Vec<ColliderDescriptor>,
    pub warnings: &'a [GeometryWarning],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arena: Option<MeshArena>,
}

impl<'a> LevelExport<'a> {
    pub fn new(
        level: &'a CompiledLevel,
        board: BoardExtents,
        strokes: usize,
        rejected_strokes: usize,
        combined: bool,
    ) -> Self {
        Self {
            board,
            stats: LevelStats {
                strokes,
                rejected_strokes,
                primitives: level.primitives.len(),
                vertices: level.vertex_count(),
                triangles: level.triangle_count(),
            },
            primitives: &level.primitives,
            colliders: level.collision_boxes(),
            warnings: &level.warnings,
            arena: combined.then(|| level.combine()),
        }
    }
}
