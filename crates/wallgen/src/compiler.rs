//! Stroke record to level geometry.
//!
//! [`GeometryCompiler`] walks a sealed [`StrokeRecord`] in order and emits
//! one primitive per stroke:
//!
//! - line: one extruded wall box
//! - curve: one ribbon wall
//! - brush: one batch of cells (or wall segments) for the whole stroke
//!
//! Compilation is pure. Degenerate input never fails the build; it is
//! repaired locally and reported as a [`GeometryWarning`].

use std::collections::HashSet;

use glam::Vec3;
use serde::Serialize;
use strokes::{Point2, Rgba, Stroke, StrokeRecord, StrokeShape, point_key, simplify};
use tracing::{debug, info, warn};
use wallsketch_config::{BoardExtents, BrushMode, BuildSettings};

use crate::arena::MeshArena;
use crate::extrude::SegmentExtruder;
use crate::mesh::{CollisionBox, GeometryPrimitive, PrimitiveKind};
use crate::ribbon::CurveRibbonBuilder;

/// Non-fatal problems found while compiling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GeometryWarning {
    #[error("Stroke {stroke_index}: segment {segment} has zero length")]
    ZeroLengthSegment { stroke_index: usize, segment: usize },
    #[error("Stroke {stroke_index}: curve tangent degenerate at sample {sample}")]
    DegenerateTangent { stroke_index: usize, sample: usize },
    #[error("Stroke {stroke_index}: point {point_index} duplicates an earlier point")]
    DuplicateBrushPoint {
        stroke_index: usize,
        point_index: usize,
    },
}

/// Collision shape attached to a primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColliderShape {
    Box(CollisionBox),
    /// Collide against the primitive's own triangles
    TriangleMesh,
}

/// One entry of the collider list, pointing back at its primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColliderDescriptor {
    /// Index into `CompiledLevel::primitives`
    pub primitive: usize,
    pub shape: ColliderShape,
}

/// Output of one compilation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompiledLevel {
    pub primitives: Vec<GeometryPrimitive>,
    pub warnings: Vec<GeometryWarning>,
}

impl CompiledLevel {
    /// Colliders of all primitives, in primitive order
    pub fn collision_boxes(&self) -> Vec<ColliderDescriptor> {
        let mut descriptors = Vec::new();
        for (primitive_index, primitive) in self.primitives.iter().enumerate() {
            descriptors.extend(primitive.colliders.iter().map(|collider| ColliderDescriptor {
                primitive: primitive_index,
                shape: ColliderShape::Box(*collider),
            }));
            if primitive.mesh_collider {
                descriptors.push(ColliderDescriptor {
                    primitive: primitive_index,
                    shape: ColliderShape::TriangleMesh,
                });
            }
        }
        descriptors
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(GeometryPrimitive::vertex_count).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(GeometryPrimitive::triangle_count).sum()
    }

    /// Primitives built from the stroke at `stroke_index`
    pub fn primitives_for_stroke(&self, stroke_index: usize) -> impl Iterator<Item = &GeometryPrimitive> {
        self.primitives
            .iter()
            .filter(move |p| p.stroke_index == Some(stroke_index))
    }

    /// Pack every primitive into one arena for upload
    pub fn combine(&self) -> MeshArena {
        MeshArena::from_primitives(&self.primitives)
    }
}

/// Compiles stroke records with fixed build settings.
#[derive(Debug, Clone, Default)]
pub struct GeometryCompiler {
    settings: BuildSettings,
}

impl GeometryCompiler {
    pub fn new(settings: BuildSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    /// Compile every stroke of `record` onto a board of the given extents.
    pub fn compile(&self, record: &StrokeRecord, board: BoardExtents) -> CompiledLevel {
        let mut level = CompiledLevel::default();

        if self.settings.include_ground {
            level.primitives.push(self.ground(board));
        }

        for (stroke_index, stroke) in record.iter().enumerate() {
            self.compile_stroke(stroke_index, stroke, board, &mut level);
        }

        for warning in &level.warnings {
            warn!("{}", warning);
        }
        info!(
            "Compiled {} strokes into {} primitives ({} vertices, {} warnings)",
            record.len(),
            level.primitives.len(),
            level.vertex_count(),
            level.warnings.len()
        );
        level
    }

    fn compile_stroke(
        &self,
        stroke_index: usize,
        stroke: &Stroke,
        board: BoardExtents,
        level: &mut CompiledLevel,
    ) {
        let primitive = match stroke.shape() {
            StrokeShape::Line([from, to]) => self.line(stroke_index, stroke, *from, *to, board, level),
            StrokeShape::Curve(controls) => self.curve(stroke_index, stroke, controls, board, level),
            StrokeShape::Brush(path) => match self.settings.brush_mode {
                BrushMode::Cells => self.brush_cells(stroke_index, stroke.color(), path.points(), board, level),
                BrushMode::Walls => self.brush_walls(stroke_index, stroke, path.points(), board, level),
            },
        };
        debug!(
            "Stroke {} ({}) -> {} vertices",
            stroke_index,
            stroke.tool(),
            primitive.vertex_count()
        );
        level.primitives.push(primitive);
    }

    fn line(
        &self,
        stroke_index: usize,
        stroke: &Stroke,
        from: Point2,
        to: Point2,
        board: BoardExtents,
        level: &mut CompiledLevel,
    ) -> GeometryPrimitive {
        let extruder = SegmentExtruder::new(self.settings.line_collider_shrink);
        let (p1, p2) = (world_point(board, from), world_point(board, to));
        let thickness = self.settings.wall_thickness(stroke.width());

        if extruder
            .segment_box(p1, p2, thickness, self.settings.wall_height)
            .degenerate
        {
            level.warnings.push(GeometryWarning::ZeroLengthSegment {
                stroke_index,
                segment: 0,
            });
        }

        let mut primitive = extruder.extrude(p1, p2, thickness, self.settings.wall_height);
        tag(&mut primitive, stroke_index, stroke.color());
        primitive
    }

    fn curve(
        &self,
        stroke_index: usize,
        stroke: &Stroke,
        controls: &[Point2; 4],
        board: BoardExtents,
        level: &mut CompiledLevel,
    ) -> GeometryPrimitive {
        let builder = CurveRibbonBuilder::new(
            self.settings.curve_segments,
            self.settings.wall_thickness(stroke.width()),
            self.settings.wall_height,
        )
        .with_double_sided(self.settings.double_sided_ribbons);

        let [p0, p1, p2, p3] = (*controls).map(|p| world_point(board, p));
        let ribbon = builder.build(p0, p1, p2, p3);

        level.warnings.extend(
            ribbon
                .degenerate_samples
                .iter()
                .map(|&sample| GeometryWarning::DegenerateTangent {
                    stroke_index,
                    sample,
                }),
        );

        let mut primitive = ribbon.primitive;
        tag(&mut primitive, stroke_index, stroke.color());
        primitive
    }

    /// One cell per distinct recorded point, all in one batch.
    fn brush_cells(
        &self,
        stroke_index: usize,
        color: Rgba,
        points: &[Point2],
        board: BoardExtents,
        level: &mut CompiledLevel,
    ) -> GeometryPrimitive {
        let extruder = SegmentExtruder::new(self.settings.brush_collider_shrink);
        let cell_size = Vec3::from_array(self.settings.brush_cell_size);

        let mut batch = GeometryPrimitive::new(PrimitiveKind::BrushBatch, Some(stroke_index), color);
        let mut seen = HashSet::with_capacity(points.len());

        for (point_index, point) in points.iter().enumerate() {
            if !seen.insert(point_key(*point)) {
                level.warnings.push(GeometryWarning::DuplicateBrushPoint {
                    stroke_index,
                    point_index,
                });
                continue;
            }
            let transform = extruder.cell_transform(world_point(board, *point), cell_size);
            batch.append_box(&transform);
            batch.colliders.push(extruder.collider(&transform));
        }

        batch
    }

    /// One wall per consecutive pair of simplified points, all in one batch.
    ///
    /// Zero-length pairs are dropped. A stroke that leaves no segment at
    /// all still gets a single cube so it does not vanish.
    fn brush_walls(
        &self,
        stroke_index: usize,
        stroke: &Stroke,
        points: &[Point2],
        board: BoardExtents,
        level: &mut CompiledLevel,
    ) -> GeometryPrimitive {
        let extruder = SegmentExtruder::new(self.settings.brush_collider_shrink);
        let thickness = self.settings.brush_wall_thickness(stroke.width());
        let height = self.settings.wall_height;
        let kept: Vec<Vec3> = simplify(points, self.settings.simplify_threshold)
            .into_iter()
            .map(|p| world_point(board, p))
            .collect();

        let mut batch =
            GeometryPrimitive::new(PrimitiveKind::BrushBatch, Some(stroke_index), stroke.color());

        for (segment, pair) in kept.windows(2).enumerate() {
            let segment_box = extruder.segment_box(pair[0], pair[1], thickness, height);
            if segment_box.degenerate {
                level.warnings.push(GeometryWarning::ZeroLengthSegment {
                    stroke_index,
                    segment,
                });
                continue;
            }
            batch.append_box(&segment_box.transform);
            batch.colliders.push(extruder.collider(&segment_box.transform));
        }

        if let (true, Some(&start)) = (batch.is_empty(), kept.first()) {
            if kept.len() == 1 {
                level.warnings.push(GeometryWarning::ZeroLengthSegment {
                    stroke_index,
                    segment: 0,
                });
            }
            let cube = extruder.segment_box(start, start, thickness, height);
            batch.append_box(&cube.transform);
            batch.colliders.push(extruder.collider(&cube.transform));
        }

        batch
    }

    /// Board-sized ground quad centred on the origin, with a thin collider
    /// just below y = 0.
    fn ground(&self, board: BoardExtents) -> GeometryPrimitive {
        let (hx, hz) = (board.width * 0.5, board.depth * 0.5);
        let thickness = self.settings.ground_thickness;

        let mut ground = GeometryPrimitive::new(PrimitiveKind::Ground, None, [1.0; 4]);
        ground.append_triangles(
            &[
                Vec3::new(-hx, 0.0, -hz),
                Vec3::new(-hx, 0.0, hz),
                Vec3::new(hx, 0.0, hz),
                Vec3::new(hx, 0.0, -hz),
            ],
            &[Vec3::Y; 4],
            &[0, 1, 2, 0, 2, 3],
        );
        ground.colliders.push(CollisionBox {
            center: Vec3::new(0.0, -thickness * 0.5, 0.0),
            half_extents: Vec3::new(hx, thickness * 0.5, hz),
            orientation: glam::Quat::IDENTITY,
        });
        ground
    }
}

/// Canvas point to ground-plane world position
pub fn world_point(board: BoardExtents, point: Point2) -> Vec3 {
    Vec3::from_array(board.to_world(point.x, point.y))
}

fn tag(primitive: &mut GeometryPrimitive, stroke_index: usize, color: Rgba) {
    primitive.stroke_index = Some(stroke_index);
    primitive.color = color;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{BOX_INDEX_COUNT, BOX_VERTEX_COUNT};

    const BLACK: Rgba = [0.0, 0.0, 0.0, 1.0];

    fn board() -> BoardExtents {
        BoardExtents::new(10.0, 10.0)
    }

    fn line(from: (f32, f32), to: (f32, f32), width: f32) -> Stroke {
        Stroke::line(BLACK, width, Point2::new(from.0, from.1), Point2::new(to.0, to.1)).unwrap()
    }

    fn mixed_record() -> StrokeRecord {
        StrokeRecord::from_strokes(vec![
            line((0.0, 0.0), (0.4, 0.1), 1.0),
            Stroke::curve(
                [0.5, 0.5, 0.5, 1.0],
                0.5,
                [
                    Point2::new(-0.4, -0.4),
                    Point2::new(-0.4, 0.0),
                    Point2::new(0.0, 0.0),
                    Point2::new(0.0, -0.4),
                ],
            )
            .unwrap(),
            Stroke::brush(
                BLACK,
                5.0,
                vec![
                    Point2::new(0.1, 0.1),
                    Point2::new(0.2, 0.1),
                    Point2::new(0.2, 0.2),
                ],
            )
            .unwrap(),
        ])
    }

    #[test]
    fn test_line_end_to_end() {
        let compiler = GeometryCompiler::default();
        let record = StrokeRecord::from_strokes(vec![line((0.0, 0.0), (1.0, 0.0), 1.0)]);
        let level = compiler.compile(&record, board());

        assert_eq!(level.primitives.len(), 1);
        assert!(level.warnings.is_empty());

        let wall = &level.primitives[0];
        assert_eq!(wall.kind, PrimitiveKind::Wall);
        assert_eq!(wall.stroke_index, Some(0));
        let transform = wall.transform.unwrap();
        assert!(transform.center.abs_diff_eq(Vec3::new(5.0, 1.0, 0.0), 1e-5));
        assert!(transform.scale.abs_diff_eq(Vec3::new(1.0, 2.0, 10.0), 1e-5));
        assert!((transform.rotation * Vec3::Z).abs_diff_eq(Vec3::X, 1e-5));

        let colliders = level.collision_boxes();
        assert_eq!(colliders.len(), 1);
        match colliders[0].shape {
            ColliderShape::Box(collider) => {
                assert_eq!(collider.center, transform.center);
                assert_eq!(collider.orientation, transform.rotation);
                assert!(collider.half_extents.abs_diff_eq(Vec3::new(0.5, 1.0, 5.0), 1e-5));
            }
            other => panic!("Expected box collider, got {other:?}"),
        }
    }

    #[test]
    fn test_thin_line_uses_min_thickness() {
        let compiler = GeometryCompiler::default();
        let record = StrokeRecord::from_strokes(vec![line((0.0, 0.0), (0.5, 0.0), 0.01)]);
        let level = compiler.compile(&record, board());
        let scale = level.primitives[0].transform.unwrap().scale;
        approx::assert_abs_diff_eq!(scale.x, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_length_line_warns() {
        let compiler = GeometryCompiler::default();
        let record = StrokeRecord::from_strokes(vec![line((0.2, 0.2), (0.2, 0.2), 1.0)]);
        let level = compiler.compile(&record, board());

        assert_eq!(level.primitives.len(), 1);
        assert!(level.primitives[0].is_finite());
        assert_eq!(
            level.warnings,
            vec![GeometryWarning::ZeroLengthSegment {
                stroke_index: 0,
                segment: 0
            }]
        );
    }

    #[test]
    fn test_brush_cells_batched_and_deduplicated() {
        let compiler = GeometryCompiler::default();
        let p = Point2::new(0.1, 0.1);
        let q = Point2::new(0.3, 0.1);
        let record = StrokeRecord::from_strokes(vec![
            Stroke::brush(BLACK, 5.0, vec![p, q, p, q, Point2::new(0.3, 0.3)]).unwrap(),
        ]);
        let level = compiler.compile(&record, board());

        assert_eq!(level.primitives.len(), 1);
        let batch = &level.primitives[0];
        assert_eq!(batch.kind, PrimitiveKind::BrushBatch);
        assert_eq!(batch.colliders.len(), 3);
        assert_eq!(batch.vertex_count(), 3 * BOX_VERTEX_COUNT);
        assert_eq!(batch.indices.len(), 3 * BOX_INDEX_COUNT);
        assert!(batch.transform.is_none());
        assert_eq!(level.warnings.len(), 2);

        // first occurrence wins, order preserved
        assert!(batch.colliders[0].center.abs_diff_eq(Vec3::new(1.0, 0.5, 1.0), 1e-6));
        assert!(batch.colliders[1].center.abs_diff_eq(Vec3::new(3.0, 0.5, 1.0), 1e-6));
        // shrink 0.8 on a unit cell
        assert!(batch.colliders[0].half_extents.abs_diff_eq(Vec3::splat(0.4), 1e-6));
    }

    #[test]
    fn test_brush_cells_keep_close_points() {
        let compiler = GeometryCompiler::new(BuildSettings {
            simplify_threshold: 0.1,
            ..BuildSettings::default()
        });
        let points: Vec<Point2> = (0..5).map(|i| Point2::new(i as f32 * 0.001, 0.0)).collect();
        let record = StrokeRecord::from_strokes(vec![Stroke::brush(BLACK, 5.0, points).unwrap()]);
        let level = compiler.compile(&record, board());

        assert_eq!(level.primitives[0].colliders.len(), 5);
        assert!(level.warnings.is_empty());
    }

    #[test]
    fn test_brush_walls_simplified() {
        let compiler = GeometryCompiler::new(BuildSettings {
            brush_mode: BrushMode::Walls,
            simplify_threshold: 0.095,
            ..BuildSettings::default()
        });
        let points: Vec<Point2> = (0..=20).map(|i| Point2::new(i as f32 * 0.01, 0.0)).collect();
        let record = StrokeRecord::from_strokes(vec![Stroke::brush(BLACK, 1.0, points).unwrap()]);
        let level = compiler.compile(&record, board());

        // kept points at x = 0.0, 0.1 and 0.2 give two segments
        assert_eq!(level.primitives[0].colliders.len(), 2);
    }

    #[test]
    fn test_brush_walls_thickness_scale() {
        let compiler = GeometryCompiler::new(BuildSettings {
            brush_mode: BrushMode::Walls,
            ..BuildSettings::default()
        });
        let record = StrokeRecord::from_strokes(vec![
            Stroke::brush(BLACK, 5.0, vec![Point2::new(0.0, 0.0), Point2::new(0.0, 0.4)]).unwrap(),
        ]);
        let level = compiler.compile(&record, board());

        // width 5 * 0.1 = 0.5 thick, shrunk by 0.8
        let collider = &level.primitives[0].colliders[0];
        approx::assert_abs_diff_eq!(collider.half_extents.x, 0.2, epsilon = 1e-5);
        approx::assert_abs_diff_eq!(collider.half_extents.z, 1.6, epsilon = 1e-5);
    }

    #[test]
    fn test_brush_walls_mode() {
        let compiler = GeometryCompiler::new(BuildSettings {
            brush_mode: BrushMode::Walls,
            simplify_threshold: 0.0,
            ..BuildSettings::default()
        });
        let record = StrokeRecord::from_strokes(vec![
            Stroke::brush(
                BLACK,
                1.0,
                vec![
                    Point2::new(0.0, 0.0),
                    Point2::new(0.1, 0.0),
                    Point2::new(0.1, 0.0),
                    Point2::new(0.1, 0.2),
                ],
            )
            .unwrap(),
        ]);
        let level = compiler.compile(&record, board());

        let batch = &level.primitives[0];
        assert_eq!(batch.kind, PrimitiveKind::BrushBatch);
        assert_eq!(batch.colliders.len(), 2);
        assert_eq!(batch.vertex_count(), 2 * BOX_VERTEX_COUNT);
        assert_eq!(
            level.warnings,
            vec![GeometryWarning::ZeroLengthSegment {
                stroke_index: 0,
                segment: 1
            }]
        );
        // second wall runs along +Z from (1, 0, 0) to (1, 0, 2)
        assert!(batch.colliders[1].center.abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), 1e-5));
    }

    #[test]
    fn test_brush_walls_single_point_keeps_cube() {
        let compiler = GeometryCompiler::new(BuildSettings {
            brush_mode: BrushMode::Walls,
            ..BuildSettings::default()
        });
        let record = StrokeRecord::from_strokes(vec![
            Stroke::brush(BLACK, 1.0, vec![Point2::new(0.2, 0.2)]).unwrap(),
        ]);
        let level = compiler.compile(&record, board());
        assert_eq!(level.primitives[0].colliders.len(), 1);
        assert_eq!(level.warnings.len(), 1);
    }

    #[test]
    fn test_curve_compiles_to_ribbon() {
        let compiler = GeometryCompiler::new(BuildSettings {
            curve_segments: 10,
            ..BuildSettings::default()
        });
        let level = compiler.compile(&mixed_record(), board());
        let ribbon = &level.primitives[1];

        assert_eq!(ribbon.kind, PrimitiveKind::Ribbon);
        assert_eq!(ribbon.stroke_index, Some(1));
        assert_eq!(ribbon.color, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(ribbon.vertex_count(), 4 * 11);
        assert_eq!(ribbon.indices.len(), 12 * 10);
        assert!(ribbon.mesh_collider);

        let descriptors = level.collision_boxes();
        assert!(descriptors
            .iter()
            .any(|d| d.primitive == 1 && d.shape == ColliderShape::TriangleMesh));
    }

    #[test]
    fn test_coincident_curve_reports_tangents() {
        let compiler = GeometryCompiler::new(BuildSettings {
            curve_segments: 2,
            ..BuildSettings::default()
        });
        let p = Point2::new(0.1, 0.1);
        let record = StrokeRecord::from_strokes(vec![Stroke::curve(BLACK, 1.0, [p; 4]).unwrap()]);
        let level = compiler.compile(&record, board());
        assert!(level.primitives[0].is_finite());
        assert_eq!(level.warnings.len(), 3);
        assert!(matches!(
            level.warnings[0],
            GeometryWarning::DegenerateTangent { stroke_index: 0, sample: 0 }
        ));
    }

    #[test]
    fn test_ground_emitted_first() {
        let compiler = GeometryCompiler::new(BuildSettings {
            include_ground: true,
            ..BuildSettings::default()
        });
        let level = compiler.compile(&mixed_record(), board());
        assert_eq!(level.primitives.len(), 4);

        let ground = &level.primitives[0];
        assert_eq!(ground.kind, PrimitiveKind::Ground);
        assert_eq!(ground.stroke_index, None);
        let (min, max) = ground.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec3::new(-5.0, 0.0, -5.0), 1e-6));
        assert!(max.abs_diff_eq(Vec3::new(5.0, 0.0, 5.0), 1e-6));
        assert!(ground.colliders[0].center.y < 0.0);
        assert_eq!(level.primitives_for_stroke(2).count(), 1);
    }

    #[test]
    fn test_empty_record() {
        let level = GeometryCompiler::default().compile(&StrokeRecord::new(), board());
        assert!(level.primitives.is_empty());
        assert!(level.collision_boxes().is_empty());
        assert!(level.combine().is_empty());
    }

    #[test]
    fn test_compile_is_deterministic() {
        let compiler = GeometryCompiler::default();
        let record = mixed_record();
        let first = compiler.compile(&record, board());
        let second = compiler.compile(&record, board());
        assert_eq!(first, second);
    }

    #[test]
    fn test_counts_and_combine() {
        let level = GeometryCompiler::default().compile(&mixed_record(), board());
        let arena = level.combine();
        assert_eq!(arena.ranges().len(), level.primitives.len());
        assert_eq!(arena.vertex_count(), level.vertex_count());
        assert_eq!(arena.indices().len(), level.triangle_count() * 3);
    }

    #[test]
    fn test_level_serializes() {
        let level = GeometryCompiler::default().compile(&mixed_record(), board());
        let value = serde_json::to_value(&level).unwrap();
        assert_eq!(value["primitives"][0]["kind"], "wall");
        assert_eq!(value["primitives"][2]["kind"], "brush_batch");
    }
}
