//! Shared configuration for wallsketch
//!
//! This crate is the single source of truth for board dimensions and the
//! tunables used when strokes are turned into walls (heights, thickness
//! clamps, collider shrink factors, simplification threshold, curve
//! resolution). Every field has a default matching the stock 50 x 50 level
//! layout, so an empty JSON object is a valid level file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Side length of one plane unit before scaling (a unit plane is 10 x 10)
pub const PLANE_UNIT_SIZE: f32 = 10.0;

/// Default plane scale on X and Z
pub const DEFAULT_PLANE_SCALE: f32 = 5.0;

/// Default wall height in world units
pub const DEFAULT_WALL_HEIGHT: f32 = 2.0;

/// Lower clamp for wall thickness
pub const DEFAULT_MIN_WALL_THICKNESS: f32 = 0.1;

/// Distance gate used when simplifying brush walls (canvas units)
pub const DEFAULT_SIMPLIFY_THRESHOLD: f32 = 0.005;

/// Default number of intervals sampled along a curve wall
pub const DEFAULT_CURVE_SEGMENTS: u32 = 20;

/// Stroke width multiplier for brush walls; brush widths are in pixels
pub const DEFAULT_BRUSH_WALL_THICKNESS_SCALE: f32 = 0.1;

/// Default shrink applied to brush cell colliders
pub const DEFAULT_BRUSH_COLLIDER_SHRINK: f32 = 0.8;

/// Errors raised while loading or validating a level configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// World-space size of the board the canvas is mapped onto.
///
/// Canvas points are multiplied by these extents: `x * width` becomes world
/// X and `y * depth` becomes world Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardExtents {
    /// Extent along world X
    pub width: f32,
    /// Extent along world Z
    pub depth: f32,
}

impl Default for BoardExtents {
    fn default() -> Self {
        Self::from_plane_scale(DEFAULT_PLANE_SCALE, DEFAULT_PLANE_SCALE)
    }
}

impl BoardExtents {
    /// Create extents with explicit width and depth
    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    /// Extents of a unit plane scaled by `scale_x` / `scale_z`
    pub fn from_plane_scale(scale_x: f32, scale_z: f32) -> Self {
        Self {
            width: PLANE_UNIT_SIZE * scale_x,
            depth: PLANE_UNIT_SIZE * scale_z,
        }
    }

    /// Map a canvas point onto the ground plane (y = 0)
    pub fn to_world(&self, x: f32, y: f32) -> [f32; 3] {
        [x * self.width, 0.0, y * self.depth]
    }
}

/// How brush strokes are reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushMode {
    /// One cell (cube) per recorded point, merged per stroke
    #[default]
    Cells,
    /// One wall segment per pair of consecutive simplified points
    Walls,
}

/// Tunables for turning strokes into geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSettings {
    /// Height of line, curve and brush-wall geometry
    pub wall_height: f32,
    /// Stroke width is multiplied by this to get line and curve wall thickness
    pub wall_thickness_scale: f32,
    /// Stroke width is multiplied by this to get brush wall thickness
    pub brush_wall_thickness_scale: f32,
    /// Walls are never thinner than this
    pub min_wall_thickness: f32,
    /// Collider shrink for line walls, in (0, 1]
    pub line_collider_shrink: f32,
    /// Collider shrink for brush cells and brush walls, in (0, 1]
    pub brush_collider_shrink: f32,
    /// Size of one brush cell (x, y, z), a unit cube unless overridden
    pub brush_cell_size: [f32; 3],
    /// Distance gate for simplifying brush walls, canvas units
    pub simplify_threshold: f32,
    /// Number of intervals sampled along a curve
    pub curve_segments: u32,
    /// Emit the right-hand side of curve ribbons as well
    pub double_sided_ribbons: bool,
    /// Brush reconstruction mode
    pub brush_mode: BrushMode,
    /// Emit a ground plane primitive covering the board
    pub include_ground: bool,
    /// Thickness of the ground collider slab below y = 0
    pub ground_thickness: f32,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            wall_height: DEFAULT_WALL_HEIGHT,
            wall_thickness_scale: 1.0,
            brush_wall_thickness_scale: DEFAULT_BRUSH_WALL_THICKNESS_SCALE,
            min_wall_thickness: DEFAULT_MIN_WALL_THICKNESS,
            line_collider_shrink: 1.0,
            brush_collider_shrink: DEFAULT_BRUSH_COLLIDER_SHRINK,
            brush_cell_size: [1.0; 3],
            simplify_threshold: DEFAULT_SIMPLIFY_THRESHOLD,
            curve_segments: DEFAULT_CURVE_SEGMENTS,
            double_sided_ribbons: false,
            brush_mode: BrushMode::default(),
            include_ground: false,
            ground_thickness: 0.1,
        }
    }
}

impl BuildSettings {
    /// Wall thickness for a stroke of the given width
    pub fn wall_thickness(&self, stroke_width: f32) -> f32 {
        (stroke_width * self.wall_thickness_scale).max(self.min_wall_thickness)
    }

    /// Wall thickness for a brush stroke in walls mode
    pub fn brush_wall_thickness(&self, stroke_width: f32) -> f32 {
        (stroke_width * self.brush_wall_thickness_scale).max(self.min_wall_thickness)
    }

    /// Check every tunable is in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("build.wall_height", self.wall_height)?;
        positive("build.wall_thickness_scale", self.wall_thickness_scale)?;
        positive("build.brush_wall_thickness_scale", self.brush_wall_thickness_scale)?;
        positive("build.min_wall_thickness", self.min_wall_thickness)?;
        shrink("build.line_collider_shrink", self.line_collider_shrink)?;
        shrink("build.brush_collider_shrink", self.brush_collider_shrink)?;
        for size in self.brush_cell_size {
            positive("build.brush_cell_size", size)?;
        }
        if !(self.simplify_threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "build.simplify_threshold",
                reason: format!("must be >= 0, got {}", self.simplify_threshold),
            });
        }
        if self.curve_segments == 0 {
            return Err(ConfigError::Invalid {
                field: "build.curve_segments",
                reason: "must be at least 1".to_string(),
            });
        }
        positive("build.ground_thickness", self.ground_thickness)
    }
}

/// Complete level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct LevelConfig {
    /// Board the canvas is mapped onto
    pub board: BoardExtents,
    /// Geometry tunables
    pub build: BuildSettings,
}

impl LevelConfig {
    /// Parse and validate a config from JSON text
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: LevelConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        debug!(
            "Loaded level config from {}: board {}x{}",
            path.display(),
            config.board.width,
            config.board.depth
        );
        Ok(config)
    }

    /// Check board extents and build settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("board.width", self.board.width)?;
        positive("board.depth", self.board.depth)?;
        self.build.validate()
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

fn shrink(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be in (0, 1], got {value}"),
        })
    }
}
