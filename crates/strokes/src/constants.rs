/// Current stroke record format version. Records with a higher version are
/// rejected on load; lower versions are read as-is.
pub const RECORD_VERSION: u32 = 1;

/// Default brush width used by the drawing surface.
pub const DEFAULT_BRUSH_WIDTH: f32 = 5.0;

/// Half extent of the normalized canvas space. Canvas points lie in
/// `-CANVAS_HALF_EXTENT..=CANVAS_HALF_EXTENT` on both axes.
pub const CANVAS_HALF_EXTENT: f32 = 0.5;
