//! Events emitted while strokes are captured and logged.

use crate::types::{Stroke, ToolKind};

/// Stroke lifecycle events.
///
/// Listeners (a canvas preview, an autosave task) react to these without
/// being coupled to the capture buffer or the log.
#[derive(Debug, Clone)]
pub enum StrokeLogEvent {
    /// A capture buffer started a new stroke.
    StrokeStarted { tool: ToolKind },
    /// A finished stroke was appended to the log at `index`.
    StrokeCompleted { index: usize, stroke: Stroke },
    /// A stroke was abandoned before it was finished.
    StrokeAborted { tool: ToolKind, reason: String },
    /// The log was emptied or replaced; `stroke_count` strokes remain.
    Reset { stroke_count: usize },
}
