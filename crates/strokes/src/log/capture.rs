//! Caller-owned capture buffer for an in-progress stroke.

use crate::constants::DEFAULT_BRUSH_WIDTH;
use crate::simplify::simplify_in_place;
use crate::types::{Point2, Rgba, Stroke, ToolKind};
use crate::validation::StrokeShapeError;

use super::events::StrokeLogEvent;

/// Error type for stroke capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("Stroke not started - call begin() first")]
    NotStarted,
    #[error("Stroke already started - call finish() or abort() first")]
    AlreadyStarted,
    #[error("Invalid stroke shape: {0}")]
    Shape(#[from] StrokeShapeError),
}

/// Settings for a stroke about to be captured.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub tool: ToolKind,
    pub color: Rgba,
    pub width: f32,
    /// Distance gate applied to brush samples when the stroke is finished
    pub simplify_threshold: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            tool: ToolKind::Brush,
            color: [0.0, 0.0, 0.0, 1.0],
            width: DEFAULT_BRUSH_WIDTH,
            simplify_threshold: 0.0,
        }
    }
}

/// Accumulates the samples of one stroke while the pointer is down.
///
/// The buffer belongs to whoever drives input; nothing about the stroke in
/// progress is shared. `finish` hands out an immutable [`Stroke`] and
/// leaves the buffer ready for the next one.
///
/// How samples are kept depends on the tool:
/// - brush: every sample is appended, then thinned on finish
/// - line: the first sample is the start, the latest sample is the end
/// - curve: each sample is one control point, exactly four are needed
///
/// # Example
///
/// ```ignore
/// let mut capture = StrokeCapture::new();
/// capture.begin(config, start)?;
/// capture.add_point(next)?;
/// let stroke = capture.finish()?;
/// stroke_log.append(stroke);
/// ```
#[derive(Debug, Default)]
pub struct StrokeCapture {
    /// Current stroke configuration (None if not capturing)
    config: Option<CaptureConfig>,
    /// Samples of the current stroke
    points: Vec<Point2>,
}

impl StrokeCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a stroke is in progress.
    pub fn is_capturing(&self) -> bool {
        self.config.is_some()
    }

    /// Tool of the stroke in progress
    pub fn tool(&self) -> Option<ToolKind> {
        self.config.as_ref().map(|c| c.tool)
    }

    /// Samples collected so far
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Start a stroke at `start`.
    ///
    /// Returns a `StrokeStarted` event for listeners.
    pub fn begin(&mut self, config: CaptureConfig, start: Point2) -> Result<StrokeLogEvent, CaptureError> {
        if self.config.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }

        self.points.clear();
        self.points.push(start);

        let event = StrokeLogEvent::StrokeStarted { tool: config.tool };
        self.config = Some(config);
        Ok(event)
    }

    /// Feed the next pointer sample.
    pub fn add_point(&mut self, point: Point2) -> Result<(), CaptureError> {
        let tool = self.tool().ok_or(CaptureError::NotStarted)?;

        match tool {
            ToolKind::Brush => self.points.push(point),
            ToolKind::Line => {
                self.points.truncate(1);
                self.points.push(point);
            }
            ToolKind::Curve => {
                if self.points.len() >= 4 {
                    return Err(StrokeShapeError::WrongPointCount {
                        tool,
                        expected: 4,
                        found: self.points.len() + 1,
                    }
                    .into());
                }
                self.points.push(point);
            }
        }
        Ok(())
    }

    /// Seal the stroke in progress.
    ///
    /// A line released where it started ends on its start point; the
    /// compiler turns that into its zero-length fallback. The buffer is
    /// reset even when the stroke turns out to be invalid.
    pub fn finish(&mut self) -> Result<Stroke, CaptureError> {
        let config = self.config.take().ok_or(CaptureError::NotStarted)?;
        let mut points = std::mem::take(&mut self.points);

        match config.tool {
            ToolKind::Brush => simplify_in_place(&mut points, config.simplify_threshold),
            ToolKind::Line => {
                if points.len() == 1 {
                    points.push(points[0]);
                }
            }
            ToolKind::Curve => {}
        }

        Ok(Stroke::from_points(config.tool, config.color, config.width, points)?)
    }

    /// Drop the stroke in progress.
    ///
    /// Returns a `StrokeAborted` event for listeners.
    pub fn abort(&mut self, reason: impl Into<String>) -> Result<StrokeLogEvent, CaptureError> {
        let config = self.config.take().ok_or(CaptureError::NotStarted)?;
        self.points.clear();

        Ok(StrokeLogEvent::StrokeAborted {
            tool: config.tool,
            reason: reason.into(),
        })
    }
}
