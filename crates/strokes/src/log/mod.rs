//! Stroke capture and the in-memory stroke log.
//!
//! This module provides:
//! - [`StrokeCapture`] - Caller-owned buffer for the stroke being drawn
//! - [`StrokeLog`] - Thread-safe append-only list of finished strokes
//! - [`StrokeLogEvent`] - Lifecycle events for listeners
//!
//! Capture and compilation never interleave on the same stroke: a stroke
//! only reaches the log once `StrokeCapture::finish` has sealed it, and the
//! compiler only ever sees a `StrokeRecord` snapshot taken with
//! `StrokeLog::seal`.

mod capture;
mod events;
mod storage;

pub use capture::{CaptureConfig, CaptureError, StrokeCapture};
pub use events::StrokeLogEvent;
pub use storage::StrokeLog;
