//! Stroke capture, simplification and the persisted stroke record
//!
//! This crate provides the drawing-side data of the wall sketcher:
//! - [`types::Stroke`] - One sealed stroke; its tool shape fixes the point count
//! - [`types::StrokeRecord`] - Ordered list of strokes, the unit of persistence
//! - [`simplify`] - Distance-gate thinning of freehand samples
//! - [`log`] - Caller-owned capture buffer and the shared stroke log
//! - [`codec`] - JSON record format (current and legacy layouts)
//! - [`store`] - Record files on disk
//! - [`canvas`] - Pointer position to canvas space mapping

pub mod canvas;
pub mod codec;
pub mod constants;
pub mod log;
pub mod simplify;
pub mod store;
pub mod types;
pub mod validation;

pub use canvas::*;
pub use codec::*;
pub use constants::*;
pub use log::*;
pub use simplify::*;
pub use store::*;
pub use types::*;
pub use validation::*;
