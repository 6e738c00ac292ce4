//! Point reduction for freehand strokes
//!
//! Freehand input arrives as densely spaced samples. Before a brush stroke
//! is sealed it is thinned with a greedy distance gate: a sample survives
//! only if it lies at least `threshold` away from the last sample that
//! survived.
//!
//! This is an approximation, not Douglas-Peucker: it looks at spacing
//! between kept points and never at perpendicular deviation from a chord.
//! Brush walls downstream assume this spacing.

use tracing::debug;

use crate::types::Point2;
use crate::validation::sanitize_threshold;

/// Thin `points` with a distance gate.
///
/// Keeps the first point, then every point whose distance from the last
/// kept point is `>= threshold`. Output is an in-order subsequence of the
/// input. A threshold of 0 keeps every point.
pub fn simplify(points: &[Point2], threshold: f32) -> Vec<Point2> {
    let threshold = sanitize_threshold(threshold);

    let Some((&first, rest)) = points.split_first() else {
        return Vec::new();
    };

    let mut kept = Vec::with_capacity(points.len());
    kept.push(first);
    let mut last = first;

    for &point in rest {
        if point.distance(last) >= threshold {
            kept.push(point);
            last = point;
        }
    }

    if kept.len() != points.len() {
        debug!(
            "simplify: kept {} of {} points (threshold {})",
            kept.len(),
            points.len(),
            threshold
        );
    }

    kept
}

/// In-place variant of [`simplify`], reusing the buffer's allocation
pub fn simplify_in_place(points: &mut Vec<Point2>, threshold: f32) {
    let threshold = sanitize_threshold(threshold);
    let Some(&first) = points.first() else {
        return;
    };

    let mut last = first;
    let mut write = 1;
    for read in 1..points.len() {
        let point = points[read];
        if point.distance(last) >= threshold {
            points[write] = point;
            write += 1;
            last = point;
        }
    }
    points.truncate(write);
}
