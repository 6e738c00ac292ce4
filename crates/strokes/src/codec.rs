//! Text format for stroke records.
//!
//! Records are JSON:
//!
//! ```text
//! { "version": 1,
//!   "strokes": [ { "tool": "line", "color": [r, g, b, a], "width": 1.0,
//!                  "points": [[x, y], [x, y]] } ] }
//! ```
//!
//! Every stroke field is mandatory. Unknown fields are ignored so newer
//! writers can add data without breaking older readers. The reader also
//! accepts the layout written by the first version of the drawing tool:
//! integer tool tokens, `{"r","g","b","a"}` colors, `size` instead of
//! `width` and `{"x","y"}` points.
//!
//! The codec checks structure only. Geometric sanity (zero-length lines,
//! coincident control points) is the compiler's concern.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::RECORD_VERSION;
use crate::types::{Point2, Rgba, Stroke, StrokeRecord, ToolKind};
use crate::validation::StrokeShapeError;

/// Errors raised while reading or writing a stroke record
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Stroke record is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("Malformed stroke record: {0}")]
    Malformed(String),
    #[error("Stroke {index} has an invalid shape: {source}")]
    InvalidStrokeShape {
        index: usize,
        #[source]
        source: StrokeShapeError,
    },
    #[error("Unsupported record version {found} (newest supported is {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

impl From<serde_json::Error> for RecordError {
    /// Syntax errors stay `Json`; well-formed JSON with the wrong layout is
    /// `Malformed`.
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            serde_json::error::Category::Data => RecordError::Malformed(err.to_string()),
            _ => RecordError::Json(err),
        }
    }
}

/// A stroke dropped by [`decode_lenient`]
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedStroke {
    /// Position of the stroke in the file
    pub index: usize,
    pub tool: ToolKind,
    pub error: StrokeShapeError,
}

/// Result of a lenient decode: the usable strokes plus what was skipped
#[derive(Debug, Clone, Default)]
pub struct DecodedRecord {
    pub record: StrokeRecord,
    pub rejected: Vec<RejectedStroke>,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct RecordOut {
    version: u32,
    strokes: Vec<StrokeOut>,
}

#[derive(Serialize)]
struct StrokeOut {
    tool: ToolKind,
    color: Rgba,
    width: f32,
    points: Vec<[f32; 2]>,
}

#[derive(Deserialize)]
struct RecordIn {
    #[serde(default = "default_version")]
    version: u32,
    strokes: Vec<StrokeIn>,
}

fn default_version() -> u32 {
    RECORD_VERSION
}

#[derive(Deserialize)]
struct StrokeIn {
    tool: ToolToken,
    color: ColorIn,
    #[serde(alias = "size")]
    width: f32,
    points: Vec<PointIn>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ToolToken {
    Index(u64),
    Name(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorIn {
    Array(Rgba),
    Object { r: f32, g: f32, b: f32, a: f32 },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointIn {
    Pair([f32; 2]),
    Object { x: f32, y: f32 },
}

impl ToolToken {
    fn resolve(&self, index: usize) -> Result<ToolKind, RecordError> {
        let tool = match self {
            ToolToken::Index(i) => ToolKind::from_index(*i),
            ToolToken::Name(name) => match name.to_ascii_lowercase().as_str() {
                "brush" => Some(ToolKind::Brush),
                "line" => Some(ToolKind::Line),
                "curve" => Some(ToolKind::Curve),
                _ => None,
            },
        };
        tool.ok_or_else(|| RecordError::Malformed(format!("stroke {index}: unknown tool token")))
    }
}

impl From<ColorIn> for Rgba {
    fn from(color: ColorIn) -> Self {
        match color {
            ColorIn::Array(rgba) => rgba,
            ColorIn::Object { r, g, b, a } => [r, g, b, a],
        }
    }
}

impl From<PointIn> for Point2 {
    fn from(point: PointIn) -> Self {
        match point {
            PointIn::Pair([x, y]) => Point2::new(x, y),
            PointIn::Object { x, y } => Point2::new(x, y),
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

fn to_wire(record: &StrokeRecord) -> RecordOut {
    RecordOut {
        version: RECORD_VERSION,
        strokes: record
            .iter()
            .map(|stroke| StrokeOut {
                tool: stroke.tool(),
                color: stroke.color(),
                width: stroke.width(),
                points: stroke.points().iter().map(|p| p.to_array()).collect(),
            })
            .collect(),
    }
}

/// Encode a record as pretty-printed JSON
pub fn encode(record: &StrokeRecord) -> Result<String, RecordError> {
    serde_json::to_string_pretty(&to_wire(record)).map_err(RecordError::Json)
}

/// Encode a record as single-line JSON
pub fn encode_compact(record: &StrokeRecord) -> Result<String, RecordError> {
    serde_json::to_string(&to_wire(record)).map_err(RecordError::Json)
}

// ============================================================================
// Decoding
// ============================================================================

fn parse(text: &str) -> Result<RecordIn, RecordError> {
    let wire: RecordIn = serde_json::from_str(text)?;
    if wire.version > RECORD_VERSION {
        return Err(RecordError::UnsupportedVersion {
            found: wire.version,
            supported: RECORD_VERSION,
        });
    }
    Ok(wire)
}

/// Build one stroke, splitting shape errors from malformed fields.
///
/// `Ok(Err(..))` is a stroke with the wrong point count for its tool.
fn build_stroke(
    index: usize,
    wire: StrokeIn,
) -> Result<Result<Stroke, RejectedStroke>, RecordError> {
    let tool = wire.tool.resolve(index)?;
    let points = wire.points.into_iter().map(Point2::from).collect();

    match Stroke::from_points(tool, wire.color.into(), wire.width, points) {
        Ok(stroke) => Ok(Ok(stroke)),
        Err(error @ (StrokeShapeError::EmptyBrush | StrokeShapeError::WrongPointCount { .. })) => {
            Ok(Err(RejectedStroke { index, tool, error }))
        }
        Err(other) => Err(RecordError::Malformed(format!("stroke {index}: {other}"))),
    }
}

/// Decode a record, failing on the first invalid stroke.
pub fn decode(text: &str) -> Result<StrokeRecord, RecordError> {
    let wire = parse(text)?;
    let mut record = StrokeRecord::new();

    for (index, stroke) in wire.strokes.into_iter().enumerate() {
        match build_stroke(index, stroke)? {
            Ok(stroke) => record.push(stroke),
            Err(rejected) => {
                return Err(RecordError::InvalidStrokeShape {
                    index: rejected.index,
                    source: rejected.error,
                });
            }
        }
    }

    debug!("Decoded stroke record with {} strokes", record.len());
    Ok(record)
}

/// Decode a record, skipping strokes whose point count does not fit their
/// tool.
///
/// Malformed data still fails the whole load; there is no partial load of
/// a corrupt file.
pub fn decode_lenient(text: &str) -> Result<DecodedRecord, RecordError> {
    let wire = parse(text)?;
    let mut decoded = DecodedRecord::default();

    for (index, stroke) in wire.strokes.into_iter().enumerate() {
        match build_stroke(index, stroke)? {
            Ok(stroke) => decoded.record.push(stroke),
            Err(rejected) => {
                warn!(
                    "Skipping stroke {} ({}): {}",
                    rejected.index, rejected.tool, rejected.error
                );
                decoded.rejected.push(rejected);
            }
        }
    }

    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_record() -> StrokeRecord {
        StrokeRecord::from_strokes(vec![
            Stroke::brush(
                [0.1, 0.2, 0.3, 1.0],
                5.0,
                vec![
                    Point2::new(-0.31, 0.127),
                    Point2::new(-0.3, 0.13),
                    Point2::new(0.0001, -0.4999),
                ],
            )
            .unwrap(),
            Stroke::line([0.0, 0.0, 0.0, 1.0], 1.0, Point2::new(0.0, 0.0), Point2::new(1.0, 0.0))
                .unwrap(),
            Stroke::curve(
                [1.0, 0.5, 0.25, 0.75],
                0.5,
                [
                    Point2::new(0.0, 0.0),
                    Point2::new(0.0, 0.3),
                    Point2::new(0.2, 0.3),
                    Point2::new(0.2, 0.0),
                ],
            )
            .unwrap(),
        ])
    }

    fn assert_records_match(a: &StrokeRecord, b: &StrokeRecord) {
        assert_eq!(a.len(), b.len());
        for (sa, sb) in a.iter().zip(b.iter()) {
            assert_eq!(sa.tool(), sb.tool());
            assert_eq!(sa.points().len(), sb.points().len());
            assert_abs_diff_eq!(sa.width(), sb.width(), epsilon = 1e-5);
            for (ca, cb) in sa.color().iter().zip(sb.color().iter()) {
                assert_abs_diff_eq!(*ca, *cb, epsilon = 1e-5);
            }
            for (pa, pb) in sa.points().iter().zip(sb.points().iter()) {
                assert_abs_diff_eq!(pa.x, pb.x, epsilon = 1e-5);
                assert_abs_diff_eq!(pa.y, pb.y, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_round_trip() {
        let record = sample_record();
        let text = encode(&record).unwrap();
        let decoded = decode(&text).unwrap();
        assert_records_match(&record, &decoded);
    }

    #[test]
    fn test_out_of_range_color_clamped() {
        let text = r#"{ "strokes": [ { "tool": "line", "color": [1.5, -0.5, 0.5, 1], "width": 1,
                        "points": [[0,0],[1,0]] } ] }"#;
        let record = decode(text).unwrap();
        assert_eq!(record.strokes[0].color(), [1.0, 0.0, 0.5, 1.0]);

        let again = decode(&encode(&record).unwrap()).unwrap();
        assert_eq!(again.strokes[0].color(), record.strokes[0].color());
    }

    #[test]
    fn test_round_trip_compact() {
        let record = sample_record();
        let decoded = decode(&encode_compact(&record).unwrap()).unwrap();
        assert_records_match(&record, &decoded);
    }

    #[test]
    fn test_round_trip_empty_record() {
        let record = StrokeRecord::new();
        let text = encode(&record).unwrap();
        let decoded = decode(&text).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_wire_layout() {
        let record = StrokeRecord::from_strokes(vec![
            Stroke::line([0.0, 0.0, 0.0, 1.0], 1.0, Point2::new(0.0, 0.0), Point2::new(1.0, 0.0))
                .unwrap(),
        ]);
        let value: serde_json::Value = serde_json::from_str(&encode(&record).unwrap()).unwrap();
        assert_eq!(value["version"], RECORD_VERSION);
        assert_eq!(value["strokes"][0]["tool"], "line");
        assert_eq!(value["strokes"][0]["points"][1][0], 1.0);
        assert_eq!(value["strokes"][0]["color"][3], 1.0);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let text = r#"{
            "version": 1,
            "author": "someone",
            "strokes": [
                { "tool": "line", "color": [0, 0, 0, 1], "width": 2,
                  "points": [[0, 0], [0.5, 0.5]], "pressure": [1.0, 0.8] }
            ]
        }"#;
        let record = decode(text).unwrap();
        assert_eq!(record.len(), 1);
        assert_eq!(record.strokes[0].width(), 2.0);
    }

    #[test]
    fn test_missing_field_is_malformed() {
        let text = r#"{ "strokes": [ { "tool": "line", "color": [0,0,0,1], "points": [[0,0],[1,1]] } ] }"#;
        assert!(matches!(decode(text), Err(RecordError::Malformed(_))));

        assert!(matches!(decode(r#"{ "version": 1 }"#), Err(RecordError::Malformed(_))));
        assert!(matches!(decode("not json"), Err(RecordError::Json(_))));
        assert!(matches!(decode(r#"{ "strokes": ["#), Err(RecordError::Json(_))));
    }

    #[test]
    fn test_unknown_tool_is_malformed() {
        let text = r#"{ "strokes": [ { "tool": "eraser", "color": [0,0,0,1], "width": 1, "points": [[0,0]] } ] }"#;
        assert!(matches!(decode(text), Err(RecordError::Malformed(_))));
    }

    #[test]
    fn test_non_positive_width_is_malformed() {
        let text = r#"{ "strokes": [ { "tool": "brush", "color": [0,0,0,1], "width": 0, "points": [[0,0]] } ] }"#;
        assert!(matches!(decode(text), Err(RecordError::Malformed(_))));
    }

    #[test]
    fn test_wrong_point_count_rejected() {
        let text = r#"{ "strokes": [
            { "tool": "brush", "color": [0,0,0,1], "width": 1, "points": [[0,0]] },
            { "tool": "line", "color": [0,0,0,1], "width": 1, "points": [[0,0],[1,0],[2,0]] }
        ] }"#;
        match decode(text) {
            Err(RecordError::InvalidStrokeShape { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(
                    source,
                    StrokeShapeError::WrongPointCount {
                        tool: ToolKind::Line,
                        expected: 2,
                        found: 3
                    }
                ));
            }
            other => panic!("Expected InvalidStrokeShape, got {other:?}"),
        }
    }

    #[test]
    fn test_lenient_decode_skips_bad_shapes() {
        let text = r#"{ "strokes": [
            { "tool": "curve", "color": [0,0,0,1], "width": 1, "points": [[0,0],[1,0]] },
            { "tool": "brush", "color": [0,0,0,1], "width": 1, "points": [] },
            { "tool": "line", "color": [0,0,0,1], "width": 1, "points": [[0,0],[1,0]] }
        ] }"#;
        let decoded = decode_lenient(text).unwrap();
        assert_eq!(decoded.record.len(), 1);
        assert_eq!(decoded.record.strokes[0].tool(), ToolKind::Line);
        assert_eq!(decoded.rejected.len(), 2);
        assert_eq!(decoded.rejected[0].index, 0);
        assert_eq!(decoded.rejected[1].error, StrokeShapeError::EmptyBrush);
    }

    #[test]
    fn test_lenient_decode_still_fails_on_malformed() {
        let text = r#"{ "strokes": [ { "tool": "line", "width": 1, "points": [[0,0],[1,0]] } ] }"#;
        assert!(matches!(decode_lenient(text), Err(RecordError::Malformed(_))));
    }

    #[test]
    fn test_newer_version_rejected() {
        let text = r#"{ "version": 99, "strokes": [] }"#;
        assert!(matches!(
            decode(text),
            Err(RecordError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_legacy_layout() {
        let text = r#"{
            "strokes": [
                {
                    "tool": 0,
                    "color": { "r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0 },
                    "size": 5,
                    "points": [ { "x": -0.25, "y": 0.1 }, { "x": -0.2, "y": 0.1 } ]
                },
                {
                    "tool": 1,
                    "color": { "r": 1.0, "g": 0.0, "b": 0.0, "a": 1.0 },
                    "size": 3,
                    "points": [ { "x": 0.0, "y": 0.0 }, { "x": 0.4, "y": -0.1 } ]
                }
            ]
        }"#;
        let record = decode(text).unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.strokes[0].tool(), ToolKind::Brush);
        assert_eq!(record.strokes[0].width(), 5.0);
        assert_eq!(record.strokes[0].points()[0], Point2::new(-0.25, 0.1));
        assert_eq!(record.strokes[1].tool(), ToolKind::Line);
        assert_eq!(record.strokes[1].color(), [1.0, 0.0, 0.0, 1.0]);
    }
}
