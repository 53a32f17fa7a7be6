//! `cursor-path.json` document format.
//!
//! The file is produced by the recorder (or by hand) and looks like
//! `{ "points": [{ "t": 0, "x": 0.26, "y": 0.36 }, ...] }`. Parsing is lenient:
//! values are coerced the way a browser would coerce them with `Number()`, and
//! anything unusable collapses to 0 instead of failing the whole document.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::{Trajectory, Waypoint};

/// Why a loaded cursor path was rejected.
#[derive(Debug, Error)]
pub enum PathLoadError {
    #[error("fetch unavailable")]
    Unavailable,
    #[error("request failed: {0}")]
    Request(String),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("malformed cursor path JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cursor path document has no points array")]
    MissingPoints,
    #[error("cursor path document has no points")]
    Empty,
}

/// Serialized shape written by the recorder.
#[derive(Debug, Serialize)]
pub struct PathDocument<'a> {
    pub points: &'a [Waypoint],
}

/// Parses and normalizes a path document.
pub fn parse_path_document(text: &str) -> Result<Trajectory, PathLoadError> {
    let doc: Value = serde_json::from_str(text)?;
    let points = doc
        .get("points")
        .and_then(Value::as_array)
        .ok_or(PathLoadError::MissingPoints)?;
    let normalized = normalize_points(points);
    Trajectory::new(normalized).ok_or(PathLoadError::Empty)
}

/// Shifts timestamps so the first point starts at 0 and sanitizes coordinates
/// (non-finite -> 0, rounded to 4 decimals).
pub fn normalize_points(points: &[Value]) -> Vec<Waypoint> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    let origin = timestamp(first);
    points
        .iter()
        .map(|pt| Waypoint {
            t: (timestamp(pt) - origin).max(0.0),
            x: coordinate(pt.get("x")),
            y: coordinate(pt.get("y")),
        })
        .collect()
}

/// Rounds to 4 decimal places, the precision the recorder writes.
pub fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

fn coordinate(v: Option<&Value>) -> f64 {
    let n = v.map(coerce_number).unwrap_or(f64::NAN);
    if n.is_finite() { round4(n) } else { 0.0 }
}

// Missing, falsy or non-numeric timestamps count as 0.
fn timestamp(pt: &Value) -> f64 {
    let n = pt.get("t").map(coerce_number).unwrap_or(0.0);
    if n.is_finite() { n } else { 0.0 }
}

/// Numeric coercion with browser `Number()` rules for JSON values.
pub fn coerce_number(v: &Value) -> f64 {
    match v {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(f64::NAN)
            }
        }
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] if !single.is_array() && !single.is_object() => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// Serializes a list of waypoints into the document format (pretty printed).
pub fn to_path_json(points: &[Waypoint]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&PathDocument { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_timestamp_shifted_to_zero() {
        let traj = parse_path_document(
            r#"{"points":[{"t":1000,"x":0.1,"y":0.2},{"t":1250,"x":0.3,"y":0.4},{"t":1900,"x":0.5,"y":0.6}]}"#,
        )
        .unwrap();
        let ts: Vec<f64> = traj.points().iter().map(|p| p.t).collect();
        assert_eq!(ts, vec![0.0, 250.0, 900.0]);
    }

    #[test]
    fn test_earlier_timestamps_floor_at_zero() {
        let pts = normalize_points(&[
            json!({"t": 500, "x": 0, "y": 0}),
            json!({"t": 100, "x": 0, "y": 0}),
        ]);
        assert_eq!(pts[1].t, 0.0);
    }

    #[test]
    fn test_coordinates_rounded_and_sanitized() {
        let pts = normalize_points(&[
            json!({"t": 0, "x": 0.123456, "y": "0.98767"}),
            json!({"t": 10, "x": "abc", "y": null}),
            json!({"t": 20}),
        ]);
        assert_eq!(pts[0].x, 0.1235);
        assert_eq!(pts[0].y, 0.9877);
        assert_eq!((pts[1].x, pts[1].y), (0.0, 0.0));
        assert_eq!((pts[2].x, pts[2].y), (0.0, 0.0));
    }

    #[test]
    fn test_missing_timestamps_count_as_zero() {
        let pts = normalize_points(&[
            json!({"x": 0.1, "y": 0.1}),
            json!({"t": "40", "x": 0.2, "y": 0.2}),
            json!({"t": false, "x": 0.3, "y": 0.3}),
        ]);
        let ts: Vec<f64> = pts.iter().map(|p| p.t).collect();
        assert_eq!(ts, vec![0.0, 40.0, 0.0]);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let err = parse_path_document("{ points: [").unwrap_err();
        assert!(matches!(err, PathLoadError::Json(_)));
    }

    #[test]
    fn test_missing_or_non_array_points() {
        assert!(matches!(
            parse_path_document(r#"{"path":[]}"#),
            Err(PathLoadError::MissingPoints)
        ));
        assert!(matches!(
            parse_path_document(r#"{"points":{"t":0}}"#),
            Err(PathLoadError::MissingPoints)
        ));
        assert!(matches!(
            parse_path_document("[1,2,3]"),
            Err(PathLoadError::MissingPoints)
        ));
    }

    #[test]
    fn test_empty_points_rejected() {
        assert!(matches!(
            parse_path_document(r#"{"points":[]}"#),
            Err(PathLoadError::Empty)
        ));
    }

    #[test]
    fn test_coerce_number_rules() {
        assert_eq!(coerce_number(&json!(true)), 1.0);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!(" 2.5 ")), 2.5);
        assert_eq!(coerce_number(&json!([7])), 7.0);
        assert!(coerce_number(&json!({"a": 1})).is_nan());
        assert!(coerce_number(&json!([1, 2])).is_nan());
    }

    #[test]
    fn test_document_serializes_points_key() {
        let text = to_path_json(&[Waypoint::new(0.0, 0.5, 0.25)]).unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["points"][0]["x"], json!(0.5));
        assert_eq!(v["points"][0]["t"], json!(0.0));
    }
}
