//! Boundary parsing: raw JSON coordinates and WKT into rings.
//!
//! Accepted coordinate shapes:
//!
//! - an array of `{"latitude": .., "longitude": ..}` objects
//! - an array of `[longitude, latitude]` pairs
//! - a JSON string holding either of the above, as exported from spreadsheets
//! - a WKT `POLYGON` string
//!
//! Coordinates may be JSON numbers or strings holding a number.

use parcelnorm_core::error::{ParcelError, Result};
use parcelnorm_core::models::{RawPoint, RawRecord, Ring};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::models::from_geo_coord;

/// Minimum number of distinct vertices for a ring
pub const MIN_DISTINCT_POINTS: usize = 3;

/// Parse a record's boundary, preferring `wkt` when present
pub fn parse_record(record: &RawRecord) -> Result<Ring> {
    match &record.wkt {
        Some(text) if record.coordinates.is_null() => parse_wkt(text),
        Some(_) => Err(ParcelError::parse("record has both `coordinates` and `wkt`")),
        None => parse(&record.coordinates),
    }
}

/// Parse raw coordinates into a ring
pub fn parse(raw: &Value) -> Result<Ring> {
    match raw {
        Value::Null => Err(ParcelError::parse("missing coordinates")),
        Value::Array(items) => parse_points(items),
        Value::String(text) => {
            let text = text.trim();
            if looks_like_wkt(text) {
                return parse_wkt(text);
            }

            let decoded: Value = serde_json::from_str(text)
                .map_err(|e| ParcelError::parse(format!("coordinate string is not valid JSON: {}", e)))?;
            match decoded {
                Value::Array(items) => parse_points(&items),
                _ => Err(ParcelError::parse("coordinate string must encode an array of points")),
            }
        }
        other => Err(ParcelError::parse(format!(
            "expected an array of points, found {}",
            json_kind(other)
        ))),
    }
}

/// Parse a WKT `POLYGON` without holes
pub fn parse_wkt(text: &str) -> Result<Ring> {
    let parsed = wkt::Wkt::<f64>::from_str(text.trim())
        .map_err(|e| ParcelError::parse(format!("invalid WKT: {}", e)))?;

    let geometry = geo::Geometry::<f64>::try_from(parsed)
        .map_err(|e| ParcelError::parse(format!("unsupported WKT geometry: {}", e)))?;

    let polygon = match geometry {
        geo::Geometry::Polygon(polygon) => polygon,
        _ => return Err(ParcelError::parse("WKT geometry must be a single POLYGON")),
    };

    if !polygon.interiors().is_empty() {
        return Err(ParcelError::parse("polygons with interior rings are not supported"));
    }

    let points: Vec<RawPoint> = polygon.exterior().coords().map(from_geo_coord).collect();
    for (i, point) in points.iter().enumerate() {
        check_point(i, point)?;
    }

    finish(points)
}

fn parse_points(items: &[Value]) -> Result<Ring> {
    let points = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_point(i, item))
        .collect::<Result<Vec<_>>>()?;

    finish(points)
}

fn parse_point(index: usize, item: &Value) -> Result<RawPoint> {
    let point = match item {
        Value::Object(fields) => RawPoint::new(
            field(fields, "longitude", index)?,
            field(fields, "latitude", index)?,
        ),
        Value::Array(pair) if pair.len() == 2 => RawPoint::new(
            number(&pair[0], "longitude", index)?,
            number(&pair[1], "latitude", index)?,
        ),
        Value::Array(pair) => {
            return Err(ParcelError::parse(format!(
                "point {}: expected [longitude, latitude], found {} values",
                index,
                pair.len()
            )))
        }
        other => {
            return Err(ParcelError::parse(format!(
                "point {}: expected an object or pair, found {}",
                index,
                json_kind(other)
            )))
        }
    };

    check_point(index, &point)?;
    Ok(point)
}

fn field(fields: &Map<String, Value>, name: &str, index: usize) -> Result<f64> {
    let value = fields
        .get(name)
        .ok_or_else(|| ParcelError::parse(format!("point {}: missing `{}` field", index, name)))?;
    number(value, name, index)
}

fn number(value: &Value, name: &str, index: usize) -> Result<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(ParcelError::parse(format!(
            "point {}: `{}` is not a finite number ({})",
            index, name, value
        ))),
    }
}

fn check_point(index: usize, point: &RawPoint) -> Result<()> {
    if point.is_in_range() {
        Ok(())
    } else {
        Err(ParcelError::parse(format!(
            "point {}: ({}, {}) is outside the longitude/latitude degree range",
            index, point.longitude, point.latitude
        )))
    }
}

/// Enforce the distinct-vertex minimum and build the open ring
fn finish(points: Vec<RawPoint>) -> Result<Ring> {
    let distinct = count_distinct(&points);
    if distinct < MIN_DISTINCT_POINTS {
        return Err(ParcelError::parse(format!(
            "need at least {} distinct points, found {}",
            MIN_DISTINCT_POINTS, distinct
        )));
    }
    Ok(Ring::new(points))
}

fn count_distinct(points: &[RawPoint]) -> usize {
    // Adding 0.0 folds -0.0 into 0.0 so the bit patterns agree with `==`
    let mut keys: Vec<(u64, u64)> = points
        .iter()
        .map(|p| ((p.longitude + 0.0).to_bits(), (p.latitude + 0.0).to_bits()))
        .collect();
    keys.sort_unstable();
    keys.dedup();
    keys.len()
}

fn looks_like_wkt(text: &str) -> bool {
    text.get(..7).is_some_and(|prefix| prefix.eq_ignore_ascii_case("polygon"))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reason(err: ParcelError) -> String {
        match err {
            ParcelError::Parse { reason } => reason,
            other => panic!("Expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_object_points() {
        let raw = json!([
            {"latitude": -8.50, "longitude": 115.26},
            {"latitude": -8.50, "longitude": 115.27},
            {"latitude": -8.51, "longitude": 115.27},
        ]);
        let ring = parse(&raw).unwrap();
        assert_eq!(ring.to_pairs(), vec![[115.26, -8.50], [115.27, -8.50], [115.27, -8.51]]);
    }

    #[test]
    fn test_parse_pairs_and_closing_vertex() {
        let raw = json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        let ring = parse(&raw).unwrap();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_parse_json_encoded_string() {
        let raw = json!(
            r#"[{"latitude": "1.5", "longitude": "2.5"}, {"latitude": 1.5, "longitude": 3.0}, {"latitude": 2.0, "longitude": 3.0}]"#
        );
        let ring = parse(&raw).unwrap();
        assert_eq!(ring.points()[0], RawPoint::new(2.5, 1.5));
    }

    #[test]
    fn test_missing_longitude() {
        let raw = json!([
            {"latitude": 0.0, "longitude": 0.0},
            {"latitude": 0.0},
            {"latitude": 1.0, "longitude": 1.0},
        ]);
        let message = reason(parse(&raw).unwrap_err());
        assert!(message.contains("point 1"));
        assert!(message.contains("longitude"));
    }

    #[test]
    fn test_non_numeric_coordinate() {
        let raw = json!([
            {"latitude": "north", "longitude": 0.0},
            {"latitude": 0.0, "longitude": 1.0},
            {"latitude": 1.0, "longitude": 1.0},
        ]);
        assert!(reason(parse(&raw).unwrap_err()).contains("not a finite number"));
    }

    #[test]
    fn test_out_of_range() {
        let raw = json!([[0.0, 0.0], [181.0, 0.0], [1.0, 1.0]]);
        assert!(reason(parse(&raw).unwrap_err()).contains("outside"));

        let raw = json!([[0.0, 0.0], [1.0, -91.0], [1.0, 1.0]]);
        assert!(parse(&raw).is_err());
    }

    #[test]
    fn test_too_few_distinct_points() {
        let raw = json!([[0.0, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 0.0]]);
        assert!(reason(parse(&raw).unwrap_err()).contains("distinct"));

        let raw = json!([[0.0, 0.0], [-0.0, 0.0], [1.0, 1.0]]);
        assert!(parse(&raw).is_err());
    }

    #[test]
    fn test_malformed_shapes() {
        assert!(parse(&Value::Null).is_err());
        assert!(parse(&json!(42)).is_err());
        assert!(parse(&json!("[1, 2")).is_err());
        assert!(parse(&json!([[0.0, 0.0, 5.0], [1.0, 0.0, 5.0], [1.0, 1.0, 5.0]])).is_err());
        assert!(parse(&json!("{\"latitude\": 1}")).is_err());
    }

    #[test]
    fn test_parse_wkt() {
        let ring = parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))").unwrap();
        assert_eq!(ring.to_pairs(), vec![[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]]);

        // Coordinate strings that hold WKT are routed to the WKT parser
        let ring = parse(&json!("polygon((0 0, 1 0, 1 1, 0 0))")).unwrap();
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn test_wkt_rejections() {
        assert!(parse_wkt("POINT(1 2)").is_err());
        assert!(parse_wkt("POLYGON((0 0, 1 0").is_err());
        assert!(parse_wkt("MULTIPOLYGON(((0 0, 1 0, 1 1, 0 0)))").is_err());

        let holed = "POLYGON((0 0, 10 0, 10 10, 0 10, 0 0), (2 2, 3 2, 3 3, 2 2))";
        assert!(reason(parse_wkt(holed).unwrap_err()).contains("interior"));

        assert!(parse_wkt("POLYGON((0 0, 200 0, 1 1, 0 0))").is_err());
    }

    #[test]
    fn test_parse_record() {
        let record = RawRecord::from_wkt("w", "POLYGON((0 0, 1 0, 1 1, 0 0))");
        assert_eq!(parse_record(&record).unwrap().len(), 3);

        let mut both = record.clone();
        both.coordinates = json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]);
        assert!(parse_record(&both).is_err());

        let missing = RawRecord::new("m", Value::Null);
        assert!(reason(parse_record(&missing).unwrap_err()).contains("missing coordinates"));
    }
}
