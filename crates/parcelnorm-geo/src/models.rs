//! Conversions between canonical rings and `geo` crate types.

use geo::{Coord, LineString, Point};

// Re-export canonical types from parcelnorm-core
pub use parcelnorm_core::models::{BoundingBox, Polygon, RawPoint, Ring};

pub fn to_geo_coord(point: &RawPoint) -> Coord<f64> {
    Coord { x: point.longitude, y: point.latitude }
}

pub fn to_geo_point(point: &RawPoint) -> Point<f64> {
    Point::new(point.longitude, point.latitude)
}

pub fn from_geo_coord(coord: &Coord<f64>) -> RawPoint {
    RawPoint::new(coord.x, coord.y)
}

/// Open line string, one coordinate per ring vertex
pub fn to_geo_line_string(ring: &Ring) -> LineString<f64> {
    LineString::new(ring.iter().map(to_geo_coord).collect())
}

/// Polygon without holes; `geo` closes the exterior
pub fn to_geo_polygon(ring: &Ring) -> geo::Polygon<f64> {
    geo::Polygon::new(to_geo_line_string(ring), vec![])
}

/// Ring from a line string, open or closed
pub fn ring_from_line_string(line: &LineString<f64>) -> Ring {
    Ring::new(line.coords().map(from_geo_coord).collect())
}

/// Exterior ring of a `geo` polygon; interior rings are not carried over
pub fn ring_from_geo_polygon(polygon: &geo::Polygon<f64>) -> Ring {
    ring_from_line_string(polygon.exterior())
}
