//! Area and centroid computation with a latitude scale correction.
//!
//! Areas are planar shoelace areas in squared degrees, converted to acres
//! with a fixed meters-per-degree factor and scaled by the cosine of the
//! area centroid's latitude to approximate longitude compression.
//!
//! This is an approximation for small polygons at moderate latitudes. It
//! under- or over-estimates rings that span a large latitude range or sit
//! near the poles; that bound is accepted in place of a geodesic area.

use geo::{Area, Centroid, MultiPolygon};

use crate::models::{to_geo_polygon, RawPoint, Ring};

/// Meters per degree of arc
pub const METERS_PER_DEGREE: f64 = 111_319.9;

/// Acres per square meter
pub const ACRES_PER_SQUARE_METER: f64 = 0.000247105;

/// Corrected area of a ring in acres, never negative
pub fn area_acres(ring: &Ring) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    polygon_area_acres(&to_geo_polygon(ring))
}

/// Corrected area of a `geo` polygon in acres
pub fn polygon_area_acres(polygon: &geo::Polygon<f64>) -> f64 {
    let square_degrees = polygon.unsigned_area();
    if square_degrees == 0.0 {
        return 0.0;
    }

    let latitude = polygon.centroid().map(|c| c.y()).unwrap_or(0.0);
    square_degrees_to_acres(square_degrees, latitude)
}

/// Summed corrected area of every part, each scaled at its own latitude
pub fn multi_polygon_area_acres(polygons: &MultiPolygon<f64>) -> f64 {
    polygons.iter().map(polygon_area_acres).sum()
}

/// Convert squared degrees at a given latitude to acres
pub fn square_degrees_to_acres(square_degrees: f64, latitude: f64) -> f64 {
    let scale = latitude.to_radians().cos().max(0.0);
    square_degrees * METERS_PER_DEGREE * METERS_PER_DEGREE * scale * ACRES_PER_SQUARE_METER
}

/// Arithmetic mean of the ring's vertices
///
/// Used as the default rotation origin, not for area work.
pub fn centroid(ring: &Ring) -> Option<RawPoint> {
    if ring.is_empty() {
        return None;
    }

    let n = ring.len() as f64;
    let (sum_lon, sum_lat) =
        ring.iter().fold((0.0, 0.0), |(lon, lat), p| (lon + p.longitude, lat + p.latitude));

    Some(RawPoint::new(sum_lon / n, sum_lat / n))
}

/// Area-weighted centroid of the enclosed region
pub fn area_centroid(ring: &Ring) -> Option<RawPoint> {
    if ring.is_empty() {
        return None;
    }
    to_geo_polygon(ring).centroid().map(|c| RawPoint::new(c.x(), c.y()))
}
