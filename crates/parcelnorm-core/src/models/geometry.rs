//! Canonical geometry types used across all parcelnorm crates.
//!
//! Coordinates are longitude/latitude in degrees. Rings are stored open: the
//! closing vertex is implied and only written back out at serialization
//! boundaries.

use serde::{Deserialize, Serialize};

/// Valid longitude range in degrees
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// Valid latitude range in degrees
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// A single vertex in degrees
///
/// Equality is exact floating-point equality; no epsilon is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPoint {
    pub longitude: f64,
    pub latitude: f64,
}

impl RawPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Whether both components are finite and inside the degree ranges
    pub fn is_in_range(&self) -> bool {
        self.longitude.is_finite()
            && self.latitude.is_finite()
            && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&self.longitude)
            && (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&self.latitude)
    }

    /// `[longitude, latitude]`, GeoJSON order
    pub fn to_pair(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<[f64; 2]> for RawPoint {
    fn from(pair: [f64; 2]) -> Self {
        Self::new(pair[0], pair[1])
    }
}

impl From<(f64, f64)> for RawPoint {
    fn from((longitude, latitude): (f64, f64)) -> Self {
        Self::new(longitude, latitude)
    }
}

/// Open polygon boundary
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring {
    points: Vec<RawPoint>,
}

impl Ring {
    /// Create a ring, dropping trailing copies of the first vertex
    pub fn new(mut points: Vec<RawPoint>) -> Self {
        while points.len() > 1 && points.last() == points.first() {
            points.pop();
        }
        Self { points }
    }

    pub fn points(&self) -> &[RawPoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<RawPoint> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawPoint> {
        self.points.iter()
    }

    /// Vertex pairs without the closing vertex
    pub fn to_pairs(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(RawPoint::to_pair).collect()
    }

    /// Vertex pairs with the first vertex repeated at the end
    pub fn to_closed_pairs(&self) -> Vec<[f64; 2]> {
        let mut pairs = self.to_pairs();
        if let Some(first) = pairs.first().copied() {
            pairs.push(first);
        }
        pairs
    }

    /// Axis-aligned bounding box, `None` for an empty ring
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let first = self.points.first()?;
        let mut bbox = BoundingBox::from_point(*first);
        for point in &self.points[1..] {
            bbox.expand(*point);
        }
        Some(bbox)
    }
}

impl From<Vec<[f64; 2]>> for Ring {
    fn from(pairs: Vec<[f64; 2]>) -> Self {
        Ring::new(pairs.into_iter().map(RawPoint::from).collect())
    }
}

impl<'a> IntoIterator for &'a Ring {
    type Item = &'a RawPoint;
    type IntoIter = std::slice::Iter<'a, RawPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Axis-aligned bounding box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
}

impl BoundingBox {
    pub fn new(min: RawPoint, max: RawPoint) -> Self {
        Self {
            min_longitude: min.longitude.min(max.longitude),
            min_latitude: min.latitude.min(max.latitude),
            max_longitude: min.longitude.max(max.longitude),
            max_latitude: min.latitude.max(max.latitude),
        }
    }

    pub fn from_point(point: RawPoint) -> Self {
        Self::new(point, point)
    }

    pub fn expand(&mut self, point: RawPoint) {
        self.min_longitude = self.min_longitude.min(point.longitude);
        self.min_latitude = self.min_latitude.min(point.latitude);
        self.max_longitude = self.max_longitude.max(point.longitude);
        self.max_latitude = self.max_latitude.max(point.latitude);
    }

    pub fn min(&self) -> [f64; 2] {
        [self.min_longitude, self.min_latitude]
    }

    pub fn max(&self) -> [f64; 2] {
        [self.max_longitude, self.max_latitude]
    }
}
