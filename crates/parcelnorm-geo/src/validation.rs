//! Vertex cleanup and single-pass validity repair.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, Line};
use parcelnorm_core::error::{ParcelError, Result};

use crate::models::{to_geo_coord, to_geo_polygon, RawPoint, Ring};

/// Relative tolerance for treating two edges at a vertex as collinear
const COLLINEAR_EPSILON: f64 = 1e-12;

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }
}

/// Report every defect of a ring without changing it
pub fn validate_ring(ring: &Ring) -> ValidationResult {
    let mut result = ValidationResult::valid();
    let points = ring.points();

    if points.len() < 3 {
        result.add_error(
            "Ring".to_string(),
            format!("Ring must have at least 3 vertices, found {}", points.len()),
        );
        return result;
    }

    for i in 0..points.len() {
        let next = (i + 1) % points.len();
        if points[i] == points[next] {
            result.add_error(format!("Ring[{}]", next), "Repeated consecutive vertex".to_string());
        }
    }

    if let Some(i) = find_spike(points) {
        result.add_error(format!("Ring[{}]", i), "Spike (zero-area fold)".to_string());
    }

    let signed_area = to_geo_polygon(ring).signed_area();
    if signed_area == 0.0 {
        result.add_error("Ring".to_string(), "Ring encloses zero area".to_string());
    } else if signed_area < 0.0 {
        result.add_error("Ring".to_string(), "Ring is wound clockwise".to_string());
    }

    if has_self_intersection(ring) {
        result.add_error("Ring".to_string(), "Ring intersects itself".to_string());
    }

    result
}

/// Drop every vertex that is exactly equal to its predecessor
///
/// Only consecutive repeats are removed; a vertex revisited later in the
/// ring is kept. Trailing copies of the first vertex count as closure
/// repeats.
pub fn dedupe_consecutive(ring: &Ring) -> Result<Ring> {
    let points = dedupe_points(ring.points());
    if points.len() < 3 {
        return Err(ParcelError::validity(format!(
            "fewer than 3 vertices after removing consecutive duplicates ({})",
            points.len()
        )));
    }
    Ok(Ring::new(points))
}

/// Attempt one bounded repair pass
///
/// Removes repeated vertices and spikes, then winds the ring
/// counter-clockwise with its first vertex kept in place. A ring that still
/// intersects itself or encloses no area afterwards is reported as invalid
/// rather than repaired further.
pub fn repair_validity(ring: &Ring) -> Result<Ring> {
    let mut points = dedupe_points(ring.points());

    while points.len() >= 3 {
        match find_spike(&points) {
            Some(i) => {
                points.remove(i);
                points = dedupe_points(&points);
            }
            None => break,
        }
    }

    if points.len() < 3 {
        return Err(ParcelError::validity(format!(
            "fewer than 3 vertices after removing spikes ({})",
            points.len()
        )));
    }

    let repaired = Ring::new(points);
    if has_self_intersection(&repaired) {
        return Err(ParcelError::validity("self-intersection persists after repair"));
    }

    let signed_area = to_geo_polygon(&repaired).signed_area();
    if signed_area == 0.0 {
        return Err(ParcelError::validity("ring encloses zero area"));
    }

    if signed_area < 0.0 {
        let mut points = repaired.into_points();
        points[1..].reverse();
        return Ok(Ring::new(points));
    }

    Ok(repaired)
}

/// Whether any two edges of the ring meet anywhere other than their shared vertex
pub fn has_self_intersection(ring: &Ring) -> bool {
    let points = ring.points();
    let n = points.len();
    if n < 3 {
        return false;
    }

    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(to_geo_coord(&points[i]), to_geo_coord(&points[(i + 1) % n])))
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                // Neighbouring edges always share their common vertex
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(LineIntersection::Collinear { intersection })
                    if adjacent && intersection.start == intersection.end => {}
                Some(_) => return true,
            }
        }
    }

    false
}

fn dedupe_points(points: &[RawPoint]) -> Vec<RawPoint> {
    let mut cleaned: Vec<RawPoint> = Vec::with_capacity(points.len());
    for point in points {
        if cleaned.last() != Some(point) {
            cleaned.push(*point);
        }
    }
    while cleaned.len() > 1 && cleaned.last() == cleaned.first() {
        cleaned.pop();
    }
    cleaned
}

/// Index of the first vertex whose two edges fold back over each other
fn find_spike(points: &[RawPoint]) -> Option<usize> {
    let n = points.len();
    if n < 3 {
        return None;
    }

    (0..n).find(|&i| {
        let prev = points[(i + n - 1) % n];
        let cur = points[i];
        let next = points[(i + 1) % n];

        let a = (prev.longitude - cur.longitude, prev.latitude - cur.latitude);
        let b = (next.longitude - cur.longitude, next.latitude - cur.latitude);
        let cross = a.0 * b.1 - a.1 * b.0;
        let dot = a.0 * b.0 + a.1 * b.1;
        let scale = a.0.hypot(a.1) * b.0.hypot(b.1);

        cross.abs() <= COLLINEAR_EPSILON * scale && dot > 0.0
    })
}
