//! Narrow-phase overlap tests and clipping between two rings.

use geo::{BooleanOps, Intersects};
use parcelnorm_core::error::{ParcelError, Result};

use crate::measure::multi_polygon_area_acres;
use crate::models::{ring_from_geo_polygon, to_geo_polygon, Ring};

/// Area shared by two rings, in acres
///
/// Rings that only touch along their boundaries share zero area.
pub fn overlap_acres(subject: &Ring, other: &Ring) -> f64 {
    let a = to_geo_polygon(subject);
    let b = to_geo_polygon(other);

    if !a.intersects(&b) {
        return 0.0;
    }

    multi_polygon_area_acres(&a.intersection(&b))
}

/// Overlap area when it exceeds `tolerance_acres`, `None` otherwise
pub fn conflict_acres(subject: &Ring, other: &Ring, tolerance_acres: f64) -> Option<f64> {
    let overlap = overlap_acres(subject, other);
    (overlap > tolerance_acres).then_some(overlap)
}

/// Remove the region covered by `other` from `subject`
///
/// The remainder must be a single part without holes; anything else cannot
/// be expressed as one ring and is reported as a validity failure.
pub fn clip(subject: &Ring, other: &Ring) -> Result<Ring> {
    let difference = to_geo_polygon(subject).difference(&to_geo_polygon(other));

    let mut parts = difference.0.into_iter();
    let (Some(remainder), None) = (parts.next(), parts.next()) else {
        return Err(ParcelError::validity("clipping leaves zero or several parts"));
    };

    if !remainder.interiors().is_empty() {
        return Err(ParcelError::validity("clipping leaves a hole"));
    }

    Ok(ring_from_geo_polygon(&remainder))
}
