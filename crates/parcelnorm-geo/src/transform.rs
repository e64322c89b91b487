//! Rigid transforms of rings

use geo::Rotate;
use parcelnorm_core::config::RotationOrigin;

use crate::measure::centroid;
use crate::models::{ring_from_line_string, to_geo_line_string, to_geo_point, RawPoint, Ring};

/// Rotate every vertex about `origin`, defaulting to the vertex centroid
///
/// Positive angles turn counter-clockwise. Rotation keeps the vertex count
/// but may leave a concave ring self-intersecting; re-run
/// [`repair_validity`](crate::validation::repair_validity) when validity matters.
pub fn rotate(ring: &Ring, angle_degrees: f64, origin: Option<RawPoint>) -> Ring {
    let Some(pivot) = origin.or_else(|| centroid(ring)) else {
        return ring.clone();
    };

    let rotated = to_geo_line_string(ring).rotate_around_point(angle_degrees, to_geo_point(&pivot));
    ring_from_line_string(&rotated)
}

/// Rotate about the configured default origin
pub fn rotate_with(ring: &Ring, angle_degrees: f64, origin: &RotationOrigin) -> Ring {
    rotate(ring, angle_degrees, origin.point())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::area_acres;

    fn assert_close(a: RawPoint, b: RawPoint) {
        assert!(
            (a.longitude - b.longitude).abs() < 1e-9 && (a.latitude - b.latitude).abs() < 1e-9,
            "{:?} != {:?}",
            a,
            b
        );
    }

    fn triangle() -> Ring {
        Ring::from(vec![[1.0, 0.0], [2.0, 0.0], [1.0, 1.0]])
    }

    #[test]
    fn test_rotate_counter_clockwise_about_point() {
        let rotated = rotate(&triangle(), 90.0, Some(RawPoint::new(0.0, 0.0)));

        assert_close(rotated.points()[0], RawPoint::new(0.0, 1.0));
        assert_close(rotated.points()[1], RawPoint::new(0.0, 2.0));
        assert_close(rotated.points()[2], RawPoint::new(-1.0, 1.0));
    }

    #[test]
    fn test_rotate_about_centroid_keeps_centroid() {
        let ring = triangle();
        let rotated = rotate(&ring, 37.0, None);

        assert_eq!(rotated.len(), ring.len());
        assert_close(centroid(&rotated).unwrap(), centroid(&ring).unwrap());
    }

    #[test]
    fn test_rotate_with_configured_origin() {
        let origin = RotationOrigin::explicit(RawPoint::new(0.0, 0.0));
        let rotated = rotate_with(&triangle(), 180.0, &origin);
        assert_close(rotated.points()[1], RawPoint::new(-2.0, 0.0));

        let about_centroid = rotate_with(&triangle(), 180.0, &RotationOrigin::Centroid);
        assert_close(centroid(&about_centroid).unwrap(), centroid(&triangle()).unwrap());
    }

    #[test]
    fn test_rotation_preserves_area() {
        let parcel = Ring::from(vec![
            [115.2600, -8.5000],
            [115.2609, -8.5000],
            [115.2612, -8.5006],
            [115.2604, -8.5011],
        ]);
        let before = area_acres(&parcel);
        let after = area_acres(&rotate(&parcel, 45.0, None));

        // The area centroid moves slightly, so the latitude scale may differ a little
        assert!((before - after).abs() / before < 1e-4);
    }

    #[test]
    fn test_rotate_empty_ring() {
        assert!(rotate(&Ring::default(), 30.0, None).is_empty());
    }
}
