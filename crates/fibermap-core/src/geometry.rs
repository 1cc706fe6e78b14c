//! Geometry synthesis: connecting segments and coverage rings.
//!
//! Rings use a local planar approximation (a fixed degrees-per-meter factor
//! applied to both axes). It is only meaningful for radii of a few hundred
//! meters; no geodesic correction is attempted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Degrees of arc per meter at the equator (1 / 111 320).
pub const DEGREES_PER_METER: f64 = 1.0 / 111_320.0;

/// Default coverage radius around a distribution point, in meters
pub const DEFAULT_RADIUS_M: f64 = 250.0;

/// Default angular sampling step for coverage rings, in degrees
pub const DEFAULT_STEP_DEG: f64 = 10.0;

/// A geographic position, longitude first.
///
/// Only finite values can be stored; use [`Coordinate::new`] to construct.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude (degrees)
    pub longitude: f64,
    /// Latitude (degrees)
    pub latitude: f64,
}

/// Why a coordinate or ring could not be produced
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct GeometryIssue(pub String);

impl Coordinate {
    /// Build a coordinate from longitude and latitude.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryIssue`] naming the axis when either value is NaN or
    /// infinite.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeometryIssue> {
        if !longitude.is_finite() {
            return Err(GeometryIssue(format!("longitude is not a finite number ({longitude})")));
        }
        if !latitude.is_finite() {
            return Err(GeometryIssue(format!("latitude is not a finite number ({latitude})")));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Planar distance to `other`, in degrees
    #[inline]
    #[must_use]
    pub fn planar_distance(&self, other: &Self) -> f64 {
        (self.longitude - other.longitude).hypot(self.latitude - other.latitude)
    }
}

/// Two-vertex segment from `a` to `b`. No interpolation is performed.
#[inline]
#[must_use]
pub const fn connect(a: Coordinate, b: Coordinate) -> [Coordinate; 2] {
    [a, b]
}

/// Sample an approximate circle of `radius_m` meters around `center`.
///
/// Emits exactly `floor(360 / step_deg)` points at angles `0, step, 2·step, …`
/// (counter-clockwise from east). The ring is left open; serializers that
/// need explicit closure repeat the first vertex themselves.
///
/// # Errors
///
/// Returns a [`GeometryIssue`] if the radius is not a positive finite number,
/// or the step is not finite and within `(0, 360]`.
///
/// # Examples
///
/// ```
/// use fibermap_core::geometry::{boundary_ring, Coordinate};
///
/// let center = Coordinate::new(106.8, -6.2)?;
/// let ring = boundary_ring(center, 250.0, 10.0)?;
/// assert_eq!(ring.len(), 36);
/// # Ok::<(), fibermap_core::geometry::GeometryIssue>(())
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn boundary_ring(
    center: Coordinate,
    radius_m: f64,
    step_deg: f64,
) -> Result<Vec<Coordinate>, GeometryIssue> {
    if !radius_m.is_finite() || radius_m <= 0.0 {
        return Err(GeometryIssue(format!("radius must be positive, got {radius_m}")));
    }
    if !step_deg.is_finite() || step_deg <= 0.0 || step_deg > 360.0 {
        return Err(GeometryIssue(format!(
            "angular step must be within (0, 360], got {step_deg}"
        )));
    }

    let count = (360.0 / step_deg).floor() as usize;
    let offset = radius_m * DEGREES_PER_METER;

    let ring = (0..count)
        .map(|i| {
            let angle = (i as f64 * step_deg).to_radians();
            Coordinate {
                longitude: center.longitude + offset * angle.cos(),
                latitude: center.latitude + offset * angle.sin(),
            }
        })
        .collect();
    Ok(ring)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> Coordinate {
        Coordinate::new(106.816_666, -6.200_000).unwrap()
    }

    #[test]
    fn test_coordinate_rejects_non_finite() {
        let err = Coordinate::new(f64::NAN, 1.0).unwrap_err();
        assert!(err.0.contains("longitude"));
        let err = Coordinate::new(1.0, f64::INFINITY).unwrap_err();
        assert!(err.0.contains("latitude"));
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_geometry_issue_is_an_error() {
        let err: Box<dyn std::error::Error> =
            Box::new(Coordinate::new(f64::NAN, 0.0).unwrap_err());
        assert!(err.to_string().contains("longitude"));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_connect_keeps_endpoints() {
        let a = center();
        let b = Coordinate::new(106.9, -6.3).unwrap();
        assert_eq!(connect(a, b), [a, b]);
    }

    #[test]
    fn test_default_ring_has_36_points() {
        let ring = boundary_ring(center(), DEFAULT_RADIUS_M, DEFAULT_STEP_DEG).unwrap();
        assert_eq!(ring.len(), 36);
    }

    #[test]
    fn test_ring_starts_east_of_center() {
        let c = center();
        let ring = boundary_ring(c, 250.0, 10.0).unwrap();
        let expected = 250.0 * DEGREES_PER_METER;
        assert!((ring[0].longitude - (c.longitude + expected)).abs() < 1e-12);
        assert!((ring[0].latitude - c.latitude).abs() < 1e-12);
        // 90 degrees -> due north
        assert!((ring[9].latitude - (c.latitude + expected)).abs() < 1e-12);
    }

    #[test]
    fn test_ring_points_on_radius() {
        let c = center();
        let ring = boundary_ring(c, 250.0, 10.0).unwrap();
        let expected = 250.0 * DEGREES_PER_METER;
        for p in &ring {
            assert!((p.planar_distance(&c) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_ring_count_floors() {
        assert_eq!(boundary_ring(center(), 100.0, 7.0).unwrap().len(), 51);
        assert_eq!(boundary_ring(center(), 100.0, 360.0).unwrap().len(), 1);
        assert_eq!(boundary_ring(center(), 100.0, 0.5).unwrap().len(), 720);
    }

    #[test]
    fn test_ring_rejects_bad_parameters() {
        assert!(boundary_ring(center(), 0.0, 10.0).is_err());
        assert!(boundary_ring(center(), -5.0, 10.0).is_err());
        assert!(boundary_ring(center(), f64::NAN, 10.0).is_err());
        assert!(boundary_ring(center(), 250.0, 0.0).is_err());
        assert!(boundary_ring(center(), 250.0, 361.0).is_err());
        assert!(boundary_ring(center(), 250.0, f64::INFINITY).is_err());
    }
}
