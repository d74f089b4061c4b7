//! Ground-station geometry.
//!
//! An [`ObserverFrame`] turns a geodetic site (latitude, longitude, altitude) into the
//! Earth-fixed quantities the topocentric projection needs: the ECEF position on the
//! WGS84 ellipsoid, the orthonormal Up/East/North basis, and the rotational velocity
//! of the site. Everything is derived once at construction; the frame is immutable.

use nalgebra::Vector3;

use crate::constants::{
    Degree, Kilometer, Meter, EARTH_EQUATORIAL_RADIUS, EARTH_FLATTENING, EARTH_ROTATION_RATE,
    SECONDS_PER_DAY,
};

/// Immutable topocentric basis and Earth-fixed state of a ground observer.
///
/// Units: positions in km, velocity in km/s. The basis vectors are unit-length and
/// mutually orthogonal by construction; this is a derivation invariant, not checked
/// at runtime.
#[derive(Debug, Clone)]
pub struct ObserverFrame {
    /// Geodetic latitude, degrees north.
    pub latitude: Degree,
    /// Geodetic longitude, degrees east.
    pub longitude: Degree,
    /// Altitude above the ellipsoid, meters.
    pub altitude: Meter,

    /// ECEF position, km.
    pub position: Vector3<Kilometer>,
    /// Geodetic zenith direction.
    pub up: Vector3<f64>,
    /// Local east direction.
    pub east: Vector3<f64>,
    /// Local north direction.
    pub north: Vector3<f64>,
    /// Rotational velocity `ω⊕ × r`, km/s, expressed in Earth-fixed axes.
    pub velocity: Vector3<f64>,
}

impl ObserverFrame {
    /// Build the frame from geodetic coordinates.
    ///
    /// Arguments
    /// -----------------
    /// * `latitude`: geodetic latitude in degrees (north positive).
    /// * `longitude`: geodetic longitude in degrees (east positive).
    /// * `altitude`: height above the WGS84 ellipsoid in meters.
    pub fn new(latitude: Degree, longitude: Degree, altitude: Meter) -> Self {
        let lat = latitude.to_radians();
        let lon = longitude.to_radians();
        let (slat, clat) = lat.sin_cos();
        let (slon, clon) = lon.sin_cos();

        // Prime-vertical radius of curvature on the oblate ellipsoid
        let e2 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);
        let n = EARTH_EQUATORIAL_RADIUS / (1.0 - e2 * slat * slat).sqrt();
        let h = altitude / 1000.0;

        let position = Vector3::new(
            (n + h) * clat * clon,
            (n + h) * clat * slon,
            (n * (1.0 - e2) + h) * slat,
        );

        let up = Vector3::new(clat * clon, clat * slon, slat);
        let east = Vector3::new(-slon, clon, 0.0);
        let north = Vector3::new(-slat * clon, -slat * slon, clat);

        // ω × r written out for ω = (0, 0, ω⊕); rad/day scaled down to km/s
        let omega = EARTH_ROTATION_RATE / SECONDS_PER_DAY;
        let velocity = Vector3::new(-omega * position.y, omega * position.x, 0.0);

        ObserverFrame {
            latitude,
            longitude,
            altitude,
            position,
            up,
            east,
            north,
            velocity,
        }
    }
}

#[cfg(test)]
mod observer_test {
    use super::*;
    use crate::constants::EARTH_EQUATORIAL_RADIUS;

    #[test]
    fn test_basis_orthonormality() {
        let obs = ObserverFrame::new(48.2082, 16.3738, 200.0);
        for v in [&obs.up, &obs.east, &obs.north] {
            assert!((v.norm() - 1.0).abs() < 1e-12);
        }
        assert!(obs.up.dot(&obs.east).abs() < 1e-12);
        assert!(obs.up.dot(&obs.north).abs() < 1e-12);
        assert!(obs.east.dot(&obs.north).abs() < 1e-12);
        // right-handed triad: east × north = up
        let cross = obs.east.cross(&obs.north);
        assert!((cross - obs.up).norm() < 1e-12);
    }

    #[test]
    fn test_position_on_ellipsoid() {
        let polar_radius = EARTH_EQUATORIAL_RADIUS * (1.0 - EARTH_FLATTENING);

        let equator = ObserverFrame::new(0.0, 0.0, 0.0);
        assert!((equator.position.norm() - EARTH_EQUATORIAL_RADIUS).abs() < 1e-6);

        let pole = ObserverFrame::new(90.0, 0.0, 0.0);
        assert!((pole.position.norm() - polar_radius).abs() < 1e-6);

        let mid = ObserverFrame::new(45.0, 7.0, 1000.0);
        let r = mid.position.norm();
        assert!(r > polar_radius && r < EARTH_EQUATORIAL_RADIUS + 2.0);
    }

    #[test]
    fn test_rotational_velocity() {
        let obs = ObserverFrame::new(48.2082, 16.3738, 200.0);
        // the site moves eastward, stays in the horizontal plane
        assert!(obs.velocity.dot(&obs.east) > 0.0);
        assert!(obs.velocity.dot(&obs.up).abs() < 1e-9);
        // equatorial sea-level speed is about 0.465 km/s
        let eq = ObserverFrame::new(0.0, 0.0, 0.0);
        assert!((eq.velocity.norm() - 0.465).abs() < 0.005);
    }
}
