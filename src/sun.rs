//! Low-precision solar ephemeris.
//!
//! One canonical mean-Sun model shared by eclipse testing and illumination shading:
//! mean longitude plus a two-term equation of center, projected through the obliquity
//! of the ecliptic. Accuracy is a few hundredths of a degree, deliberately matching
//! the precision class of the propagator.

use nalgebra::Vector3;

use crate::constants::{Degree, RADEG, T2000};
use crate::instant::{gmst, Instant};

/// Sun direction for one instant: unit vectors in the inertial and Earth-fixed frames.
///
/// Ephemeral value, recomputed per call; nothing is cached.
#[derive(Debug, Clone, Copy)]
pub struct SunState {
    /// Unit vector toward the Sun, inertial equatorial frame.
    pub inertial: Vector3<f64>,
    /// Unit vector toward the Sun, Earth-fixed frame.
    pub earth_fixed: Vector3<f64>,
}

impl SunState {
    /// Compute the Sun direction at `t`.
    pub fn at(t: Instant) -> Self {
        let d = t.as_mjd() - T2000;

        // Mean anomaly and mean longitude of the Sun, degrees
        let g = (357.529 + 0.985_600_28 * d) * RADEG;
        let q = 280.459 + 0.985_647_36 * d;

        // Apparent ecliptic longitude with the equation-of-center correction
        let lambda = (q + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()) * RADEG;
        let eps = (23.439 - 3.6e-7 * d) * RADEG;

        let inertial = Vector3::new(
            lambda.cos(),
            eps.cos() * lambda.sin(),
            eps.sin() * lambda.sin(),
        );

        let theta = gmst(t.as_mjd());
        let (st, ct) = theta.sin_cos();
        let earth_fixed = Vector3::new(
            inertial.x * ct + inertial.y * st,
            -inertial.x * st + inertial.y * ct,
            inertial.z,
        );

        SunState {
            inertial,
            earth_fixed,
        }
    }

    /// Sub-solar point `(latitude, longitude)` in degrees, longitude in `(-180°, 180°]`.
    ///
    /// This is the single source for map illumination shading.
    pub fn sub_solar(&self) -> (Degree, Degree) {
        let lat = self
            .earth_fixed
            .z
            .atan2(self.earth_fixed.xy().norm())
            .to_degrees();
        let lon = self.earth_fixed.y.atan2(self.earth_fixed.x).to_degrees();
        (lat, lon)
    }
}

#[cfg(test)]
mod sun_test {
    use super::*;

    #[test]
    fn test_sun_near_vernal_equinox() {
        // 2000-03-20 07:35 UTC: apparent solar longitude ~ 0, Sun near the inertial x-axis
        let t = Instant::from_calendar(2000, 3, 20, 7, 35, 0.0);
        let sun = SunState::at(t);
        assert!((sun.inertial.norm() - 1.0).abs() < 1e-12);
        assert!(sun.inertial.x > 0.999, "x = {}", sun.inertial.x);

        let (lat, _) = sun.sub_solar();
        assert!(lat.abs() < 0.5, "sub-solar latitude {lat}");
    }

    #[test]
    fn test_sun_solstice_declination() {
        // Northern summer solstice: sub-solar latitude near +23.4°
        let t = Instant::from_calendar(2024, 6, 20, 21, 0, 0.0);
        let (lat, lon) = SunState::at(t).sub_solar();
        assert!((lat - 23.44).abs() < 0.1, "sub-solar latitude {lat}");
        assert!(lon > -180.0 && lon <= 180.0);
    }

    #[test]
    fn test_sub_solar_longitude_tracks_noon() {
        // At 12:00 UTC the sub-solar longitude is within a few degrees of Greenwich
        // (equation of time stays under ~4 degrees)
        let t = Instant::from_calendar(2024, 3, 1, 12, 0, 0.0);
        let (_, lon) = SunState::at(t).sub_solar();
        assert!(lon.abs() < 5.0, "sub-solar longitude {lon}");
    }
}
