//! Element-set propagation and topocentric projection.
//!
//! [`propagate`] is a pure function from an element set and an [`Instant`] to a
//! [`SatState`]: no hidden cache, no predict-then-query contract. Every accessor
//! takes the state it reads, so independent calls can run on any thread without
//! synchronization.
//!
//! The model is deliberately low-order: Keplerian motion with secular J2 node and
//! perigee rates and a single linear mean-motion decay term. That matches the
//! precision class of the solar model and of the whole display pipeline.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::constants::{
    Degree, Kilometer, Radian, DPI, EARTH_EQUATORIAL_RADIUS, KEPLER_MAX_ITER, KEPLER_TOLERANCE,
    SECONDS_PER_DAY,
};
use crate::elements::{OrbitalElements, Satellite};
use crate::flyover_errors::FlyoverError;
use crate::instant::{gmst, Instant};
use crate::observer::ObserverFrame;
use crate::sun::SunState;

/// Satellite state at one instant, in both frames.
///
/// Produced by [`propagate`]; consumed by the accessors below. Positions in km,
/// velocities in km/s.
#[derive(Debug, Clone, Copy)]
pub struct SatState {
    /// Instant this state is valid for.
    pub t: Instant,
    /// Inertial position, km.
    pub position_inertial: Vector3<f64>,
    /// Inertial velocity, km/s.
    pub velocity_inertial: Vector3<f64>,
    /// Earth-fixed position, km.
    pub position_earth_fixed: Vector3<f64>,
    /// Inertial velocity expressed along Earth-fixed axes, km/s.
    pub velocity_earth_fixed: Vector3<f64>,
    /// Geocentric distance, km.
    pub radius: Kilometer,
}

/// Topocentric look angles and ranging for one sample.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TopoView {
    /// Apparent elevation above the horizon (refraction applied), degrees.
    pub elevation: Degree,
    /// Azimuth east of north, `[0°, 360°)`.
    pub azimuth: Degree,
    /// Slant range, km.
    pub range: Kilometer,
    /// Range rate, km/s (negative while approaching).
    pub range_rate: f64,
}

/// A latitude/longitude point on the sphere, degrees, longitude in `(-180°, 180°]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: Degree,
    pub longitude: Degree,
}

/// Solve Kepler's equation `E − e·sin E = M` by Newton iteration.
///
/// Converges to [`KEPLER_TOLERANCE`] or fails with
/// [`FlyoverError::PropagationDegenerate`] after [`KEPLER_MAX_ITER`] steps; the
/// solver never lets a NaN escape into the search loop.
pub fn solve_kepler(mean_anomaly: Radian, eccentricity: f64) -> Result<Radian, FlyoverError> {
    // near-parabolic orbits converge poorly from E = M
    let mut ea = if eccentricity < 0.8 {
        mean_anomaly
    } else {
        std::f64::consts::PI
    };
    for _ in 0..KEPLER_MAX_ITER {
        let delta = (ea - eccentricity * ea.sin() - mean_anomaly) / (1.0 - eccentricity * ea.cos());
        ea -= delta;
        if delta.abs() < KEPLER_TOLERANCE {
            return Ok(ea);
        }
    }
    Err(FlyoverError::PropagationDegenerate {
        eccentricity,
        mean_anomaly,
        iterations: KEPLER_MAX_ITER,
    })
}

/// Propagate an element set to `t`.
///
/// Steps: elapsed time and linear decay corrections, mean anomaly reduction,
/// Kepler solve, orbital-plane state scaled by the decay-corrected axes, rotation
/// through the J2-perturbed argument of perigee / RAAN / inclination into the
/// inertial frame, and a Greenwich-hour-angle rotation into the Earth-fixed frame.
pub fn propagate(elements: &OrbitalElements, t: Instant) -> Result<SatState, FlyoverError> {
    let elapsed = t - elements.epoch;

    // Linear decay corrections applied to the orbit size (kd) and to the
    // accumulated secular rates (kdp)
    let dt = elements.decay_rate * elapsed / 2.0;
    let kd = 1.0 + 4.0 * dt;
    let kdp = 1.0 - 7.0 * dt;

    let m = (elements.mean_anomaly + elements.mean_motion * elapsed * (1.0 - 3.0 * dt))
        .rem_euclid(DPI);
    let ea = solve_kepler(m, elements.eccentricity)?;

    // In-plane position and velocity, perigee along +x
    let (s, c) = ea.sin_cos();
    let denom = 1.0 - elements.eccentricity * c;
    let a = elements.semi_major_axis * kd;
    let b = elements.semi_minor_axis * kd;
    let x = a * (c - elements.eccentricity);
    let y = b * s;
    // rad/day rates; scaled to km/s once rotated
    let vx = -a * s * elements.mean_motion / denom;
    let vy = b * c * elements.mean_motion / denom;

    // Plane → inertial: Rz(Ω)·Rx(i)·Rz(ω) with the secular J2 drift applied
    let node = elements.raan + elements.node_rate * elapsed * kdp;
    let perigee = elements.arg_perigee + elements.perigee_rate * elapsed * kdp;
    let rot = Rotation3::from_axis_angle(&Vector3::z_axis(), node)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), elements.inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), perigee);

    let position_inertial = rot * Vector3::new(x, y, 0.0);
    let velocity_inertial = rot * Vector3::new(vx, vy, 0.0) / SECONDS_PER_DAY;

    // Greenwich hour angle takes inertial to Earth-fixed (axes rotation only;
    // the transport term lives in the observer's rotational velocity)
    let theta = gmst(t.as_mjd());
    let (st, ct) = theta.sin_cos();
    let spin = |v: &Vector3<f64>| Vector3::new(v.x * ct + v.y * st, -v.x * st + v.y * ct, v.z);

    let position_earth_fixed = spin(&position_inertial);
    let velocity_earth_fixed = spin(&velocity_inertial);

    Ok(SatState {
        t,
        radius: position_inertial.norm(),
        position_inertial,
        velocity_inertial,
        position_earth_fixed,
        velocity_earth_fixed,
    })
}

/// Saemundsson refraction at 1010 mbar / 10 °C: true to apparent elevation, degrees.
fn refract(elevation: Degree) -> Degree {
    // the formula blows up far below the horizon where refraction is meaningless
    if elevation < -1.0 {
        return elevation;
    }
    let arg = (elevation + 10.3 / (elevation + 5.11)).to_radians();
    elevation + 1.02 / arg.tan() / 60.0
}

fn wrap_latlon(v: &Vector3<f64>) -> GeoPoint {
    GeoPoint {
        latitude: v.z.atan2(v.xy().norm()).to_degrees(),
        longitude: v.y.atan2(v.x).to_degrees(),
    }
}

impl SatState {
    /// Project this state into an observer's sky.
    ///
    /// Elevation is apparent (refraction applied); azimuth is measured east of
    /// north; range rate is the line-of-sight projection of the velocity relative
    /// to the rotating site.
    pub fn topo(&self, observer: &ObserverFrame) -> TopoView {
        let range_vec = self.position_earth_fixed - observer.position;
        let range = range_vec.norm();
        let unit = range_vec / range;

        let elevation = refract(unit.dot(&observer.up).asin().to_degrees());
        let azimuth = unit
            .dot(&observer.east)
            .atan2(unit.dot(&observer.north))
            .to_degrees()
            .rem_euclid(360.0);

        let relative_velocity = self.velocity_earth_fixed - observer.velocity;
        TopoView {
            elevation,
            azimuth,
            range,
            range_rate: relative_velocity.dot(&unit),
        }
    }

    /// Subsatellite point from the Earth-fixed position.
    pub fn geo(&self) -> GeoPoint {
        wrap_latlon(&self.position_earth_fixed)
    }

    /// Sub-celestial point from the inertial position.
    pub fn celest(&self) -> GeoPoint {
        wrap_latlon(&self.position_inertial)
    }

    /// Great-circle angular radius (degrees) of the ground area from which the
    /// satellite stands above elevation `alt` degrees, at the current distance.
    pub fn viewing_radius(&self, alt: Degree) -> Degree {
        let alt = alt.to_radians();
        let r = (EARTH_EQUATORIAL_RADIUS / self.radius * alt.cos()).acos() - alt;
        r.to_degrees()
    }

    /// Umbral eclipse test: behind the Earth relative to the Sun and inside the
    /// shadow cylinder.
    pub fn eclipsed(&self, sun: &SunState) -> bool {
        let along = self.position_inertial.dot(&sun.inertial);
        if along >= 0.0 {
            return false;
        }
        let perp = (self.position_inertial - along * sun.inertial).norm();
        perp < EARTH_EQUATORIAL_RADIUS
    }
}

impl Satellite {
    /// Convenience wrapper over [`propagate`].
    pub fn propagate(&self, t: Instant) -> Result<SatState, FlyoverError> {
        propagate(&self.elements, t)
    }
}
