//! NORAD element-set parsing and derived orbital quantities.
//!
//! A satellite arrives as three lines of text: a name and the two fixed-column
//! element lines. Parsing extracts the mean Keplerian elements and derives, once,
//! everything the propagator needs per step: semi-axes, the J2 secular rates, and
//! the mean-motion decay rate from the ballistic term.
//!
//! Malformed numeric fields are rejected with
//! [`FlyoverError::MalformedElementSet`]; physically degenerate sets
//! (eccentricity ≥ 1, non-positive mean motion) are rejected at construction so
//! NaNs can never reach the search loop.

use std::ops::Range;

use crate::constants::{
    Days, Degree, Kilometer, Radian, DPI, EARTH_EQUATORIAL_RADIUS, EARTH_GRAV_PARAM_DAY,
    EARTH_J2, ELEMENT_MAX_AGE, ELEMENT_MAX_AGE_MOON,
};
use crate::flyover_errors::FlyoverError;
use crate::instant::Instant;

/// Mean orbital elements and the quantities derived from them at parse time.
///
/// Immutable after construction. Angles are stored in radians, distances in km,
/// rates in rad/day.
#[derive(Debug, Clone)]
pub struct OrbitalElements {
    /// Epoch of the element set.
    pub epoch: Instant,
    /// Inclination, rad.
    pub inclination: Radian,
    /// Right ascension of the ascending node at epoch, rad.
    pub raan: Radian,
    /// Eccentricity, unitless.
    pub eccentricity: f64,
    /// Argument of perigee at epoch, rad.
    pub arg_perigee: Radian,
    /// Mean anomaly at epoch, rad.
    pub mean_anomaly: Radian,
    /// Mean motion, rad/day.
    pub mean_motion: f64,
    /// Revolution number at epoch.
    pub rev_number: u32,
    /// Tighter staleness policy for the Moon special case.
    pub is_moon: bool,

    // Derived once at parse time
    /// Semi-major axis, km.
    pub semi_major_axis: Kilometer,
    /// Semi-minor axis, km.
    pub semi_minor_axis: Kilometer,
    /// Nodal-regression rate from J2, rad/day.
    pub node_rate: f64,
    /// Perigee-rotation rate from J2, rad/day.
    pub perigee_rate: f64,
    /// Fractional mean-motion decay rate from the ballistic term, 1/day.
    pub decay_rate: f64,
}

fn field<'a>(
    line: &'a str,
    lineno: u8,
    name: &'static str,
    cols: Range<usize>,
) -> Result<&'a str, FlyoverError> {
    line.get(cols).ok_or(FlyoverError::MalformedElementSet {
        line: lineno,
        field: name,
        value: line.to_string(),
    })
}

fn parse_f64(
    line: &str,
    lineno: u8,
    name: &'static str,
    cols: Range<usize>,
) -> Result<f64, FlyoverError> {
    let raw = field(line, lineno, name, cols)?;
    raw.trim()
        .parse()
        .map_err(|_| FlyoverError::MalformedElementSet {
            line: lineno,
            field: name,
            value: raw.to_string(),
        })
}

fn parse_u32(
    line: &str,
    lineno: u8,
    name: &'static str,
    cols: Range<usize>,
) -> Result<u32, FlyoverError> {
    let raw = field(line, lineno, name, cols)?;
    raw.trim()
        .parse()
        .map_err(|_| FlyoverError::MalformedElementSet {
            line: lineno,
            field: name,
            value: raw.to_string(),
        })
}

impl OrbitalElements {
    /// Parse a two-line element set.
    ///
    /// Consumed fields (fixed NORAD columns): epoch year/day and ballistic term from
    /// line 1; inclination, RAAN, eccentricity (implied decimal, ÷1e7), argument of
    /// perigee, mean anomaly, mean motion and revolution number from line 2.
    /// A name exactly equal to `"Moon"` selects the 1.5-day staleness threshold.
    ///
    /// Errors
    /// ----------
    /// * [`FlyoverError::MalformedElementSet`] when a consumed field does not parse.
    /// * [`FlyoverError::DegenerateElements`] when the parsed set cannot describe a
    ///   closed orbit.
    pub fn from_tle(name: &str, line1: &str, line2: &str) -> Result<Self, FlyoverError> {
        let epoch_year = parse_u32(line1, 1, "epoch year", 18..20)?;
        let epoch_day = parse_f64(line1, 1, "epoch day", 20..32)?;
        let ballistic = parse_f64(line1, 1, "ballistic term", 33..43)?;

        let inclination: Degree = parse_f64(line2, 2, "inclination", 8..16)?;
        let raan: Degree = parse_f64(line2, 2, "RAAN", 17..25)?;
        let ecc_raw = parse_u32(line2, 2, "eccentricity", 26..33)?;
        let arg_perigee: Degree = parse_f64(line2, 2, "argument of perigee", 34..42)?;
        let mean_anomaly: Degree = parse_f64(line2, 2, "mean anomaly", 43..51)?;
        let mean_motion_rev = parse_f64(line2, 2, "mean motion", 52..63)?;
        let rev_number = parse_u32(line2, 2, "revolution number", 63..68)?;

        // Two-digit year pivot used by the element-set format itself
        let year = if epoch_year < 57 {
            2000 + epoch_year as i32
        } else {
            1900 + epoch_year as i32
        };
        let epoch = Instant::from_calendar(year, 1, 1, 0, 0, 0.0).plus_days(epoch_day - 1.0);

        let eccentricity = ecc_raw as f64 / 1.0e7;
        Self::from_mean_elements(
            epoch,
            inclination,
            raan,
            eccentricity,
            arg_perigee,
            mean_anomaly,
            mean_motion_rev,
            ballistic,
            rev_number,
            name == "Moon",
        )
    }

    /// Build an element set from already-parsed mean elements (angles in degrees,
    /// mean motion in rev/day, ballistic term in rev/day²) and derive the secular
    /// quantities.
    #[allow(clippy::too_many_arguments)]
    pub fn from_mean_elements(
        epoch: Instant,
        inclination: Degree,
        raan: Degree,
        eccentricity: f64,
        arg_perigee: Degree,
        mean_anomaly: Degree,
        mean_motion_rev: f64,
        ballistic: f64,
        rev_number: u32,
        is_moon: bool,
    ) -> Result<Self, FlyoverError> {
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(FlyoverError::DegenerateElements(format!(
                "eccentricity {eccentricity} outside [0, 1)"
            )));
        }
        if !(mean_motion_rev > 0.0) {
            return Err(FlyoverError::DegenerateElements(format!(
                "non-positive mean motion {mean_motion_rev} rev/day"
            )));
        }

        let mean_motion = mean_motion_rev * DPI;
        let inclination = inclination.to_radians();

        // Kepler III with GM in km³/day² gives the semi-major axis directly in km
        let semi_major_axis = (EARTH_GRAV_PARAM_DAY / (mean_motion * mean_motion)).cbrt();
        let semi_minor_axis = semi_major_axis * (1.0 - eccentricity * eccentricity).sqrt();

        // J2 oblateness coefficient and the secular rates it drives
        let p = semi_major_axis * (1.0 - eccentricity * eccentricity);
        let j2_coeff =
            1.5 * EARTH_J2 * (EARTH_EQUATORIAL_RADIUS / p).powi(2) * mean_motion;
        let ci = inclination.cos();
        let node_rate = -j2_coeff * ci;
        let perigee_rate = 0.5 * j2_coeff * (5.0 * ci * ci - 1.0);

        // Linear decay: M(T) = M0 + n·T·(1 − 3·DT) with DT = decay_rate·T/2 matches
        // M0 + n·T + (ṅ/2)·T² when decay_rate = −2·ṅ/(3n), ṅ taken from the
        // ballistic term (rev/day², already ṅ/2)
        let decay_rate = -2.0 * (ballistic * DPI) / (3.0 * mean_motion);

        Ok(OrbitalElements {
            epoch,
            inclination,
            raan: raan.to_radians(),
            eccentricity,
            arg_perigee: arg_perigee.to_radians(),
            mean_anomaly: mean_anomaly.to_radians(),
            mean_motion,
            rev_number,
            is_moon,
            semi_major_axis,
            semi_minor_axis,
            node_rate,
            perigee_rate,
            decay_rate,
        })
    }

    /// Orbital period in days.
    pub fn period(&self) -> Days {
        DPI / self.mean_motion
    }

    /// Maximum element-set age considered fresh, days.
    pub fn max_age(&self) -> Days {
        if self.is_moon {
            ELEMENT_MAX_AGE_MOON
        } else {
            ELEMENT_MAX_AGE
        }
    }

    /// Advisory staleness check: is `t` within the maximum age of the epoch?
    ///
    /// Never enforced by the propagator itself; callers decide what to do with a
    /// stale set.
    pub fn is_fresh(&self, t: Instant) -> bool {
        (t - self.epoch).abs() <= self.max_age()
    }
}

/// A named satellite: element set plus identity.
#[derive(Debug, Clone)]
pub struct Satellite {
    pub name: String,
    pub elements: OrbitalElements,
}

impl Satellite {
    pub fn from_tle(name: &str, line1: &str, line2: &str) -> Result<Self, FlyoverError> {
        Ok(Satellite {
            name: name.trim().to_string(),
            elements: OrbitalElements::from_tle(name.trim(), line1, line2)?,
        })
    }
}
