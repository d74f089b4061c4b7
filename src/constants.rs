//! # Constants and type definitions for Flyover
//!
//! This module centralizes the **physical constants**, **conversion factors**, and the
//! unit type aliases used throughout the `flyover` library.
//!
//! All positions are expressed in **kilometers**, velocities in **km/s**, angles in
//! **radians** internally and **degrees** at the public surface, and time spans in
//! **days** unless a name says otherwise.

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// MJD epoch of J2000.0 (2000-01-01 12:00:00)
pub const T2000: f64 = 51544.5;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2_400_000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Earth equatorial radius in kilometers (WGS84)
pub const EARTH_EQUATORIAL_RADIUS: f64 = 6_378.137;

/// WGS84 flattening of the reference ellipsoid
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Geocentric gravitational constant GM, km³/s²
pub const EARTH_GRAV_PARAM: f64 = 3.986_004_418e5;

/// GM expressed in km³/day², for mean motions in rad/day
pub const EARTH_GRAV_PARAM_DAY: f64 = EARTH_GRAV_PARAM * SECONDS_PER_DAY * SECONDS_PER_DAY;

/// Second zonal harmonic of the geopotential (J2, unitless)
pub const EARTH_J2: f64 = 1.082_626_68e-3;

/// Ratio of the sidereal day to the solar day
pub const SIDEREAL_RATIO: f64 = 1.002_737_909_34;

/// Earth rotation rate in rad/day
pub const EARTH_ROTATION_RATE: f64 = DPI * SIDEREAL_RATIO;

/// Convergence tolerance of the Kepler solver, radians
pub const KEPLER_TOLERANCE: f64 = 1e-5;

/// Iteration cap of the Kepler solver
pub const KEPLER_MAX_ITER: usize = 30;

/// Maximum element-set age considered fresh, days
pub const ELEMENT_MAX_AGE: f64 = 7.0;

/// Maximum element-set age for the Moon special case, days
pub const ELEMENT_MAX_AGE_MOON: f64 = 1.5;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Time span in days
pub type Days = f64;
/// Modified Julian Date (days)
pub type MJD = f64;
