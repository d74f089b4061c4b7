//! Continuous time values for the prediction core.
//!
//! An [`Instant`] is an integer MJD day number plus a fraction of day kept in `[0, 1)`.
//! Splitting the two keeps calendar arithmetic exact over the integer part while the
//! fraction carries the time of day at full double precision, which matters when a
//! search loop accumulates thousands of 2-second steps.

use serde::{Deserialize, Serialize};

use crate::constants::{DPI, JDTOMJD, SECONDS_PER_DAY, T2000, MJD};
use crate::flyover_errors::FlyoverError;

/// A point in time: integer MJD day number and fraction of day in `[0, 1)`.
///
/// Immutable value type. Arithmetic renormalizes the fraction by carrying whole-day
/// overflow (of either sign) into the day number, so derived comparisons stay exact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Instant {
    day: i64,
    frac: f64,
}

impl Instant {
    /// Build an instant from a day number and a fraction of day, renormalizing so the
    /// fraction lands back in `[0, 1)`.
    pub fn new(day: i64, frac: f64) -> Self {
        let carry = frac.floor();
        let mut frac = frac - carry;
        let mut day = day + carry as i64;
        // floor subtraction can round up to exactly 1.0 for tiny negative inputs
        if frac >= 1.0 {
            frac -= 1.0;
            day += 1;
        }
        Instant { day, frac }
    }

    /// Convert a Gregorian calendar date and time of day to an instant.
    ///
    /// Uses the classical day-numbering formula: January and February are treated as
    /// months 13 and 14 of the previous year, and the Gregorian century correction is
    /// applied. Assumes valid Gregorian input; no range checking is performed.
    pub fn from_calendar(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        let (y, m) = if month <= 2 {
            (year - 1, month + 12)
        } else {
            (year, month)
        };
        let a = y.div_euclid(100);
        let b = 2 - a + a.div_euclid(4);
        let jd0 = (365.25 * (y as f64 + 4716.0)).floor()
            + (30.6001 * (m as f64 + 1.0)).floor()
            + day as f64
            + b as f64
            - 1524.5;
        let dn = (jd0 - JDTOMJD).round() as i64;
        let frac = (hour as f64 * 3600.0 + minute as f64 * 60.0 + second) / SECONDS_PER_DAY;
        Instant::new(dn, frac)
    }

    /// Inverse of [`Instant::from_calendar`] for the date part: `(year, month, day)`.
    pub fn to_calendar(self) -> (i32, u32, u32) {
        let z = self.day + 2_400_001; // JD + 0.5 at 0h, exact integer
        let alpha = ((z as f64 - 1_867_216.25) / 36_524.25).floor() as i64;
        let a = z + 1 + alpha - alpha.div_euclid(4);
        let b = a + 1524;
        let c = ((b as f64 - 122.1) / 365.25).floor() as i64;
        let d = (365.25 * c as f64).floor() as i64;
        let e = ((b - d) as f64 / 30.6001).floor() as i64;
        let day = b - d - (30.6001 * e as f64).floor() as i64;
        let month = if e < 14 { e - 1 } else { e - 13 };
        let year = if month > 2 { c - 4716 } else { c - 4715 };
        (year as i32, month as u32, day as u32)
    }

    /// Time of day as `(hour, minute, second)`, seconds rounded to the nearest integer
    /// and clamped so a carried 60 reads as 59.
    pub fn time_of_day(self) -> (u32, u32, u32) {
        let secs = self.frac * SECONDS_PER_DAY;
        let hour = (secs / 3600.0).floor();
        let minute = ((secs - hour * 3600.0) / 60.0).floor();
        let second = (secs - hour * 3600.0 - minute * 60.0).round().min(59.0);
        (hour as u32, minute as u32, second as u32)
    }

    /// The instant shifted by a (possibly negative) number of seconds.
    pub fn plus_seconds(self, seconds: f64) -> Self {
        Instant::new(self.day, self.frac + seconds / SECONDS_PER_DAY)
    }

    /// The instant shifted by a (possibly negative) number of days.
    pub fn plus_days(self, days: f64) -> Self {
        Instant::new(self.day, self.frac + days)
    }

    /// Continuous MJD value.
    pub fn as_mjd(self) -> MJD {
        self.day as f64 + self.frac
    }

    /// Build an instant from a continuous MJD value.
    pub fn from_mjd(mjd: MJD) -> Self {
        Instant::new(0, mjd)
    }

    /// Current wall-clock time from the OS clock.
    pub fn now() -> Result<Self, FlyoverError> {
        let epoch = hifitime::Epoch::now()?;
        Ok(Instant::from_mjd(epoch.to_mjd_utc_days()))
    }
}

impl std::ops::Sub for Instant {
    type Output = f64;

    /// Difference in continuous days; negative when `rhs` is later.
    fn sub(self, rhs: Instant) -> f64 {
        (self.day - rhs.day) as f64 + (self.frac - rhs.frac)
    }
}

impl PartialOrd for Instant {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        (self.day, self.frac).partial_cmp(&(other.day, other.frac))
    }
}

/// Greenwich Mean Sidereal Time in radians for a given MJD, normalized to `[0, 2π)`.
///
/// Polynomial GMST at 0h plus the fractional-day term scaled by the ratio of the
/// sidereal to the solar day. Accuracy is well inside the precision class of the
/// propagator; the UT1−UTC offset is ignored.
pub fn gmst(mjd: MJD) -> f64 {
    const C0: f64 = 24110.54841;
    const C1: f64 = 8640184.812866;
    const C2: f64 = 9.3104e-2;
    const C3: f64 = -6.2e-6;
    const RAP: f64 = 1.00273790934;

    let day0 = mjd.floor();
    let t = (day0 - T2000) / 36525.0;
    let gmst0 = (((C3 * t + C2) * t + C1) * t + C0) * DPI / SECONDS_PER_DAY;
    let angle = gmst0 + mjd.fract() * DPI * RAP;
    angle.rem_euclid(DPI)
}
