use chrono::{DateTime, Datelike, TimeZone, Utc};

use super::consts::{OMEGA_E, SECDAY, TWOPI, UNIX_EPOCH_JD};
use super::math::{fmod2p, frac, modulus};

/// Julian date of 0.0 January of `year`.
///
/// Integer truncation happens at the same points as in the classic
/// NORAD routines so that epoch conversions agree to the last bit.
pub fn julian_date_of_year(year: f64) -> f64 {
    let year = year - 1.0;
    let a = (year / 100.0) as i64;
    let b = 2 - a + a / 4;
    let mut i = (365.25 * year) as i64;
    i += (30.6001 * 14.0) as i64;
    i as f64 + 1720994.5 + b as f64
}

/// Splits a TLE epoch (YYDDD.FFFFFFFF) into a full year and day-of-year
/// with fraction. Two-digit years below 57 are 20YY, others 19YY.
fn split_epoch(epoch: f64) -> (f64, f64) {
    let scaled = epoch * 1E-3;
    let mut year = scaled.trunc();
    let day = (scaled - year) * 1E3;
    if year < 57.0 {
        year += 2000.0;
    } else {
        year += 1900.0;
    }
    (year, day)
}

/// Julian date of a TLE epoch (YYDDD.FFFFFFFF).
pub fn julian_date_of_epoch(epoch: f64) -> f64 {
    let (year, day) = split_epoch(epoch);
    julian_date_of_year(year) + day
}

/// Converts a Julian date back to the TLE epoch format YYDDD.FFFFFFFF.
pub fn epoch_time(jd: f64) -> f64 {
    let dt = datetime_from_julian(jd);
    let yr = (dt.year() % 100) as f64;
    yr * 1000.0 + dt.ordinal() as f64 + frac(jd + 0.5)
}

pub fn day_of_year(year: i32, month: u32, day: u32) -> Option<u32> {
    chrono::NaiveDate::from_ymd_opt(year, month, day).map(|d| d.ordinal())
}

pub fn fraction_of_day(hour: u32, minute: u32, second: u32) -> f64 {
    (hour as f64 + (minute as f64 + second as f64 / 60.0) / 60.0) / 24.0
}

/// Difference between ephemeris time and UT, seconds.
pub fn delta_et(year: f64) -> f64 {
    26.465 + 0.747622 * (year - 1950.0) + 1.886913 * (TWOPI * (year - 1975.0) / 33.0).sin()
}

/// Greenwich sidereal angle used by the deep-space initialization.
///
/// Returns the angle together with `ds50`, the days since 1950 Jan 0.0 UT
/// that the lunar-solar terms are referenced to.
pub fn theta_g(epoch: f64) -> (f64, f64) {
    let (year, day) = split_epoch(epoch);
    let ut = day.fract();
    let day = day.trunc();
    let jd = julian_date_of_year(year) + day;
    let ds50 = jd - 2433281.5 + ut;
    (fmod2p(6.3003880987 * ds50 + 1.72944494), ds50)
}

/// Greenwich mean sidereal time, radians, at Julian date `jd`.
pub fn theta_g_jd(jd: f64) -> f64 {
    let ut = frac(jd + 0.5);
    let jd = jd - ut;
    let tu = (jd - 2451545.0) / 36525.0;
    let gmst = 24110.54841 + tu * (8640184.812866 + tu * (0.093104 - tu * 6.2E-6));
    let gmst = modulus(gmst + SECDAY * OMEGA_E * ut, SECDAY);
    TWOPI * gmst / SECDAY
}

pub fn julian_from_unix(seconds: f64) -> f64 {
    seconds / SECDAY + UNIX_EPOCH_JD
}

pub fn unix_from_julian(jd: f64) -> f64 {
    (jd - UNIX_EPOCH_JD) * SECDAY
}

pub fn julian_from_datetime(dt: &DateTime<Utc>) -> f64 {
    let seconds = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 * 1e-9;
    julian_from_unix(seconds)
}

/// Converts a Julian date to a UTC timestamp, rounded to the millisecond.
pub fn datetime_from_julian(jd: f64) -> DateTime<Utc> {
    let millis = (unix_from_julian(jd) * 1000.0).round() as i64;
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Current time as a Julian date.
pub fn julian_now() -> f64 {
    julian_from_datetime(&Utc::now())
}
