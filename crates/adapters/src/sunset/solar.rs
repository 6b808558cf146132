// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Perch Labs

//! Astronomical sunset computation
//!
//! Standard sunrise-equation approach (NOAA coefficients) with the
//! conventional -0.833 degree zenith correction for refraction and the
//! solar disc. Accuracy is a couple of minutes, which is plenty for a
//! quiet window measured in tens of minutes.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Sunset for one date at one location
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sunset {
    Sets(DateTime<Utc>),
    /// Sun never sets on this date (polar summer)
    PolarDay,
    /// Sun never rises on this date (polar winter)
    PolarNight,
}

const J2000: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const EARTH_OBLIQUITY_DEG: f64 = 23.4397;

/// UTC sunset on the given calendar date.
///
/// `date` should be the local date at the location; longitude is
/// degrees east, latitude degrees north.
pub fn sunset_utc(date: NaiveDate, latitude: f64, longitude: f64) -> Sunset {
    let jdn = julian_day_number(date);

    // Mean solar time at this longitude
    let n = jdn - J2000 + 0.0008;
    let mean_solar_time = n - longitude / 360.0;

    // Solar mean anomaly and equation of the center
    let mean_anomaly = (357.5291 + 0.985_600_28 * mean_solar_time).rem_euclid(360.0);
    let m_rad = mean_anomaly.to_radians();
    let center = 1.9148 * m_rad.sin() + 0.0200 * (2.0 * m_rad).sin() + 0.0003 * (3.0 * m_rad).sin();

    // Ecliptic longitude and solar transit
    let ecliptic_longitude = (mean_anomaly + center + 180.0 + 102.9372).rem_euclid(360.0);
    let l_rad = ecliptic_longitude.to_radians();
    let transit = J2000 + mean_solar_time + 0.0053 * m_rad.sin() - 0.0069 * (2.0 * l_rad).sin();

    // Declination and hour angle at the sunset zenith
    let declination = (l_rad.sin() * EARTH_OBLIQUITY_DEG.to_radians().sin()).asin();
    let lat_rad = latitude.to_radians();
    let cos_hour_angle = ((-0.833_f64).to_radians().sin() - lat_rad.sin() * declination.sin())
        / (lat_rad.cos() * declination.cos());

    if cos_hour_angle > 1.0 {
        return Sunset::PolarNight;
    }
    if cos_hour_angle < -1.0 {
        return Sunset::PolarDay;
    }

    let hour_angle_deg = cos_hour_angle.acos().to_degrees();
    let jd_set = transit + hour_angle_deg / 360.0;
    let unix = ((jd_set - UNIX_EPOCH_JD) * 86_400.0) as i64;
    match DateTime::from_timestamp(unix, 0) {
        Some(t) => Sunset::Sets(t),
        None => Sunset::PolarNight,
    }
}

/// Julian day number (at noon) for a calendar date
fn julian_day_number(date: NaiveDate) -> f64 {
    // days_from_ce(2000-01-01) = 730120, JDN(2000-01-01) = 2451545
    f64::from(date.num_days_from_ce()) + 1_721_425.0
}

#[cfg(test)]
#[path = "solar_tests.rs"]
mod tests;
