/*
 *  sun.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */
//! Sunrise/sunset approximation (NOAA method, zenith 90.833°). Seeds the
//! dashboard's dawn/dusk edges before the first successful weather fetch,
//! after which the provider's own sunrise/sunset values take over.

use chrono::{Datelike, Local, NaiveDate, NaiveTime, Timelike};

const ZENITH_DEG: f64 = 90.833;

#[derive(Debug, Clone, Default)]
pub struct SunTimes {
    /// Local-time sunrise, `None` in polar night.
    pub sunrise: Option<NaiveTime>,
    /// Local-time sunset, `None` in polar day.
    pub sunset: Option<NaiveTime>,
}

impl SunTimes {
    /// "HH:MM" strings with the original's fallbacks when the sun never
    /// rises or sets at this latitude.
    pub fn sunrise_hhmm(&self) -> String {
        self.sunrise.map_or("07:00".to_string(), |t| t.format("%H:%M").to_string())
    }

    pub fn sunset_hhmm(&self) -> String {
        self.sunset.map_or("20:00".to_string(), |t| t.format("%H:%M").to_string())
    }
}

#[inline]
fn sin_d(x: f64) -> f64 { x.to_radians().sin() }
#[inline]
fn cos_d(x: f64) -> f64 { x.to_radians().cos() }

fn norm(x: f64, span: f64) -> f64 {
    let v = x % span;
    if v < 0.0 { v + span } else { v }
}

/// One NOAA pass: UT hours of sunrise (`rise`) or sunset for the given
/// day-of-year. `None` when the event does not occur.
fn solar_pass(lat_deg: f64, lon_deg: f64, doy: f64, rise: bool) -> Option<f64> {
    let lng_hour = lon_deg / 15.0;
    let t = doy + ((if rise { 6.0 } else { 18.0 }) - lng_hour) / 24.0;

    // Mean anomaly, true longitude, right ascension (quadrant-aligned).
    let m = 0.9856 * t - 3.289;
    let l = norm(m + 1.916 * sin_d(m) + 0.020 * sin_d(2.0 * m) + 282.634, 360.0);
    let mut ra = norm((0.91764 * l.to_radians().tan()).atan().to_degrees(), 360.0);
    ra += (l / 90.0).floor() * 90.0 - (ra / 90.0).floor() * 90.0;
    ra /= 15.0;

    let sin_dec = 0.39782 * sin_d(l);
    let cos_dec = (1.0 - sin_dec * sin_dec).sqrt();
    let cos_h = (cos_d(ZENITH_DEG) - sin_dec * sin_d(lat_deg)) / (cos_dec * cos_d(lat_deg));
    if !(-1.0..=1.0).contains(&cos_h) {
        return None;
    }

    let h = if rise {
        360.0 - cos_h.acos().to_degrees()
    } else {
        cos_h.acos().to_degrees()
    } / 15.0;

    let local_mean = h + ra - 0.06571 * t - 6.622;
    Some(norm(local_mean - lng_hour, 24.0))
}

fn ut_to_local(ut_hours: f64, utc_offset_secs: i32) -> NaiveTime {
    let secs = (ut_hours * 3600.0).round() as i64 + utc_offset_secs as i64;
    let secs = secs.rem_euclid(86_400);
    NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

/// Sunrise/sunset for a civil date, shifted into the given UTC offset.
pub fn sun_times_for_date(
    lat_deg: f64,
    lon_deg: f64,
    date: NaiveDate,
    utc_offset_secs: i32,
) -> SunTimes {
    let doy = date.ordinal() as f64;
    SunTimes {
        sunrise: solar_pass(lat_deg, lon_deg, doy, true).map(|h| ut_to_local(h, utc_offset_secs)),
        sunset: solar_pass(lat_deg, lon_deg, doy, false).map(|h| ut_to_local(h, utc_offset_secs)),
    }
}

/// Today's times in the system's local offset.
pub fn sun_times_today(lat_deg: f64, lon_deg: f64) -> SunTimes {
    let now = Local::now();
    let offset = now.offset().local_minus_utc();
    sun_times_for_date(lat_deg, lon_deg, now.date_naive(), offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_equinox_near_six() {
        // At the equator around the equinox the sun rises close to 06:00
        // and sets close to 18:00 local solar time.
        let date = NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let times = sun_times_for_date(0.0, 0.0, date, 0);
        let rise = times.sunrise.expect("sunrise at the equator");
        let set = times.sunset.expect("sunset at the equator");
        assert!((5..=7).contains(&rise.hour()), "rise {}", rise);
        assert!((17..=19).contains(&set.hour()), "set {}", set);
    }

    #[test]
    fn test_polar_night_has_no_sunrise() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 21).unwrap();
        let times = sun_times_for_date(80.0, 0.0, date, 0);
        assert!(times.sunrise.is_none());
        assert!(times.sunset.is_none());
        // Fallback strings keep the dashboard usable regardless.
        assert_eq!(times.sunrise_hhmm(), "07:00");
        assert_eq!(times.sunset_hhmm(), "20:00");
    }
}
