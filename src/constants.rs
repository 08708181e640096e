/*
 *  constants.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Cadences, slot counts, and display thresholds shared across the
 *  dashboard. Refresh windows are expressed as a minute modulus plus
 *  the second within that minute at which the action fires.
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

use crate::config::Units;

/// Daily forecast sub-windows shown on the lower strip.
pub const DAILY_SLOTS: usize = 3;

/// Hourly forecast slots shown beneath the daily strip.
pub const HOURLY_SLOTS: usize = 6;

/// Weather is refetched when `(minute + 1) % WEATHER_PERIOD_MIN == 0`
/// at `WEATHER_REFRESH_SECOND`.
pub const WEATHER_PERIOD_MIN: u32 = 15;
pub const WEATHER_REFRESH_SECOND: u32 = 20;

/// News cadence. The update window fetches fresh headlines late in the
/// minute preceding the show window, so the ticker never waits on the
/// network: update at `(minute + 1) % NEWS_PERIOD_MIN == 0`, second 50;
/// show at `minute % NEWS_PERIOD_MIN == 0`, second 0.
pub const NEWS_PERIOD_MIN: u32 = 5;
pub const NEWS_UPDATE_SECOND: u32 = 50;
pub const NEWS_SHOW_SECOND: u32 = 0;

/// Consecutive fetch failures tolerated before the dashboard downgrades
/// to clock-only display.
pub const ERR_MAX: u32 = 3;

/// Seconds the news ticker overlay stays up once shown.
pub const NEWS_TICKER_SECS: u32 = 40;

/// Pixels the ticker text advances per tick.
pub const TICKER_STEP_PX: i32 = 24;

/// Headlines pulled from a feed per update.
pub const NEWS_ITEM_LIMIT: usize = 5;

pub const HEADLINE_SEPARATOR: &str = "  \u{2022}  ";

pub const DEGREE_SIGN: &str = "\u{00b0}";

/// Asset codes. `DEFAULT_BKG` doubles as the clock-only background.
pub const DEFAULT_BKG: &str = "default";
pub const NA_ICON: &str = "na";
pub const ALERT_ICON: &str = "alert";

/// Rain-probability coloring thresholds (percent).
pub const RAIN_WARN_PCT: i64 = 20;
pub const RAIN_HIGH_PCT: i64 = 60;

/// UV index at or above which a derived alert line is raised.
pub const UVI_HIGH: f64 = 8.0;

pub const COMPASS_POINTS: [&str; 16] = [
    "N",  "NNE", "NE", "ENE", "E",  "ESE",
    "SE", "SSE", "S",  "SSW", "SW", "WSW",
    "W",  "WNW", "NW", "NNW",
];

/// Wind speed at or above which a derived alert line is raised.
pub fn wind_high(units: Units) -> f64 {
    match units {
        Units::Imperial => 25.0, // mph
        Units::Metric => 40.0,   // km/h
    }
}

/// Provider wind speeds arrive in m/s for metric and mph for imperial.
pub fn wind_scale(units: Units) -> f64 {
    match units {
        Units::Imperial => 1.0,
        Units::Metric => 3.6,
    }
}

/// Provider pressure arrives in hPa; imperial displays inches of mercury.
pub fn baro_scale(units: Units) -> f64 {
    match units {
        Units::Imperial => 0.02953,
        Units::Metric => 1.0,
    }
}

pub fn wind_speed_label(units: Units) -> &'static str {
    match units {
        Units::Imperial => "mph",
        Units::Metric => "km/h",
    }
}

pub fn baro_label(units: Units) -> &'static str {
    match units {
        Units::Imperial => "in",
        Units::Metric => "hPa",
    }
}

/// Clear-sky temperatures past these bounds swap in the hot/cold artwork.
pub fn temp_high(units: Units) -> f64 {
    match units {
        Units::Imperial => 90.0,
        Units::Metric => 32.0,
    }
}

pub fn temp_low(units: Units) -> f64 {
    match units {
        Units::Imperial => 32.0,
        Units::Metric => 0.0,
    }
}
