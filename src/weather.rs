/*
 *  weather.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Weather provider client: one-call style JSON endpoint giving current
 *  conditions plus daily/hourly timelines and optional alerts. All
 *  embedded epoch timestamps are shifted by the payload's timezone
 *  offset before formatting.
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

use chrono::{DateTime, Local};
use flate2::read::GzDecoder;
use log::info;
use reqwest::{header, Client};
use serde_json::{Error as JsonError, Value};
use std::fmt::{self, Display};
use std::io::Read;
use std::time::Duration;

use crate::config::{BackgroundMode, Config, LocationSpec, Units};
use crate::constants::{
    baro_scale, temp_high, temp_low, wind_high, wind_scale, wind_speed_label, COMPASS_POINTS,
    DAILY_SLOTS, DEGREE_SIGN, HOURLY_SLOTS, NA_ICON, UVI_HIGH,
};
use crate::lang::{phrase, uvi_level, Lang, Phrase};

/// Custom error type for weather provider operations.
#[derive(Debug)]
pub enum WeatherApiError {
    HttpRequestError(reqwest::Error),
    DeserializationError(JsonError),
    MissingData(&'static str),
    InvalidInput(String),
}

impl Display for WeatherApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherApiError::HttpRequestError(e) => write!(f, "HTTP request error: {}", e),
            WeatherApiError::DeserializationError(e) => write!(f, "JSON deserialization error: {}", e),
            WeatherApiError::MissingData(field) => write!(f, "Missing weather data: {}", field),
            WeatherApiError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for WeatherApiError {}

impl From<reqwest::Error> for WeatherApiError {
    fn from(err: reqwest::Error) -> Self {
        WeatherApiError::HttpRequestError(err)
    }
}

impl From<JsonError> for WeatherApiError {
    fn from(err: JsonError) -> Self {
        WeatherApiError::DeserializationError(err)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentConditions {
    /// Whole-degree temperature, already in display units.
    pub temp: String,
    /// Feels-like with the degree sign appended.
    pub feels_like: String,
    pub icon: String,
    /// Provider condition text, first letter capitalized, localized by
    /// the provider via the lang query parameter.
    pub condition: String,
    pub wind_speed: f64,
    pub wind_dir: &'static str,
    pub pressure: String,
    pub humidity: String,
    pub uvi: f64,
    pub moon: &'static str,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyForecast {
    /// "Monday, 04" at the location's offset.
    pub day_label: String,
    pub icon: String,
    /// Probability of precipitation, rounded to the nearest 5%.
    pub rain_pct: i64,
    pub temp_max: String,
    pub temp_min: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyForecast {
    pub hour_label: String,
    pub temp: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertInfo {
    /// Empty for alerts derived locally (high wind / extreme UV).
    pub start_hhmm: String,
    pub end_hhmm: String,
    pub event: String,
}

#[derive(Debug, Clone, Default)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub daily: Vec<DailyForecast>,
    pub hourly: Vec<HourlyForecast>,
    pub alert: Option<AlertInfo>,
    /// "HH:MM" at the location's offset.
    pub sunrise: String,
    pub sunset: String,
    pub night_time: bool,
    /// Background artwork code derived from conditions.
    pub background_code: String,
    pub tz_offset_secs: i64,
    /// Local "HH:MM" of the last accepted parse.
    pub last_updated: String,
}

/// Weather provider client. Owns the HTTP client, the active location,
/// and the most recently parsed report.
pub struct WeatherClient {
    client: Client,
    url_template: String,
    units: Units,
    lang: Lang,
    location: LocationSpec,
    weather_backgrounds: bool,
    pub report: WeatherReport,
}

impl WeatherClient {
    pub fn new(cfg: &Config) -> Result<Self, WeatherApiError> {
        const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

        let location = cfg
            .locations
            .first()
            .cloned()
            .ok_or_else(|| WeatherApiError::InvalidInput("no locations configured".to_string()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));
        headers.insert("Accept-Encoding", header::HeaderValue::from_static("deflate, gzip"));
        headers.insert("Connection", header::HeaderValue::from_static("close"));

        let client = Client::builder()
            .connect_timeout(Duration::from_millis(cfg.timeout_ms / 2))
            .default_headers(headers)
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()?;

        Ok(WeatherClient {
            client,
            url_template: cfg.weather_url.clone(),
            units: cfg.units,
            lang: cfg.language(),
            weather_backgrounds: cfg.show_background && cfg.background_mode == BackgroundMode::Weather,
            location,
            report: WeatherReport::default(),
        })
    }

    pub fn location(&self) -> &LocationSpec {
        &self.location
    }

    pub fn set_location(&mut self, location: LocationSpec) {
        info!("Weather location set to {}", location.name);
        self.location = location;
    }

    fn url(&self) -> String {
        self.url_template
            .replace("{query}", &self.location.query)
            .replace("{units}", self.units.code())
            .replace("{lang}", self.lang.code())
    }

    /// Fetch and parse. Blocks the render loop for at most the
    /// configured timeout; callers absorb the error into a counter.
    pub async fn refresh(&mut self) -> Result<(), WeatherApiError> {
        info!("Fetching weather for {}...", self.location.name);
        let body = self.fetch_body().await?;
        self.apply_payload(&body, &Local::now().format("%H:%M").to_string())?;
        info!("Weather data fetched successfully.");
        Ok(())
    }

    async fn fetch_body(&self) -> Result<String, WeatherApiError> {
        let response = self.client.get(self.url()).send().await?;
        let raw = response.error_for_status()?.bytes().await?;

        // Try gzip first, fall back to plain text.
        let mut decoder = GzDecoder::new(&raw[..]);
        let mut decoded = String::new();
        Ok(match decoder.read_to_string(&mut decoded) {
            Ok(_) => decoded,
            Err(_) => String::from_utf8_lossy(&raw).to_string(),
        })
    }

    /// Parse a provider payload into the report. Split from `refresh`
    /// so parsing is exercised without the network.
    pub fn apply_payload(&mut self, body: &str, now_hhmm: &str) -> Result<(), WeatherApiError> {
        let v: Value = serde_json::from_str(body)?;

        let cc = v.get("current").ok_or(WeatherApiError::MissingData("current"))?;
        let daily = v
            .get("daily")
            .and_then(|d| d.as_array())
            .ok_or(WeatherApiError::MissingData("daily"))?;
        if daily.is_empty() {
            return Err(WeatherApiError::MissingData("daily[0]"));
        }
        let tz_offset = v["timezone_offset"].as_i64().unwrap_or(0);
        let cc_dt = cc["dt"].as_i64().unwrap_or(0);

        let temp_f = cc["temp"].as_f64().unwrap_or(0.0);
        let weather0 = &cc["weather"][0];
        let id = weather0["id"].as_i64().unwrap_or(0);

        let sunrise = hhmm_at_offset(cc["sunrise"].as_i64().unwrap_or(0), tz_offset);
        let sunset = hhmm_at_offset(cc["sunset"].as_i64().unwrap_or(0), tz_offset);
        // Lexicographic compare works on zero-padded HH:MM.
        let night_time = sunset.as_str() <= now_hhmm || sunrise.as_str() > now_hhmm;

        let mut icon = icon_for_id(id).to_string();
        let mut background_code = icon.clone();
        if self.weather_backgrounds {
            if night_time {
                icon = night_variant(&icon).to_string();
                background_code = icon.clone();
            } else if icon == "clear_day" {
                if temp_f >= temp_high(self.units) {
                    icon = "hot".to_string();
                    background_code = "hot".to_string();
                } else if temp_f <= temp_low(self.units) {
                    background_code = "cold".to_string();
                }
            }
        } else if night_time {
            icon = night_variant(&icon).to_string();
        }

        let current = CurrentConditions {
            temp: format!("{}", temp_f as i64),
            feels_like: format!("{}{}", cc["feels_like"].as_f64().unwrap_or(0.0) as i64, DEGREE_SIGN),
            icon,
            condition: capitalize(weather0["description"].as_str().unwrap_or("")),
            wind_speed: cc["wind_speed"].as_f64().unwrap_or(0.0) * wind_scale(self.units),
            wind_dir: compass_point(cc["wind_deg"].as_f64().unwrap_or(0.0)),
            pressure: format!(
                "{:.2}",
                cc["pressure"].as_f64().unwrap_or(0.0) * baro_scale(self.units)
            ),
            humidity: format!("{}", cc["humidity"].as_i64().unwrap_or(0)),
            uvi: cc["uvi"].as_f64().unwrap_or(0.0),
            moon: moon_phase_icon(daily[0]["moon_phase"].as_f64().unwrap_or(0.0)),
        };

        self.report.alert = self.parse_alert(&v, cc_dt, tz_offset, &daily[0]);
        self.report.daily = parse_daily(daily, tz_offset);
        self.report.hourly = parse_hourly(&v, cc_dt, tz_offset);

        self.report.current = current;
        self.report.sunrise = sunrise;
        self.report.sunset = sunset;
        self.report.night_time = night_time;
        self.report.background_code = background_code;
        self.report.tz_offset_secs = tz_offset;
        self.report.last_updated = now_hhmm.to_string();
        Ok(())
    }

    /// Provider alert if one is still active, otherwise an alert derived
    /// from today's forecast (high wind, then extreme UV).
    fn parse_alert(&self, v: &Value, cc_dt: i64, tz_offset: i64, today: &Value) -> Option<AlertInfo> {
        if let Some(alerts) = v.get("alerts").and_then(|a| a.as_array()) {
            if let Some(first) = alerts.first() {
                if first["end"].as_i64().unwrap_or(0) > cc_dt {
                    return Some(AlertInfo {
                        start_hhmm: hhmm_at_offset(first["start"].as_i64().unwrap_or(0), tz_offset),
                        end_hhmm: hhmm_at_offset(first["end"].as_i64().unwrap_or(0), tz_offset),
                        event: first["event"].as_str().unwrap_or("").to_string(),
                    });
                }
            }
        }

        let wind = today["wind_speed"].as_f64().unwrap_or(0.0) * wind_scale(self.units);
        if wind >= wind_high(self.units) {
            return Some(AlertInfo {
                start_hhmm: String::new(),
                end_hhmm: String::new(),
                event: format!(
                    "{} - {:.0} {}",
                    phrase(self.lang, Phrase::TodayHighWind),
                    wind,
                    wind_speed_label(self.units)
                ),
            });
        }

        let uvi = today["uvi"].as_f64().unwrap_or(0.0);
        if uvi >= UVI_HIGH {
            return Some(AlertInfo {
                start_hhmm: String::new(),
                end_hhmm: String::new(),
                event: format!(
                    "{} {} - {}",
                    phrase(self.lang, Phrase::TodayUvIndex),
                    phrase(self.lang, uvi_level(uvi)),
                    uvi
                ),
            });
        }
        None
    }

    /// Content signature over the fields that matter for redraw. Equal
    /// signatures mean the panels would repaint identical pixels.
    pub fn signature(&self) -> String {
        let c = &self.report.current;
        format!(
            "{}{}{}{}{}{}{}{}",
            c.temp, c.feels_like, c.icon, c.condition, c.wind_speed, c.wind_dir, c.pressure, c.humidity
        )
    }
}

fn parse_daily(daily: &[Value], tz_offset: i64) -> Vec<DailyForecast> {
    let today = Local::now().format("%y%m%d").to_string();
    let mut out = Vec::with_capacity(DAILY_SLOTS);
    for day in daily.iter().take(8) {
        if out.len() >= DAILY_SLOTS {
            break;
        }
        let dt = day["dt"].as_i64().unwrap_or(0);
        if yymmdd_at_offset(dt, 0) < today {
            continue; // already past
        }
        out.push(DailyForecast {
            day_label: day_label_at_offset(dt, tz_offset),
            icon: icon_for_id(day["weather"][0]["id"].as_i64().unwrap_or(0)).to_string(),
            rain_pct: ((day["pop"].as_f64().unwrap_or(0.0) * 100.0 / 5.0).round() as i64) * 5,
            temp_max: format!("{}{}", day["temp"]["max"].as_f64().unwrap_or(0.0) as i64, DEGREE_SIGN),
            temp_min: format!("{}{}", day["temp"]["min"].as_f64().unwrap_or(0.0) as i64, DEGREE_SIGN),
        });
    }
    out
}

fn parse_hourly(v: &Value, cc_dt: i64, tz_offset: i64) -> Vec<HourlyForecast> {
    let mut out = Vec::with_capacity(HOURLY_SLOTS);
    if let Some(hours) = v.get("hourly").and_then(|h| h.as_array()) {
        for hour in hours.iter().take(48) {
            if out.len() >= HOURLY_SLOTS {
                break;
            }
            let dt = hour["dt"].as_i64().unwrap_or(0);
            if dt <= cc_dt {
                continue;
            }
            let mut icon = icon_for_id(hour["weather"][0]["id"].as_i64().unwrap_or(0)).to_string();
            if hour["weather"][0]["icon"].as_str().unwrap_or("").ends_with('n') {
                icon = night_variant(&icon).to_string();
            }
            out.push(HourlyForecast {
                hour_label: hhmm_at_offset(dt, tz_offset),
                temp: format!("{}{}", hour["temp"].as_f64().unwrap_or(0.0) as i64, DEGREE_SIGN),
                icon,
            });
        }
    }
    out
}

/// Wind bearing in degrees to a 16-point compass label.
pub fn compass_point(deg: f64) -> &'static str {
    let mut d16 = ((deg / 22.5) + 0.5) as usize;
    d16 %= 16;
    COMPASS_POINTS[d16]
}

/// Provider condition id to icon code. Ids group by hundreds: 2xx
/// thunder, 3xx drizzle, 5xx rain, 6xx snow, 7xx atmosphere, 800 clear,
/// 80x clouds.
pub fn icon_for_id(id: i64) -> &'static str {
    match id {
        200..=232 => "thunderstorm",
        300..=321 => "drizzle",
        500..=501 => "rain",
        502..=504 => "heavy_rain",
        511 => "freezing_rain",
        520..=531 => "showers",
        600..=601 => "snow",
        602 => "heavy_snow",
        611..=616 => "sleet",
        620..=622 => "flurries",
        701..=771 => "fog",
        781 => "tornado",
        800 => "clear_day",
        801 => "mostly_clear_day",
        802 => "partly_cloudy_day",
        803 => "mostly_cloudy_day",
        804 => "cloudy",
        _ => NA_ICON,
    }
}

/// Night counterpart of a day icon; codes without a day/night split
/// pass through unchanged.
pub fn night_variant(code: &str) -> String {
    match code {
        "clear_day" => "clear_night".to_string(),
        "hot" => "clear_night".to_string(),
        _ if code.ends_with("_day") => format!("{}_night", &code[..code.len() - 4]),
        _ => code.to_string(),
    }
}

/// Provider moon phase (0 and 1 new moon, 0.5 full) to icon code.
pub fn moon_phase_icon(p: f64) -> &'static str {
    if p <= 0.01 || p >= 0.99 {
        "new_moon"
    } else if p < 0.24 {
        "waxing_crescent"
    } else if p <= 0.26 {
        "first_quarter"
    } else if p < 0.49 {
        "waxing_gibbous"
    } else if p <= 0.51 {
        "full_moon"
    } else if p < 0.74 {
        "waning_gibbous"
    } else if p <= 0.76 {
        "last_quarter"
    } else {
        "waning_crescent"
    }
}

fn shifted(epoch: i64, tz_offset: i64) -> DateTime<chrono::Utc> {
    DateTime::from_timestamp(epoch + tz_offset, 0).unwrap_or_default()
}

fn hhmm_at_offset(epoch: i64, tz_offset: i64) -> String {
    shifted(epoch, tz_offset).format("%H:%M").to_string()
}

fn day_label_at_offset(epoch: i64, tz_offset: i64) -> String {
    shifted(epoch, tz_offset).format("%A, %d").to_string()
}

fn yymmdd_at_offset(epoch: i64, tz_offset: i64) -> String {
    shifted(epoch, tz_offset).format("%y%m%d").to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client() -> WeatherClient {
        WeatherClient::new(&Config::default()).unwrap()
    }

    /// Payload at UTC-4 on 2033-05-18 (far enough ahead that daily
    /// entries are never skipped as past days): local noon current
    /// sample, sunrise 06:30, sunset 20:00 local.
    fn payload(temp: f64, wind_deg: f64) -> String {
        serde_json::json!({
            "timezone_offset": -14400,
            "current": {
                "dt": 2000044800i64,
                "temp": temp,
                "feels_like": temp - 2.0,
                "pressure": 1015.0,
                "humidity": 48,
                "uvi": 3.0,
                "wind_speed": 8.0,
                "wind_deg": wind_deg,
                "sunrise": 2000025000i64,
                "sunset": 2000073600i64,
                "weather": [{"id": 800, "description": "clear sky", "icon": "01d"}]
            },
            "daily": [
                {
                    "dt": 2000044800i64,
                    "moon_phase": 0.5,
                    "pop": 0.42,
                    "uvi": 3.0,
                    "wind_speed": 2.0,
                    "temp": {"max": 71.0, "min": 55.0},
                    "weather": [{"id": 802, "icon": "02d"}]
                },
                {
                    "dt": 2000131200i64,
                    "moon_phase": 0.55,
                    "pop": 0.8,
                    "uvi": 2.0,
                    "wind_speed": 3.0,
                    "temp": {"max": 68.0, "min": 51.0},
                    "weather": [{"id": 500, "icon": "10d"}]
                }
            ],
            "hourly": [
                {"dt": 2000048400i64, "temp": 66.0, "weather": [{"id": 800, "icon": "01d"}]},
                {"dt": 2000052000i64, "temp": 64.0, "weather": [{"id": 800, "icon": "01n"}]}
            ]
        })
        .to_string()
    }

    #[test]
    fn test_parse_current_conditions() {
        let mut c = client();
        c.apply_payload(&payload(66.4, 90.0), "12:00").unwrap();
        let cur = &c.report.current;
        assert_eq!(cur.temp, "66");
        assert_eq!(cur.feels_like, format!("64{}", DEGREE_SIGN));
        assert_eq!(cur.icon, "clear_day");
        assert_eq!(cur.condition, "Clear sky");
        assert_eq!(cur.wind_dir, "E");
        assert_eq!(cur.moon, "full_moon");
        assert!(!c.report.night_time);
        assert_eq!(c.report.last_updated, "12:00");
    }

    #[test]
    fn test_night_detection_swaps_icons() {
        let mut c = client();
        // sunset in the payload lands at 20:00 local; 23:30 is night
        c.apply_payload(&payload(60.0, 0.0), "23:30").unwrap();
        assert!(c.report.night_time);
        assert_eq!(c.report.current.icon, "clear_night");
        assert_eq!(c.report.background_code, "clear_night");
    }

    #[test]
    fn test_hot_override_on_clear_day() {
        let mut c = client();
        c.apply_payload(&payload(95.0, 0.0), "12:00").unwrap();
        assert_eq!(c.report.current.icon, "hot");
        assert_eq!(c.report.background_code, "hot");
    }

    #[test]
    fn test_signature_stable_for_identical_payloads() {
        let mut c = client();
        c.apply_payload(&payload(66.0, 180.0), "12:00").unwrap();
        let first = c.signature();
        c.apply_payload(&payload(66.0, 180.0), "12:05").unwrap();
        assert_eq!(first, c.signature(), "unchanged upstream data must not change the signature");
        c.apply_payload(&payload(67.0, 180.0), "12:10").unwrap();
        assert_ne!(first, c.signature());
    }

    #[test]
    fn test_daily_rain_rounding_and_slots() {
        let mut c = client();
        c.apply_payload(&payload(66.0, 0.0), "12:00").unwrap();
        assert_eq!(c.report.daily.len(), 2);
        assert_eq!(c.report.daily[0].rain_pct, 40); // 0.42 -> nearest 5%
        assert_eq!(c.report.daily[1].rain_pct, 80);
        assert_eq!(c.report.daily[1].icon, "rain");
    }

    #[test]
    fn test_hourly_night_tag() {
        let mut c = client();
        c.apply_payload(&payload(66.0, 0.0), "12:00").unwrap();
        assert_eq!(c.report.hourly.len(), 2);
        assert_eq!(c.report.hourly[0].icon, "clear_day");
        assert_eq!(c.report.hourly[1].icon, "clear_night");
    }

    #[test]
    fn test_missing_current_is_parse_error() {
        let mut c = client();
        let err = c.apply_payload("{\"daily\": []}", "12:00").unwrap_err();
        assert!(matches!(err, WeatherApiError::MissingData(_)));
    }

    #[test]
    fn test_derived_uv_alert() {
        let mut c = client();
        let mut v: Value = serde_json::from_str(&payload(66.0, 0.0)).unwrap();
        v["daily"][0]["uvi"] = serde_json::json!(9.5);
        c.apply_payload(&v.to_string(), "12:00").unwrap();
        let alert = c.report.alert.as_ref().expect("uv alert");
        assert!(alert.event.contains("UV"));
        assert!(alert.start_hhmm.is_empty());
    }

    #[test]
    fn test_provider_alert_wins_when_active() {
        let mut c = client();
        let mut v: Value = serde_json::from_str(&payload(66.0, 0.0)).unwrap();
        v["alerts"] = serde_json::json!([{
            "start": 2000040000i64,
            "end": 2000060000i64,
            "event": "Gale warning"
        }]);
        c.apply_payload(&v.to_string(), "12:00").unwrap();
        let alert = c.report.alert.as_ref().unwrap();
        assert_eq!(alert.event, "Gale warning");
        assert!(!alert.start_hhmm.is_empty());
    }

    #[test]
    fn test_compass_points() {
        assert_eq!(compass_point(0.0), "N");
        assert_eq!(compass_point(90.0), "E");
        assert_eq!(compass_point(225.0), "SW");
        assert_eq!(compass_point(359.0), "N");
    }

    #[test]
    fn test_night_variant_mapping() {
        assert_eq!(night_variant("clear_day"), "clear_night");
        assert_eq!(night_variant("partly_cloudy_day"), "partly_cloudy_night");
        assert_eq!(night_variant("rain"), "rain");
    }

    #[test]
    fn test_moon_phases() {
        assert_eq!(moon_phase_icon(0.0), "new_moon");
        assert_eq!(moon_phase_icon(0.25), "first_quarter");
        assert_eq!(moon_phase_icon(0.5), "full_moon");
        assert_eq!(moon_phase_icon(0.75), "last_quarter");
        assert_eq!(moon_phase_icon(0.9), "waning_crescent");
    }
}
