use serde::{Deserialize, Serialize};
use dirs_next::home_dir;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::lang::Lang;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl Units {
    /// Provider-facing query value.
    pub fn code(self) -> &'static str {
        match self {
            Units::Imperial => "imperial",
            Units::Metric => "metric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NewsMode {
    Off,
    #[default]
    Period,
    AlwaysOn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    /// Background artwork follows the current weather code.
    #[default]
    Weather,
    /// Fixed default artwork regardless of conditions.
    Fixed,
}

/// Feed payload shape for a news source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSchema {
    /// Provider-specific news-item XML (items carry `longTitle`).
    Provider,
    /// Generic RSS `<channel><item><title>`.
    Rss,
}

/// A selectable weather location: display name plus the provider query
/// fragment (e.g. "lat=40.41&lon=-3.70").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSpec {
    pub name: String,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsSourceSpec {
    pub name: String,
    pub url: String,
    pub schema: FeedSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    pub source_a: NewsSourceSpec,
    pub source_b: NewsSourceSpec,
    /// Swap to the other source after every update.
    #[serde(default)]
    pub alternate: bool,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            source_a: NewsSourceSpec {
                name: "RTVE".to_string(),
                url: "https://api.rtve.es/api/noticias.xml".to_string(),
                schema: FeedSchema::Provider,
            },
            source_b: NewsSourceSpec {
                name: "BBC".to_string(),
                url: "https://feeds.bbci.co.uk/news/rss.xml".to_string(),
                schema: FeedSchema::Rss,
            },
            alternate: false,
        }
    }
}

/// One world clock: city label and its offset from local time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldClockSpec {
    pub city: String,
    pub offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub fullscreen: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { width: 1024, height: 600, fullscreen: false }
    }
}

/// Optional palette overrides, "#rrggbb" strings. Anything absent keeps
/// the built-in color.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaletteConfig {
    pub background: Option<String>,
    pub news_background: Option<String>,
    pub clock: Option<String>,
    pub clock_dim: Option<String>,
    pub highlight: Option<String>,
    pub weather: Option<String>,
    pub news: Option<String>,
    pub rain_warn: Option<String>,
    pub rain_high: Option<String>,
    pub alert: Option<String>,
    pub byline: Option<String>,
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// UI language ("en" | "es"); also sent to the weather provider.
    pub lang: String,
    pub units: Units,
    /// Permanent clock-only dashboard (no weather panels at all).
    pub clock_mode: bool,
    pub news_mode: NewsMode,
    pub show_background: bool,
    pub background_mode: BackgroundMode,
    /// Darken weather backgrounds behind the forecast strip.
    pub dim_background: bool,
    /// Network timeout for weather/news fetches, milliseconds.
    pub timeout_ms: u64,
    /// Weather provider URL template; `{query}`, `{units}` and `{lang}`
    /// are substituted per request.
    pub weather_url: String,
    /// Provider display name for the header by-line.
    pub weather_source: String,
    /// Selectable locations; digit keys 1..N switch between them.
    pub locations: Vec<LocationSpec>,
    pub news: NewsConfig,
    pub time_zones: Vec<WorldClockSpec>,
    /// Coordinates for the sunrise/sunset seed before the first fetch.
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub assets_dir: PathBuf,
    pub icon_set: String,
    pub help_file: PathBuf,
    /// Route straight into the settings editor on the very first run.
    pub first_install: bool,
    pub display: DisplayConfig,
    pub palette: PaletteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            units: Units::default(),
            clock_mode: false,
            news_mode: NewsMode::default(),
            show_background: true,
            background_mode: BackgroundMode::default(),
            dim_background: true,
            timeout_ms: 3000,
            weather_url: "https://api.openweathermap.org/data/3.0/onecall?{query}&units={units}&lang={lang}"
                .to_string(),
            weather_source: "OpenWeatherMap".to_string(),
            locations: vec![LocationSpec {
                name: "Madrid".to_string(),
                query: "lat=40.4165&lon=-3.7026".to_string(),
            }],
            news: NewsConfig::default(),
            time_zones: vec![
                WorldClockSpec { city: "New York".to_string(), offset_minutes: -360 },
                WorldClockSpec { city: "London".to_string(), offset_minutes: -60 },
                WorldClockSpec { city: "Tokyo".to_string(), offset_minutes: 420 },
            ],
            latitude: None,
            longitude: None,
            assets_dir: PathBuf::from("./assets"),
            icon_set: "mono".to_string(),
            help_file: PathBuf::from("./assets/help.json"),
            first_install: false,
            display: DisplayConfig::default(),
            palette: PaletteConfig::default(),
        }
    }
}

impl Config {
    pub fn language(&self) -> Lang {
        Lang::from_code(&self.lang)
    }
}

/// Load configuration: explicit path, or search, or defaults.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(p) = explicit {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        let cfg = read_yaml(p)?;
        validate(&cfg)?;
        return Ok(cfg);
    }

    let cfg = match find_config_file() {
        Some(p) => read_yaml(&p)?,
        None => Config::default(),
    };
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/skydeck/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/skydeck/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/skydeck.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["skydeck.yaml", "config.yaml", "config/skydeck.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.locations.is_empty() {
        return Err(ConfigError::Validation("at least one location is required".into()));
    }
    if cfg.locations.len() > 9 {
        return Err(ConfigError::Validation("at most nine locations (digit keys 1-9)".into()));
    }
    if cfg.display.width == 0 || cfg.display.height == 0 {
        return Err(ConfigError::Validation("display width/height must be > 0".into()));
    }
    if !cfg.weather_url.contains("{query}") {
        return Err(ConfigError::Validation("weather_url must contain {query}".into()));
    }
    if cfg.timeout_ms == 0 || cfg.timeout_ms > 30_000 {
        return Err(ConfigError::Validation("timeout_ms must be in 1..=30000".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = Config::default();
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_partial_yaml_overlays_defaults() {
        let cfg: Config = serde_yaml::from_str(
            "lang: es\nclock_mode: true\nlocations:\n  - name: Bilbao\n    query: lat=43.26&lon=-2.93\n",
        )
        .unwrap();
        assert_eq!(cfg.lang, "es");
        assert!(cfg.clock_mode);
        assert_eq!(cfg.locations[0].name, "Bilbao");
        // untouched fields keep their defaults
        assert_eq!(cfg.units, Units::Imperial);
        assert_eq!(cfg.news_mode, NewsMode::Period);
    }

    #[test]
    fn test_validation_rejects_empty_locations() {
        let mut cfg = Config::default();
        cfg.locations.clear();
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_bad_url_template() {
        let mut cfg = Config::default();
        cfg.weather_url = "https://example.com/weather".to_string();
        assert!(matches!(validate(&cfg), Err(ConfigError::Validation(_))));
    }
}
