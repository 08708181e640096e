/*
 *  display/color.rs
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

use embedded_graphics::pixelcolor::Rgb888;
use log::warn;

use crate::config::PaletteConfig;

/// Resolved drawing colors. Built-ins match the classic dark theme;
/// any entry can be overridden from the palette section of the config.
#[derive(Debug, Clone)]
pub struct Palette {
    pub background: Rgb888,
    pub news_background: Rgb888,
    pub clock: Rgb888,
    pub clock_dim: Rgb888,
    pub highlight: Rgb888,
    pub weather: Rgb888,
    pub news: Rgb888,
    pub rain_warn: Rgb888,
    pub rain_high: Rgb888,
    pub alert: Rgb888,
    pub byline: Rgb888,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb888::new(0, 0, 0),
            news_background: Rgb888::new(16, 16, 48),
            clock: Rgb888::new(255, 255, 255),
            clock_dim: Rgb888::new(72, 72, 72),
            highlight: Rgb888::new(255, 165, 0),
            weather: Rgb888::new(220, 220, 220),
            news: Rgb888::new(255, 255, 160),
            rain_warn: Rgb888::new(255, 200, 60),
            rain_high: Rgb888::new(255, 80, 80),
            alert: Rgb888::new(255, 64, 64),
            byline: Rgb888::new(120, 160, 220),
        }
    }
}

impl Palette {
    pub fn from_config(cfg: &PaletteConfig) -> Self {
        let mut p = Palette::default();
        apply(&mut p.background, &cfg.background);
        apply(&mut p.news_background, &cfg.news_background);
        apply(&mut p.clock, &cfg.clock);
        apply(&mut p.clock_dim, &cfg.clock_dim);
        apply(&mut p.highlight, &cfg.highlight);
        apply(&mut p.weather, &cfg.weather);
        apply(&mut p.news, &cfg.news);
        apply(&mut p.rain_warn, &cfg.rain_warn);
        apply(&mut p.rain_high, &cfg.rain_high);
        apply(&mut p.alert, &cfg.alert);
        apply(&mut p.byline, &cfg.byline);
        p
    }
}

fn apply(slot: &mut Rgb888, value: &Option<String>) {
    if let Some(s) = value {
        match parse_hex(s) {
            Some(c) => *slot = c,
            None => warn!("Ignoring malformed palette color '{}'", s),
        }
    }
}

/// "#rrggbb" (leading '#' optional) to Rgb888.
pub fn parse_hex(s: &str) -> Option<Rgb888> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb888::new(r, g, b))
}
