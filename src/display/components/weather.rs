/*
 *  display/components/weather.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Current conditions block and the lower forecast strip (daily
 *  sub-windows plus the hourly row).
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

use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::primitives::Rectangle;

use super::RenderCtx;
use crate::constants::{
    baro_label, wind_speed_label, DAILY_SLOTS, DEGREE_SIGN, HOURLY_SLOTS, RAIN_HIGH_PCT,
    RAIN_WARN_PCT,
};
use crate::display::assets::{AssetKind, AssetStore};
use crate::display::error::DisplayError;
use crate::display::regions::PanelRegion;
use crate::display::surface::{FontId, Surface};
use crate::lang::{phrase, uvi_level, Phrase};
use crate::weather::WeatherReport;

pub struct CurrentConditionsPanel {
    pub region: PanelRegion,
}

impl CurrentConditionsPanel {
    pub fn new() -> Self {
        Self { region: PanelRegion::new("current") }
    }

    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        assets: &mut AssetStore,
        report: &WeatherReport,
    ) -> Result<Rectangle, DisplayError> {
        self.region.relocate(ctx.layout.current);
        if ctx.show_background {
            self.region.prepare(surface)?;
        } else {
            surface.fill_rect(self.region.rect, ctx.palette.background)?;
        }

        let rect = self.region.rect;
        let c = &report.current;
        let ygap = ctx.layout.ymargin * 3;

        // Icon and temperature side by side, centered as a pair.
        let icon_scale = (rect.size.height * 2 / 5).max(16);
        let temp_size = surface.measure_text(&c.temp, FontId::Temp);
        let deg_size = surface.measure_text(DEGREE_SIGN, FontId::Temp);
        let pair = icon_scale as i32 + ctx.layout.xmargin + (temp_size.width + deg_size.width) as i32;
        let icon_x = rect.top_left.x + (rect.size.width as i32 - pair) / 2;
        let mut y = rect.top_left.y + ygap;

        match assets.get(
            surface,
            AssetKind::Icon,
            &c.icon,
            Some(Size::new(icon_scale, icon_scale)),
        ) {
            Some(icon) => surface.blit(&icon, Point::new(icon_x, y))?,
            // Total asset failure: a blank block instead of a crash.
            None => surface.fill_rect(
                Rectangle::new(Point::new(icon_x, y), Size::new(icon_scale, icon_scale)),
                ctx.palette.background,
            )?,
        }

        let temp_x = icon_x + icon_scale as i32 + ctx.layout.xmargin;
        surface.draw_text(&c.temp, FontId::Temp, ctx.palette.weather, Point::new(temp_x, y))?;
        surface.draw_text(
            DEGREE_SIGN,
            FontId::Temp,
            ctx.palette.weather,
            Point::new(temp_x + temp_size.width as i32, y),
        )?;

        // Condition text, then the "Last Updated" stamp, centered.
        y += icon_scale.max(temp_size.height) as i32 + ctx.layout.ymargin;
        y += self.centered_line(surface, ctx, rect, &c.condition, FontId::TempText, y)?;

        let updated = format!("{} {}", phrase(ctx.lang, Phrase::LastUpdated), report.last_updated);
        y += self.centered_line(surface, ctx, rect, &updated, FontId::Condition, y)?;
        y += ctx.layout.ymargin;

        // Two detail lines mirroring the classic layout.
        let line1 = format!(
            "{} {}   {} {:.0} {}   {} {}",
            phrase(ctx.lang, Phrase::Windchill),
            c.feels_like,
            phrase(ctx.lang, Phrase::Windspeed),
            c.wind_speed,
            wind_speed_label(ctx.units),
            phrase(ctx.lang, Phrase::Direction),
            c.wind_dir,
        );
        y += self.centered_line(surface, ctx, rect, &line1, FontId::Condition, y)?;

        let line2 = format!(
            "{} {}{}   {} {}%   UVI {}",
            phrase(ctx.lang, Phrase::Barometer),
            c.pressure,
            baro_label(ctx.units),
            phrase(ctx.lang, Phrase::Humidity),
            c.humidity,
            phrase(ctx.lang, uvi_level(c.uvi)),
        );
        self.centered_line(surface, ctx, rect, &line2, FontId::Condition, y)?;

        Ok(rect)
    }

    fn centered_line(
        &self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        rect: Rectangle,
        text: &str,
        font: FontId,
        y: i32,
    ) -> Result<i32, DisplayError> {
        let size = surface.measure_text(text, font);
        let x = rect.top_left.x + (rect.size.width as i32 - size.width as i32) / 2;
        surface.draw_text(text, font, ctx.palette.weather, Point::new(x, y))?;
        Ok(size.height as i32 * 5 / 4)
    }
}

/// Lower strip: daily forecast sub-windows with an hourly row beneath.
pub struct ForecastPanel {
    pub region: PanelRegion,
}

impl ForecastPanel {
    pub fn new() -> Self {
        Self { region: PanelRegion::new("forecast") }
    }

    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        assets: &mut AssetStore,
        report: &WeatherReport,
        dim: bool,
    ) -> Result<Rectangle, DisplayError> {
        self.region.relocate(ctx.layout.lower);
        if ctx.show_background {
            self.region.prepare(surface)?;
        } else {
            surface.fill_rect(self.region.rect, ctx.palette.background)?;
        }
        if dim && ctx.show_background {
            surface.dim_rect(self.region.rect, 64)?;
        }

        let rect = self.region.rect;
        let sub_w = rect.size.width as i32 / DAILY_SLOTS as i32;
        let icon_scale = (rect.size.height / 3).max(16);

        for (i, day) in report.daily.iter().take(DAILY_SLOTS).enumerate() {
            let x = rect.top_left.x + sub_w * i as i32 + ctx.layout.xmargin;
            let mut y = rect.top_left.y + ctx.layout.ymargin;

            let label_size =
                surface.draw_text(&day.day_label, FontId::Forecast, ctx.palette.weather, Point::new(x, y))?;
            y += label_size.height as i32;

            match assets.get(
                surface,
                AssetKind::Icon,
                &day.icon,
                Some(Size::new(icon_scale, icon_scale)),
            ) {
                Some(icon) => surface.blit(&icon, Point::new(x, y))?,
                None => surface.fill_rect(
                    Rectangle::new(Point::new(x, y), Size::new(icon_scale, icon_scale)),
                    ctx.palette.background,
                )?,
            }

            let tx = x + icon_scale as i32 + ctx.layout.xmargin;
            let max_size =
                surface.draw_text(&day.temp_max, FontId::Forecast, ctx.palette.weather, Point::new(tx, y))?;
            surface.draw_text(
                &day.temp_min,
                FontId::ForecastSmall,
                ctx.palette.weather,
                Point::new(tx + max_size.width as i32 + ctx.layout.xmargin, y + max_size.height as i32 / 3),
            )?;

            // Rain chance, colored by severity.
            let rain_color = rain_color(ctx, day.rain_pct);
            let rain_t = format!("{}", day.rain_pct);
            let y_rain = y + max_size.height as i32;
            let rain_size =
                surface.draw_text(&rain_t, FontId::Rain, rain_color, Point::new(tx, y_rain))?;
            surface.draw_text(
                "%",
                FontId::ForecastSmall,
                rain_color,
                Point::new(tx + rain_size.width as i32, y_rain + rain_size.height as i32 / 3),
            )?;
        }

        // Hourly row along the bottom of the strip.
        let hour_w = rect.size.width as i32 / HOURLY_SLOTS as i32;
        let hour_icon = (rect.size.height / 5).max(12);
        let hy = rect.top_left.y + rect.size.height as i32 * 60 / 100;
        for (i, hour) in report.hourly.iter().take(HOURLY_SLOTS).enumerate() {
            let center = rect.top_left.x + hour_w * i as i32 + hour_w / 2;

            let temp_size = surface.measure_text(&hour.temp, FontId::ForecastSmall);
            surface.draw_text(
                &hour.temp,
                FontId::ForecastSmall,
                ctx.palette.weather,
                Point::new(center - temp_size.width as i32 / 2, hy),
            )?;

            let iy = hy + temp_size.height as i32;
            match assets.get(
                surface,
                AssetKind::Icon,
                &hour.icon,
                Some(Size::new(hour_icon, hour_icon)),
            ) {
                Some(icon) => surface.blit(&icon, Point::new(center - hour_icon as i32 / 2, iy))?,
                None => {}
            }

            // Hour stamps on alternating slots keep the row legible.
            if i % 2 == 0 {
                let color = if hour.hour_label.starts_with("00") {
                    ctx.palette.highlight
                } else {
                    ctx.palette.weather
                };
                let label_size = surface.measure_text(&hour.hour_label, FontId::ForecastSmall);
                surface.draw_text(
                    &hour.hour_label,
                    FontId::ForecastSmall,
                    color,
                    Point::new(center - label_size.width as i32 / 2, iy + hour_icon as i32 + ctx.layout.ymargin),
                )?;
            }
        }

        Ok(rect)
    }
}

fn rain_color(ctx: &RenderCtx<'_>, pct: i64) -> Rgb888 {
    if pct >= RAIN_HIGH_PCT {
        ctx.palette.rain_high
    } else if pct >= RAIN_WARN_PCT {
        ctx.palette.rain_warn
    } else {
        ctx.palette.highlight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::display::color::Palette;
    use crate::display::layout::Layout;
    use crate::display::surface::MockSurface;
    use crate::lang::Lang;
    use crate::weather::{CurrentConditions, DailyForecast, HourlyForecast};

    fn report() -> WeatherReport {
        WeatherReport {
            current: CurrentConditions {
                temp: "66".to_string(),
                feels_like: "64\u{00b0}".to_string(),
                icon: "clear_day".to_string(),
                condition: "Clear sky".to_string(),
                wind_speed: 8.0,
                wind_dir: "E",
                pressure: "29.97".to_string(),
                humidity: "48".to_string(),
                uvi: 3.0,
                moon: "full_moon",
            },
            daily: vec![
                DailyForecast {
                    day_label: "Monday, 04".to_string(),
                    icon: "rain".to_string(),
                    rain_pct: 80,
                    temp_max: "71\u{00b0}".to_string(),
                    temp_min: "55\u{00b0}".to_string(),
                },
                DailyForecast {
                    day_label: "Tuesday, 05".to_string(),
                    icon: "cloudy".to_string(),
                    rain_pct: 10,
                    temp_max: "68\u{00b0}".to_string(),
                    temp_min: "51\u{00b0}".to_string(),
                },
            ],
            hourly: vec![HourlyForecast {
                hour_label: "14:00".to_string(),
                temp: "66\u{00b0}".to_string(),
                icon: "clear_day".to_string(),
            }],
            last_updated: "12:00".to_string(),
            ..Default::default()
        }
    }

    fn ctx<'a>(palette: &'a Palette, layout: &'a Layout) -> RenderCtx<'a> {
        RenderCtx {
            palette,
            layout,
            lang: Lang::English,
            units: Config::default().units,
            show_background: true,
        }
    }

    #[test]
    fn test_current_conditions_rect_and_fallback_icon() {
        let mut surface = MockSurface::new(1024, 600);
        surface.missing_assets.push("/assets/icons/mono/clear_day.png".into());
        surface.missing_assets.push("/assets/icons/mono/na.png".into());
        let layout = Layout::compute(Size::new(1024, 600));
        let palette = Palette::default();
        let ctx = ctx(&palette, &layout);
        let mut assets = AssetStore::new("/assets".into(), "mono");
        let mut panel = CurrentConditionsPanel::new();

        let rect = panel.render(&mut surface, &ctx, &mut assets, &report()).unwrap();
        assert_eq!(rect, layout.current);
        // icon and its fallback both missing: a blank rect was painted
        assert!(surface.fills.iter().any(|(r, _)| r.top_left.y >= layout.current.top_left.y));
        // temperature and detail lines still drawn
        assert!(surface.texts.iter().any(|(t, _, _)| t == "66"));
        assert!(surface.texts.iter().any(|(t, _, _)| t.contains("Windchill")));
    }

    #[test]
    fn test_forecast_draws_all_slots_and_dims() {
        let mut surface = MockSurface::new(1024, 600);
        let layout = Layout::compute(Size::new(1024, 600));
        let palette = Palette::default();
        let ctx = ctx(&palette, &layout);
        let mut assets = AssetStore::new("/assets".into(), "mono");
        let mut panel = ForecastPanel::new();

        let rect = panel
            .render(&mut surface, &ctx, &mut assets, &report(), true)
            .unwrap();
        assert_eq!(rect, layout.lower);
        assert_eq!(surface.dims, vec![layout.lower]);
        assert!(surface.texts.iter().any(|(t, _, _)| t == "Monday, 04"));
        assert!(surface.texts.iter().any(|(t, _, _)| t == "80"));
        assert!(surface.texts.iter().any(|(t, _, _)| t == "14:00"));
    }
}
