/*
 *  display/components/header.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Header band: calendar block on the left, source by-line and
 *  location centered, moon phase on the right. Repaints at the top of
 *  the hour and on full redraws.
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

use chrono::Local;
use embedded_graphics::geometry::{Point, Size};
use embedded_graphics::primitives::Rectangle;

use super::RenderCtx;
use crate::display::assets::{AssetKind, AssetStore};
use crate::display::error::DisplayError;
use crate::display::regions::PanelRegion;
use crate::display::surface::{FontId, Surface};

pub struct HeaderPanel {
    pub region: PanelRegion,
}

impl HeaderPanel {
    pub fn new() -> Self {
        Self { region: PanelRegion::new("header") }
    }

    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        assets: &mut AssetStore,
        location_name: &str,
        source_name: &str,
        moon: Option<&str>,
    ) -> Result<Rectangle, DisplayError> {
        self.region.relocate(ctx.layout.header);
        if ctx.show_background {
            self.region.prepare(surface)?;
        } else {
            surface.fill_rect(self.region.rect, ctx.palette.background)?;
        }

        let rect = self.region.rect;
        let xgap = ctx.layout.xmargin * 3;
        let ygap = ctx.layout.ymargin * 3;

        // Calendar block: big day numeral, weekday and month beside it.
        let now = Local::now();
        let day_t = now.format("%d").to_string();
        let weekday_t = now.format("%A").to_string();
        let month_t = now.format("%B %Y").to_string();

        let day_size = surface.draw_text(
            &day_t,
            FontId::Calendar,
            ctx.palette.clock,
            Point::new(rect.top_left.x + xgap, rect.top_left.y),
        )?;
        let side_x = rect.top_left.x + xgap + day_size.width as i32 + ctx.layout.xmargin;
        let wd_size = surface.draw_text(
            &weekday_t,
            FontId::WeekDay,
            ctx.palette.clock,
            Point::new(side_x, rect.top_left.y + ygap),
        )?;
        surface.draw_text(
            &month_t,
            FontId::WeekDay,
            ctx.palette.clock,
            Point::new(side_x, rect.top_left.y + ygap + wd_size.height as i32),
        )?;

        // By-line: "<source> | SkyDeck", two colors, centered.
        let by = env!("CARGO_PKG_NAME");
        let source_size = surface.measure_text(source_name, FontId::By);
        let by_text = format!(" | {}", by);
        let by_size = surface.measure_text(&by_text, FontId::By);
        let total = (source_size.width + by_size.width) as i32;
        let x = rect.top_left.x + (rect.size.width as i32 - total) / 2;
        surface.draw_text(
            source_name,
            FontId::By,
            ctx.palette.byline,
            Point::new(x, rect.top_left.y + ctx.layout.ymargin),
        )?;
        surface.draw_text(
            &by_text,
            FontId::By,
            ctx.palette.highlight,
            Point::new(x + source_size.width as i32, rect.top_left.y + ctx.layout.ymargin),
        )?;

        // Location, centered below the by-line.
        let loc_size = surface.measure_text(location_name, FontId::City);
        surface.draw_text(
            location_name,
            FontId::City,
            ctx.palette.highlight,
            Point::new(
                rect.top_left.x + (rect.size.width as i32 - loc_size.width as i32) / 2,
                rect.top_left.y + ygap * 5 / 2,
            ),
        )?;

        // Moon phase in the top-right corner when we have one.
        if let Some(code) = moon {
            let scale = (rect.size.height / 3).max(8);
            let at = Point::new(
                rect.top_left.x + rect.size.width as i32 - scale as i32 - xgap,
                rect.top_left.y + ygap,
            );
            match assets.get(surface, AssetKind::Moon, code, Some(Size::new(scale, scale))) {
                Some(icon) => surface.blit(&icon, at)?,
                None => surface.fill_rect(
                    Rectangle::new(at, Size::new(scale, scale)),
                    ctx.palette.background,
                )?,
            }
        }

        Ok(rect)
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

    #[test]
    fn test_header_draws_within_band_and_returns_rect() {
        let mut surface = MockSurface::new(1024, 600);
        let layout = Layout::compute(Size::new(1024, 600));
        let palette = Palette::default();
        let cfg = Config::default();
        let ctx = RenderCtx {
            palette: &palette,
            layout: &layout,
            lang: Lang::English,
            units: cfg.units,
            show_background: true,
        };
        let mut assets = AssetStore::new("/assets".into(), "mono");
        let mut header = HeaderPanel::new();
        let rect = header
            .render(&mut surface, &ctx, &mut assets, "Madrid", "OpenWeatherMap", Some("full_moon"))
            .unwrap();
        assert_eq!(rect, layout.header);
        // background capture happened exactly once
        assert_eq!(surface.captures, vec![layout.header]);
        // calendar, weekday, month, by-line x2, location drawn
        assert!(surface.texts.len() >= 6);
        // moon icon resolved through the asset store
        assert!(surface.loaded.iter().any(|p| p.ends_with("moon/full_moon.png")));
    }
}
