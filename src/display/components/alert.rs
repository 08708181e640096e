/*
 *  display/components/alert.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Alert banner above the forecast strip. Always prepares its region
 *  so a cleared alert erases the previous one.
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
use embedded_graphics::primitives::Rectangle;

use super::RenderCtx;
use crate::constants::ALERT_ICON;
use crate::display::assets::{AssetKind, AssetStore};
use crate::display::error::DisplayError;
use crate::display::regions::PanelRegion;
use crate::display::surface::{FontId, Surface};
use crate::weather::AlertInfo;

pub struct AlertPanel {
    pub region: PanelRegion,
}

impl AlertPanel {
    pub fn new() -> Self {
        Self { region: PanelRegion::new("alert") }
    }

    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        assets: &mut AssetStore,
        alert: Option<&AlertInfo>,
    ) -> Result<Rectangle, DisplayError> {
        self.region.relocate(ctx.layout.alert);
        if ctx.show_background {
            self.region.prepare(surface)?;
        } else {
            surface.fill_rect(self.region.rect, ctx.palette.background)?;
        }

        let rect = self.region.rect;
        let Some(alert) = alert else { return Ok(rect) };

        let scale = rect.size.height.saturating_sub(ctx.layout.ymargin as u32 * 2).max(8);
        let x = rect.top_left.x + ctx.layout.xmargin * 2;
        let y = rect.top_left.y + ctx.layout.ymargin;

        let mut text_x = x;
        if let Some(icon) = assets.get(
            surface,
            AssetKind::Alert,
            ALERT_ICON,
            Some(Size::new(scale, scale)),
        ) {
            surface.blit(&icon, Point::new(x, y))?;
            text_x += scale as i32 + ctx.layout.xmargin;
        }

        // Timed alerts carry a window prefix; derived ones are bare.
        let line = if alert.start_hhmm.is_empty() {
            alert.event.clone()
        } else {
            format!("{} - {}: {}", alert.start_hhmm, alert.end_hhmm, alert.event)
        };
        surface.draw_text(&line, FontId::Alert, ctx.palette.alert, Point::new(text_x, y))?;

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

    fn setup<'a>(palette: &'a Palette, layout: &'a Layout) -> RenderCtx<'a> {
        RenderCtx {
            palette,
            layout,
            lang: Lang::English,
            units: Config::default().units,
            show_background: true,
        }
    }

    #[test]
    fn test_timed_alert_includes_window() {
        let mut surface = MockSurface::new(1024, 600);
        let layout = Layout::compute(Size::new(1024, 600));
        let palette = Palette::default();
        let ctx = setup(&palette, &layout);
        let mut assets = AssetStore::new("/assets".into(), "mono");
        let mut panel = AlertPanel::new();
        let alert = AlertInfo {
            start_hhmm: "14:00".to_string(),
            end_hhmm: "18:00".to_string(),
            event: "Gale warning".to_string(),
        };
        panel.render(&mut surface, &ctx, &mut assets, Some(&alert)).unwrap();
        assert!(surface
            .texts
            .iter()
            .any(|(t, _, _)| t == "14:00 - 18:00: Gale warning"));
    }

    #[test]
    fn test_no_alert_still_erases_region() {
        let mut surface = MockSurface::new(1024, 600);
        let layout = Layout::compute(Size::new(1024, 600));
        let palette = Palette::default();
        let ctx = setup(&palette, &layout);
        let mut assets = AssetStore::new("/assets".into(), "mono");
        let mut panel = AlertPanel::new();
        // first render captures, second restores the capture
        panel.render(&mut surface, &ctx, &mut assets, None).unwrap();
        panel.render(&mut surface, &ctx, &mut assets, None).unwrap();
        assert_eq!(surface.captures.len(), 1);
        assert_eq!(surface.blits.len(), 1);
        assert!(surface.texts.is_empty());
    }
}
