/*
 *  display/components/clocks.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  World clocks panel: one analog face per configured zone, drawn in
 *  the lower strip when the dashboard is in clock-only display.
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

use embedded_graphics::geometry::Point;
use embedded_graphics::primitives::Rectangle;

use super::RenderCtx;
use crate::config::WorldClockSpec;
use crate::display::error::DisplayError;
use crate::display::regions::PanelRegion;
use crate::display::surface::{FontId, Surface};
use crate::tick::Tick;

pub struct WorldClocksPanel {
    pub region: PanelRegion,
    zones: Vec<WorldClockSpec>,
}

/// Local time shifted by a zone offset, wrapped with modulo arithmetic.
fn zone_time(tick: &Tick, offset_minutes: i32) -> (u32, u32) {
    let h_off = offset_minutes.div_euclid(60);
    let m_off = offset_minutes.rem_euclid(60);
    let m = (tick.minute as i32 + m_off).rem_euclid(60) as u32;
    let carry = (tick.minute as i32 + m_off).div_euclid(60);
    let h = (tick.hour as i32 + h_off + carry).rem_euclid(24) as u32;
    (h, m)
}

/// Hand endpoint on a clock face. Twelve o'clock points up.
fn hand_end(center: Point, angle_deg: f32, length: f32) -> Point {
    let rad = (angle_deg - 90.0).to_radians();
    Point::new(
        center.x + (length * rad.cos()).round() as i32,
        center.y + (length * rad.sin()).round() as i32,
    )
}

impl WorldClocksPanel {
    pub fn new(zones: Vec<WorldClockSpec>) -> Self {
        Self {
            region: PanelRegion::new("clocks"),
            zones,
        }
    }

    pub fn set_zones(&mut self, zones: Vec<WorldClockSpec>) {
        self.zones = zones;
    }

    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        tick: &Tick,
    ) -> Result<Rectangle, DisplayError> {
        self.region.relocate(ctx.layout.lower);
        if ctx.show_background {
            self.region.prepare(surface)?;
        } else {
            surface.fill_rect(self.region.rect, ctx.palette.background)?;
        }

        let rect = self.region.rect;
        if self.zones.is_empty() {
            return Ok(rect);
        }

        let zones = self.zones.len() as i32;
        let radius = (rect.size.height as i32 * 30 / 100).max(10);
        let gap = (rect.size.width as i32 - radius * 2 * zones) / (zones + 1);
        let mut cx = rect.top_left.x + gap + radius;
        let cy = rect.top_left.y + rect.size.height as i32 - radius - ctx.layout.ymargin * 2;

        for zone in &self.zones {
            let (h, m) = zone_time(tick, zone.offset_minutes);
            let center = Point::new(cx, cy);

            let label_size = surface.measure_text(&zone.city, FontId::City);
            surface.draw_text(
                &zone.city,
                FontId::City,
                ctx.palette.clock,
                Point::new(
                    cx - label_size.width as i32 / 2,
                    cy - radius - label_size.height as i32 - ctx.layout.ymargin,
                ),
            )?;

            surface.stroke_circle(center, radius as u32, 3, ctx.palette.clock)?;

            let hour_angle = ((h % 12) as f32 + m as f32 / 60.0) * 30.0;
            let minute_angle = m as f32 * 6.0;
            surface.draw_line(
                center,
                hand_end(center, hour_angle, radius as f32 * 0.55),
                3,
                ctx.palette.highlight,
            )?;
            surface.draw_line(
                center,
                hand_end(center, minute_angle, radius as f32 * 0.85),
                2,
                ctx.palette.clock,
            )?;

            cx += radius * 2 + gap;
        }

        Ok(rect)
    }
}
