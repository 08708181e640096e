/*
 *  display/components/clock.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  The big HH:MM block. The full time repaints once per minute; in
 *  between, only the colon blinks, drawn at the position recorded by
 *  the last full render so the blink repaint stays a few pixels wide.
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
use crate::display::error::DisplayError;
use crate::display::regions::PanelRegion;
use crate::display::surface::{FontId, Surface};

pub struct TimePanel {
    pub region: PanelRegion,
    /// Where the last full render put the colon.
    sep_at: Point,
    sep_size: Size,
}

impl TimePanel {
    pub fn new() -> Self {
        Self {
            region: PanelRegion::new("time"),
            sep_at: Point::zero(),
            sep_size: Size::zero(),
        }
    }

    /// Draw HH:MM. Centered across the whole width in clock-only mode,
    /// left of the current-conditions block otherwise.
    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        clockish: bool,
    ) -> Result<Rectangle, DisplayError> {
        let band = if clockish {
            // widen to the full middle band
            Rectangle::new(
                ctx.layout.time.top_left,
                Size::new(ctx.layout.screen.size.width, ctx.layout.time.size.height),
            )
        } else {
            ctx.layout.time
        };
        self.region.relocate(band);
        if ctx.show_background {
            self.region.prepare(surface)?;
        } else {
            surface.fill_rect(self.region.rect, ctx.palette.background)?;
        }

        let now = Local::now();
        let hour_t = now.format("%H").to_string();
        let minute_t = now.format("%M").to_string();

        let hour_size = surface.measure_text(&hour_t, FontId::Clock);
        let sep_size = surface.measure_text(":", FontId::Clock);
        let minute_size = surface.measure_text(&minute_t, FontId::Clock);
        let total = (hour_size.width + sep_size.width + minute_size.width) as i32;

        let x = if clockish {
            band.top_left.x + (band.size.width as i32 - total) / 2
        } else {
            band.top_left.x + ctx.layout.xmargin
        };
        let y = band.top_left.y + (band.size.height as i32 - hour_size.height as i32) / 2;

        surface.draw_text(&hour_t, FontId::Clock, ctx.palette.clock, Point::new(x, y))?;
        self.sep_at = Point::new(x + hour_size.width as i32, y);
        self.sep_size = sep_size;
        surface.draw_text(":", FontId::Clock, ctx.palette.clock, self.sep_at)?;
        surface.draw_text(
            &minute_t,
            FontId::Clock,
            ctx.palette.clock,
            Point::new(x + (hour_size.width + sep_size.width) as i32, y),
        )?;

        Ok(self.region.rect)
    }

    /// Blink the colon: bright on even seconds, dim on odd. Returns the
    /// colon's rectangle only.
    pub fn render_separator(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
        second: u32,
    ) -> Result<Rectangle, DisplayError> {
        let color = if second % 2 == 0 {
            ctx.palette.clock
        } else {
            ctx.palette.clock_dim
        };
        let size = surface.draw_text(":", FontId::Clock, color, self.sep_at)?;
        Ok(Rectangle::new(self.sep_at, size))
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

    fn setup() -> (MockSurface, Layout, Palette) {
        (
            MockSurface::new(1024, 600),
            Layout::compute(Size::new(1024, 600)),
            Palette::default(),
        )
    }

    #[test]
    fn test_separator_rect_is_tiny_and_at_recorded_position() {
        let (mut surface, layout, palette) = setup();
        let cfg = Config::default();
        let ctx = RenderCtx {
            palette: &palette,
            layout: &layout,
            lang: Lang::English,
            units: cfg.units,
            show_background: true,
        };
        let mut panel = TimePanel::new();
        let full = panel.render(&mut surface, &ctx, false).unwrap();
        let blink = panel.render_separator(&mut surface, &ctx, 1).unwrap();
        assert!(blink.size.width < full.size.width / 2);
        // colon drawn where the full render placed it
        assert!(blink.top_left.x > full.top_left.x);
        assert!(full.top_left.y <= blink.top_left.y);
    }

    #[test]
    fn test_clockish_centers_across_full_width() {
        let (mut surface, layout, palette) = setup();
        let cfg = Config::default();
        let ctx = RenderCtx {
            palette: &palette,
            layout: &layout,
            lang: Lang::English,
            units: cfg.units,
            show_background: false,
        };
        let mut panel = TimePanel::new();
        let rect = panel.render(&mut surface, &ctx, true).unwrap();
        assert_eq!(rect.size.width, 1024);
        // first drawn glyph starts past the left quarter of the screen
        let (_, _, at) = &surface.texts[0];
        assert!(at.x > 256);
    }
}
