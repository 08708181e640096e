/*
 *  display/components/ticker.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  News ticker overlay. Captures the band it covers on entry, advances
 *  the headline text one step per tick for a fixed number of ticks,
 *  then restores the band (or the caller forces a full redraw when the
 *  scene changed underneath).
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
use crate::constants::TICKER_STEP_PX;
use crate::display::error::DisplayError;
use crate::display::regions::PanelRegion;
use crate::display::surface::{FontId, Surface};

pub struct NewsTicker {
    pub region: PanelRegion,
    titles: String,
    offset: i32,
    remaining: u32,
    active: bool,
    entered: bool,
}

impl NewsTicker {
    pub fn new() -> Self {
        Self {
            region: PanelRegion::new("ticker"),
            titles: String::new(),
            offset: 0,
            remaining: 0,
            active: false,
            entered: false,
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    /// One tick left? The dashboard ends the overlay when this hits
    /// zero after an advance.
    pub fn finished(&self) -> bool {
        self.active && self.remaining == 0
    }

    /// Arm the overlay with the assembled headline line for `ticks`
    /// loop iterations. The first advance captures the covered band.
    /// An unchanged headline set resumes its scroll position; new
    /// content restarts from the right edge.
    pub fn begin(&mut self, titles: &str, ticks: u32) {
        self.remaining = ticks;
        self.active = true;
        self.entered = false;
        if self.region.content_changed(&titles) {
            self.titles = titles.to_string();
            self.offset = 0;
        }
        self.region.invalidate();
    }

    /// Draw the current frame of the scroll and consume one tick.
    pub fn advance(
        &mut self,
        surface: &mut dyn Surface,
        ctx: &RenderCtx<'_>,
    ) -> Result<Rectangle, DisplayError> {
        self.region.relocate(ctx.layout.ticker);
        if !self.entered {
            // entry: remember what we cover
            self.region.prepare(surface)?;
            self.entered = true;
            if self.offset == 0 {
                self.offset = self.region.rect.size.width as i32;
            }
        }

        let rect = self.region.rect;
        surface.fill_rect(rect, ctx.palette.news_background)?;

        let text_w = surface.measure_text(&self.titles, FontId::Ticker).width as i32;
        self.offset -= TICKER_STEP_PX;
        if self.offset < -text_w {
            self.offset = rect.size.width as i32;
        }
        let text_h = surface.measure_text(&self.titles, FontId::Ticker).height as i32;
        surface.draw_text(
            &self.titles,
            FontId::Ticker,
            ctx.palette.news,
            Point::new(
                rect.top_left.x + self.offset,
                rect.top_left.y + (rect.size.height as i32 - text_h) / 2,
            ),
        )?;

        self.remaining = self.remaining.saturating_sub(1);
        Ok(rect)
    }

    /// Tear the overlay down, restoring the saved band. Returns the
    /// rect to flush, or None when the caller will full-redraw anyway.
    pub fn end(
        &mut self,
        surface: &mut dyn Surface,
        restore: bool,
    ) -> Result<Option<Rectangle>, DisplayError> {
        self.active = false;
        self.entered = false;
        if restore && self.region.has_capture() {
            self.region.prepare(surface)?;
            let rect = self.region.rect;
            self.region.invalidate();
            return Ok(Some(rect));
        }
        self.region.invalidate();
        Ok(None)
    }
}
