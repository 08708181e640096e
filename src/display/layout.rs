/*
 *  display/layout.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Screen geometry. Panel rectangles are fractions of the surface so
 *  the dashboard scales across aspect ratios; margins follow the 1%
 *  rule of the original layout.
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

#[derive(Debug, Clone)]
pub struct Layout {
    pub screen: Rectangle,
    /// Calendar, by-line, location, astronomics band across the top.
    pub header: Rectangle,
    /// Big HH:MM block; left-aligned in weather mode, the time panel
    /// renderer centers within it for clock-only mode.
    pub time: Rectangle,
    /// Current conditions block to the right of the time.
    pub current: Rectangle,
    /// Thin alert band directly above the lower strip.
    pub alert: Rectangle,
    /// Forecast strip / world clocks area, bottom of the screen.
    pub lower: Rectangle,
    /// News ticker band, overlaid mid-screen.
    pub ticker: Rectangle,
    pub xmargin: i32,
    pub ymargin: i32,
}

impl Layout {
    pub fn compute(size: Size) -> Self {
        let w = size.width as i32;
        let h = size.height as i32;
        let xmargin = (w / 100).max(1);
        let ymargin = (h / 100).max(1);

        let header_h = h * 15 / 100;
        let lower_y = h * 58 / 100;
        let mid_h = lower_y - header_h;
        let time_w = w * 52 / 100;
        let alert_h = h * 6 / 100;
        let ticker_h = h * 8 / 100;

        Layout {
            screen: Rectangle::new(Point::zero(), size),
            header: rect(0, 0, w, header_h),
            time: rect(0, header_h, time_w, mid_h - alert_h),
            current: rect(time_w, header_h, w - time_w, mid_h - alert_h),
            alert: rect(0, lower_y - alert_h, w, alert_h),
            lower: rect(0, lower_y, w, h - lower_y),
            ticker: rect(0, lower_y - alert_h - ticker_h, w, ticker_h),
            xmargin,
            ymargin,
        }
    }
}

fn rect(x: i32, y: i32, w: i32, h: i32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w.max(0) as u32, h.max(0) as u32))
}
