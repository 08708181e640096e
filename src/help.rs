/*
 *  help.rs
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
//! Help overlay. Lines come from a JSON asset (an ordered object of
//! key -> text); the built-in key reference is the fallback when the
//! file is absent.

use embedded_graphics::geometry::Point;
use log::warn;
use std::path::Path;

use crate::display::color::Palette;
use crate::display::error::DisplayError;
use crate::display::layout::Layout;
use crate::display::surface::{FontId, Surface};
use crate::events::InputEvent;

pub struct HelpScreen {
    lines: Vec<String>,
}

impl HelpScreen {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(body) => match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&body) {
                Ok(map) => {
                    let lines = map
                        .values()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect::<Vec<_>>();
                    if lines.is_empty() {
                        Self { lines: default_lines() }
                    } else {
                        Self { lines }
                    }
                }
                Err(e) => {
                    warn!("Help file {} unreadable ({}); using built-in help", path.display(), e);
                    Self { lines: default_lines() }
                }
            },
            Err(_) => Self { lines: default_lines() },
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Any key or click leaves the help screen.
    pub fn handle(&self, event: InputEvent) -> bool {
        matches!(
            event,
            InputEvent::Key(_) | InputEvent::MouseLeft | InputEvent::MouseRight | InputEvent::Quit
        )
    }

    pub fn render(
        &self,
        surface: &mut dyn Surface,
        palette: &Palette,
        layout: &Layout,
    ) -> Result<(), DisplayError> {
        surface.fill_rect(layout.screen, palette.background)?;

        let x = layout.screen.top_left.x + layout.xmargin * 6;
        let mut y = layout.screen.top_left.y + layout.ymargin * 4;

        let title_size = surface.draw_text("Help", FontId::City, palette.highlight, Point::new(x, y))?;
        y += title_size.height as i32 * 2;

        for line in &self.lines {
            let size = surface.draw_text(line, FontId::By, palette.clock, Point::new(x, y))?;
            y += size.height as i32 * 3 / 2;
        }

        surface.flush_full()
    }
}

fn default_lines() -> Vec<String> {
    [
        "1-9     Switch weather location",
        "c       World clocks only",
        "w       Back to weather",
        "a / b   Activate news source A / B",
        "s       Settings",
        "m       Quick menu (also right-click)",
        "h       This help",
        "q / Esc Quit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
