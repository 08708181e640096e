/*
 *  display/components/mod.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Panel renderers. Each draws into its own PanelRegion through the
 *  Surface trait and returns the rectangle it touched, which the
 *  dashboard feeds to the dirty-region tracker.
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

pub mod alert;
pub mod clock;
pub mod clocks;
pub mod header;
pub mod ticker;
pub mod weather;

use crate::config::Units;
use crate::display::color::Palette;
use crate::display::layout::Layout;
use crate::lang::Lang;

/// Shared render inputs passed to every panel.
pub struct RenderCtx<'a> {
    pub palette: &'a Palette,
    pub layout: &'a Layout,
    pub lang: Lang,
    pub units: Units,
    /// Background artwork in use: erase by restoring captures rather
    /// than filling with the background color.
    pub show_background: bool,
}
