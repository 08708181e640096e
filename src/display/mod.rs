/*
 *  display/mod.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display subsystem: mode control, dirty-region tracking, panel
 *  renderers, and the surface seam to the windowing backend.
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

pub mod assets;
pub mod color;
pub mod components;
pub mod dashboard;
pub mod error;
pub mod headless;
pub mod layout;
pub mod mode_controller;
pub mod regions;
pub mod surface;

// Re-exports for convenience
pub use color::Palette;
pub use dashboard::Dashboard;
pub use error::{AssetError, DisplayError};
pub use layout::Layout;
pub use mode_controller::{DisplayModeController, ModeControllerConfig, OverlayKind, PanelSet, TickPlan};
pub use regions::{DirtyRegions, FlushPlan, PanelRegion};
pub use surface::{FontId, ImageHandle, Surface};

/// Display mode - which content owns the foreground and consumes input.
/// Exactly one is active at a time; NewsOverlay is the exception, a
/// timed overlay running over Weather or ClockOnly rather than a true
/// mode swap.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DisplayMode {
    ClockOnly,
    Weather,
    NewsOverlay,
    Menu,
    Config,
    Help,
}
