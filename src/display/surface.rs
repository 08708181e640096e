/*
 *  display/surface.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  The seam between the dashboard and whatever windowing/graphics
 *  backend hosts it. Everything the renderers need is expressed here;
 *  no component touches a backend type directly.
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
use std::path::Path;

use crate::display::error::{AssetError, DisplayError};

/// Logical fonts; the backend maps them to concrete faces and sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontId {
    /// Small by-line / status text
    By,
    /// Big day-of-month numeral in the header
    Calendar,
    /// Weekday / month labels
    WeekDay,
    /// Location name, world-clock city labels
    City,
    /// The large HH:MM digits
    Clock,
    /// Condition / detail lines
    Condition,
    /// Big outside temperature
    Temp,
    /// Condition description under the temperature
    TempText,
    /// Daily forecast temps and labels
    Forecast,
    /// Hourly forecast temps and hour stamps
    ForecastSmall,
    /// Rain-probability percentage
    Rain,
    /// Alert banner text
    Alert,
    /// News ticker line
    Ticker,
}

/// Opaque reference to a backend-owned image (decoded asset or a
/// captured screen region).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: u64,
    pub size: Size,
}

/// Graphics/windowing collaborator. One implementation owns the actual
/// window, pixel buffers, font rasterization and image decoding; the
/// dashboard only ever draws through this trait.
///
/// The flush split matters: `flush_regions` presents only the listed
/// rectangles, `flush_full` the whole screen. A tick must use one or
/// the other, never both (see `DirtyRegions`).
pub trait Surface {
    fn dimensions(&self) -> Size;

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError>;

    /// Darken a region by `factor` (0 = untouched, 255 = black).
    fn dim_rect(&mut self, rect: Rectangle, factor: u8) -> Result<(), DisplayError>;

    fn blit(&mut self, image: &ImageHandle, at: Point) -> Result<(), DisplayError>;

    /// Copy the current pixels of `rect` into a backend-owned image,
    /// for later restoration via `blit`.
    fn capture(&mut self, rect: Rectangle) -> Result<ImageHandle, DisplayError>;

    /// Draw text; returns the rendered extent.
    fn draw_text(
        &mut self,
        text: &str,
        font: FontId,
        color: Rgb888,
        at: Point,
    ) -> Result<Size, DisplayError>;

    /// Extent `text` would occupy, without drawing.
    fn measure_text(&self, text: &str, font: FontId) -> Size;

    /// Decode an image asset at native size, scaled to `scale_to` when
    /// given. Missing/corrupt files surface as `AssetError`, which the
    /// asset store converts into a fallback.
    fn load_image(&mut self, path: &Path, scale_to: Option<Size>) -> Result<ImageHandle, AssetError>;

    fn draw_line(&mut self, from: Point, to: Point, width: u32, color: Rgb888) -> Result<(), DisplayError>;

    fn stroke_circle(&mut self, center: Point, radius: u32, width: u32, color: Rgb888) -> Result<(), DisplayError>;

    /// Present the whole screen.
    fn flush_full(&mut self) -> Result<(), DisplayError>;

    /// Present only the listed regions.
    fn flush_regions(&mut self, regions: &[Rectangle]) -> Result<(), DisplayError>;
}

/// Recording surface for tests. Mirrors the shape of a real backend but
/// just logs operations and hands out synthetic image handles, so render
/// paths can be asserted without a window.
#[cfg(test)]
pub struct MockSurface {
    size: Size,
    next_image_id: u64,
    pub fills: Vec<(Rectangle, Rgb888)>,
    pub dims: Vec<Rectangle>,
    pub blits: Vec<(u64, Point)>,
    pub captures: Vec<Rectangle>,
    pub texts: Vec<(String, FontId, Point)>,
    pub lines: Vec<(Point, Point)>,
    pub circles: Vec<(Point, u32)>,
    pub loaded: Vec<std::path::PathBuf>,
    pub flush_full_count: usize,
    pub flushed_regions: Vec<Vec<Rectangle>>,
    /// Paths that should fail to load, for fallback testing.
    pub missing_assets: Vec<std::path::PathBuf>,
}

#[cfg(test)]
impl MockSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            next_image_id: 1,
            fills: Vec::new(),
            dims: Vec::new(),
            blits: Vec::new(),
            captures: Vec::new(),
            texts: Vec::new(),
            lines: Vec::new(),
            circles: Vec::new(),
            loaded: Vec::new(),
            flush_full_count: 0,
            flushed_regions: Vec::new(),
            missing_assets: Vec::new(),
        }
    }

    fn alloc(&mut self, size: Size) -> ImageHandle {
        let id = self.next_image_id;
        self.next_image_id += 1;
        ImageHandle { id, size }
    }

    fn char_width(font: FontId) -> u32 {
        match font {
            FontId::Clock => 40,
            FontId::Temp => 32,
            FontId::Calendar => 28,
            FontId::Alert | FontId::Ticker => 12,
            FontId::By | FontId::ForecastSmall => 6,
            _ => 9,
        }
    }

    fn line_height(font: FontId) -> u32 {
        Self::char_width(font) * 3 / 2
    }
}

#[cfg(test)]
impl Surface for MockSurface {
    fn dimensions(&self) -> Size {
        self.size
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        self.fills.push((rect, color));
        Ok(())
    }

    fn dim_rect(&mut self, rect: Rectangle, _factor: u8) -> Result<(), DisplayError> {
        self.dims.push(rect);
        Ok(())
    }

    fn blit(&mut self, image: &ImageHandle, at: Point) -> Result<(), DisplayError> {
        self.blits.push((image.id, at));
        Ok(())
    }

    fn capture(&mut self, rect: Rectangle) -> Result<ImageHandle, DisplayError> {
        self.captures.push(rect);
        Ok(self.alloc(rect.size))
    }

    fn draw_text(
        &mut self,
        text: &str,
        font: FontId,
        _color: Rgb888,
        at: Point,
    ) -> Result<Size, DisplayError> {
        self.texts.push((text.to_string(), font, at));
        Ok(self.measure_text(text, font))
    }

    fn measure_text(&self, text: &str, font: FontId) -> Size {
        Size::new(
            text.chars().count() as u32 * Self::char_width(font),
            Self::line_height(font),
        )
    }

    fn load_image(&mut self, path: &Path, scale_to: Option<Size>) -> Result<ImageHandle, AssetError> {
        if self.missing_assets.iter().any(|p| p == path) {
            return Err(AssetError::Missing(path.to_path_buf()));
        }
        self.loaded.push(path.to_path_buf());
        Ok(self.alloc(scale_to.unwrap_or(Size::new(64, 64))))
    }

    fn draw_line(&mut self, from: Point, to: Point, _width: u32, _color: Rgb888) -> Result<(), DisplayError> {
        self.lines.push((from, to));
        Ok(())
    }

    fn stroke_circle(&mut self, center: Point, radius: u32, _width: u32, _color: Rgb888) -> Result<(), DisplayError> {
        self.circles.push((center, radius));
        Ok(())
    }

    fn flush_full(&mut self) -> Result<(), DisplayError> {
        self.flush_full_count += 1;
        Ok(())
    }

    fn flush_regions(&mut self, regions: &[Rectangle]) -> Result<(), DisplayError> {
        self.flushed_regions.push(regions.to_vec());
        Ok(())
    }
}
