/*
 *  display/headless.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Headless surface: an in-memory RGB framebuffer with no window.
 *  Keeps the dashboard runnable for development, CI and soak runs; a
 *  real windowing backend implements the same Surface trait. Text is
 *  metrics-only here - glyph rasterization belongs to the font
 *  collaborator a real backend brings along.
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
use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::primitives::Rectangle;
use log::debug;
use std::collections::HashMap;
use std::path::Path;

use crate::display::error::{AssetError, DisplayError};
use crate::display::surface::{FontId, ImageHandle, Surface};

/// Fixed cell metrics per logical font; a real backend measures real
/// glyphs instead.
fn cell(font: FontId) -> Size {
    match font {
        FontId::Clock => Size::new(42, 64),
        FontId::Temp => Size::new(34, 52),
        FontId::Calendar => Size::new(30, 46),
        FontId::Alert | FontId::Ticker => Size::new(13, 22),
        FontId::City | FontId::Forecast => Size::new(11, 18),
        FontId::WeekDay | FontId::Rain | FontId::TempText => Size::new(10, 16),
        FontId::Condition => Size::new(9, 15),
        FontId::By | FontId::ForecastSmall => Size::new(7, 12),
    }
}

pub struct HeadlessSurface {
    width: u32,
    height: u32,
    frame: Vec<u8>,
    images: HashMap<u64, (Size, Vec<u8>)>,
    next_image_id: u64,
    flush_count: u64,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 {
            return Err(DisplayError::DriverInit(format!(
                "unusable surface geometry {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            frame: vec![0; (width * height * 3) as usize],
            images: HashMap::new(),
            next_image_id: 1,
            flush_count: 0,
        })
    }

    fn clip(&self, rect: Rectangle) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.top_left.x.max(0) as u32;
        let y0 = rect.top_left.y.max(0) as u32;
        let x1 = (rect.top_left.x + rect.size.width as i32).clamp(0, self.width as i32) as u32;
        let y1 = (rect.top_left.y + rect.size.height as i32).clamp(0, self.height as i32) as u32;
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    fn put(&mut self, x: i32, y: i32, color: Rgb888) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let idx = ((y as u32 * self.width + x as u32) * 3) as usize;
        self.frame[idx] = color.r();
        self.frame[idx + 1] = color.g();
        self.frame[idx + 2] = color.b();
    }

    fn alloc(&mut self, size: Size, pixels: Vec<u8>) -> ImageHandle {
        let id = self.next_image_id;
        self.next_image_id += 1;
        self.images.insert(id, (size, pixels));
        ImageHandle { id, size }
    }
}

impl Surface for HeadlessSurface {
    fn dimensions(&self) -> Size {
        Size::new(self.width, self.height)
    }

    fn fill_rect(&mut self, rect: Rectangle, color: Rgb888) -> Result<(), DisplayError> {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else { return Ok(()) };
        for y in y0..y1 {
            for x in x0..x1 {
                self.put(x as i32, y as i32, color);
            }
        }
        Ok(())
    }

    fn dim_rect(&mut self, rect: Rectangle, factor: u8) -> Result<(), DisplayError> {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else { return Ok(()) };
        let keep = 255u32 - factor as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                let idx = ((y * self.width + x) * 3) as usize;
                for c in &mut self.frame[idx..idx + 3] {
                    *c = ((*c as u32 * keep) / 255) as u8;
                }
            }
        }
        Ok(())
    }

    fn blit(&mut self, image: &ImageHandle, at: Point) -> Result<(), DisplayError> {
        let (size, pixels) = self
            .images
            .get(&image.id)
            .cloned()
            .ok_or_else(|| DisplayError::Drawing(format!("unknown image handle {}", image.id)))?;
        for dy in 0..size.height {
            for dx in 0..size.width {
                let src = ((dy * size.width + dx) * 3) as usize;
                let color = Rgb888::new(pixels[src], pixels[src + 1], pixels[src + 2]);
                self.put(at.x + dx as i32, at.y + dy as i32, color);
            }
        }
        Ok(())
    }

    fn capture(&mut self, rect: Rectangle) -> Result<ImageHandle, DisplayError> {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return Err(DisplayError::OutOfBounds {
                x: rect.top_left.x,
                y: rect.top_left.y,
                width: rect.size.width,
                height: rect.size.height,
            });
        };
        let mut pixels = Vec::with_capacity(((x1 - x0) * (y1 - y0) * 3) as usize);
        for y in y0..y1 {
            let idx = ((y * self.width + x0) * 3) as usize;
            pixels.extend_from_slice(&self.frame[idx..idx + ((x1 - x0) * 3) as usize]);
        }
        Ok(self.alloc(Size::new(x1 - x0, y1 - y0), pixels))
    }

    fn draw_text(
        &mut self,
        text: &str,
        font: FontId,
        _color: Rgb888,
        _at: Point,
    ) -> Result<Size, DisplayError> {
        // Metrics only; no glyph rasterizer in the headless backend.
        Ok(self.measure_text(text, font))
    }

    fn measure_text(&self, text: &str, font: FontId) -> Size {
        let c = cell(font);
        Size::new(text.chars().count() as u32 * c.width, c.height)
    }

    fn load_image(&mut self, path: &Path, scale_to: Option<Size>) -> Result<ImageHandle, AssetError> {
        // No decoder here: an asset "loads" as a neutral placeholder
        // block when the file exists, so the fallback ladder behaves
        // exactly as it would with a real backend.
        if !path.exists() {
            return Err(AssetError::Missing(path.to_path_buf()));
        }
        let size = scale_to.unwrap_or(Size::new(64, 64));
        let pixels = vec![96u8; (size.width * size.height * 3) as usize];
        Ok(self.alloc(size, pixels))
    }

    fn draw_line(&mut self, from: Point, to: Point, _width: u32, color: Rgb888) -> Result<(), DisplayError> {
        // Bresenham, unclipped endpoints handled per pixel.
        let (mut x, mut y) = (from.x, from.y);
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        let sx = if from.x < to.x { 1 } else { -1 };
        let sy = if from.y < to.y { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, color);
            if x == to.x && y == to.y {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Ok(())
    }

    fn stroke_circle(&mut self, center: Point, radius: u32, _width: u32, color: Rgb888) -> Result<(), DisplayError> {
        // Midpoint circle.
        let r = radius as i32;
        let (mut x, mut y) = (r, 0i32);
        let mut err = 1 - r;
        while x >= y {
            for (px, py) in [
                (x, y), (y, x), (-y, x), (-x, y),
                (-x, -y), (-y, -x), (y, -x), (x, -y),
            ] {
                self.put(center.x + px, center.y + py, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
        Ok(())
    }

    fn flush_full(&mut self) -> Result<(), DisplayError> {
        self.flush_count += 1;
        debug!("headless flush: full frame ({})", self.flush_count);
        Ok(())
    }

    fn flush_regions(&mut self, regions: &[Rectangle]) -> Result<(), DisplayError> {
        self.flush_count += 1;
        debug!("headless flush: {} region(s)", regions.len());
        Ok(())
    }
}
