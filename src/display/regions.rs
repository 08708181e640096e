/*
 *  display/regions.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Dirty-rectangle bookkeeping. Panels repaint into their own regions;
 *  the tracker collects what changed this tick and yields exactly one
 *  flush plan - whole screen, or the coalesced rectangle list. Emitting
 *  both in a tick re-presents already-updated pixels and flickers.
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

use embedded_graphics::primitives::Rectangle;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::display::error::DisplayError;
use crate::display::surface::{ImageHandle, Surface};

/// True when `outer` fully encloses `inner`.
fn encloses(outer: &Rectangle, inner: &Rectangle) -> bool {
    let (o1, i1) = (outer.top_left, inner.top_left);
    let o2 = o1 + outer.size;
    let i2 = i1 + inner.size;
    o1.x <= i1.x && o1.y <= i1.y && o2.x >= i2.x && o2.y >= i2.y
}

/// What the surface should present for this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushPlan {
    /// Nothing changed; skip the present entirely.
    Nothing,
    /// Present only the listed regions.
    Partial(Vec<Rectangle>),
    /// Present the whole screen, superseding any partial list.
    Full,
}

/// Per-tick accumulator of changed regions.
#[derive(Debug, Default)]
pub struct DirtyRegions {
    full: bool,
    rects: Vec<Rectangle>,
}

impl DirtyRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a repainted region. Regions already covered by a pushed
    /// rect are dropped, and a new enclosing rect evicts the rects it
    /// covers, so no region is listed twice for the flush.
    pub fn push(&mut self, rect: Rectangle) {
        if self.full || rect.size.width == 0 || rect.size.height == 0 {
            return;
        }
        if self.rects.iter().any(|r| encloses(r, &rect)) {
            return;
        }
        self.rects.retain(|r| !encloses(&rect, r));
        self.rects.push(rect);
    }

    /// Escalate this tick to a whole-screen flush. Discards the partial
    /// list; later pushes become no-ops.
    pub fn mark_all(&mut self) {
        self.full = true;
        self.rects.clear();
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Consume the tick's accumulation into a flush plan, resetting the
    /// tracker for the next tick.
    pub fn take_plan(&mut self) -> FlushPlan {
        let full = std::mem::take(&mut self.full);
        let rects = std::mem::take(&mut self.rects);
        if full {
            FlushPlan::Full
        } else if rects.is_empty() {
            FlushPlan::Nothing
        } else {
            FlushPlan::Partial(rects)
        }
    }

    /// Apply the plan against the surface. Exactly one present call per
    /// tick, or none.
    pub fn flush(&mut self, surface: &mut dyn Surface) -> Result<FlushPlan, DisplayError> {
        let plan = self.take_plan();
        match &plan {
            FlushPlan::Nothing => {}
            FlushPlan::Partial(rects) => surface.flush_regions(rects)?,
            FlushPlan::Full => surface.flush_full()?,
        }
        Ok(plan)
    }
}

/// One screen panel: its rectangle, the lazily captured background
/// behind it, and a hash of what was last drawn there.
#[derive(Debug)]
pub struct PanelRegion {
    pub name: &'static str,
    pub rect: Rectangle,
    cached_background: Option<ImageHandle>,
    last_content_hash: u64,
}

impl PanelRegion {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rect: Rectangle::zero(),
            cached_background: None,
            last_content_hash: 0,
        }
    }

    /// Move/resize the panel. A changed rectangle invalidates the
    /// background capture, which no longer matches the pixels under it.
    pub fn relocate(&mut self, rect: Rectangle) {
        if rect != self.rect {
            self.rect = rect;
            self.cached_background = None;
        }
    }

    /// Erase previous content: blit the cached background back, or
    /// capture it on first use (the pixels under a panel are pristine
    /// until the panel first draws).
    pub fn prepare(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        match &self.cached_background {
            Some(img) => surface.blit(img, self.rect.top_left)?,
            None => self.cached_background = Some(surface.capture(self.rect)?),
        }
        Ok(())
    }

    /// Drop the capture; the background art underneath changed.
    pub fn invalidate(&mut self) {
        self.cached_background = None;
    }

    pub fn has_capture(&self) -> bool {
        self.cached_background.is_some()
    }

    /// Hash the would-be content; true (and records it) when it differs
    /// from what was last drawn here.
    pub fn content_changed<H: Hash>(&mut self, content: &H) -> bool {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        let h = hasher.finish();
        if h == self.last_content_hash {
            false
        } else {
            self.last_content_hash = h;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::surface::MockSurface;
    use embedded_graphics::geometry::{Point, Size};

    fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
        Rectangle::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn test_single_panel_partial_list_is_exact() {
        // A tick where only the time panel fired flushes exactly that rect.
        let mut dirty = DirtyRegions::new();
        let time_rect = rect(10, 90, 400, 180);
        dirty.push(time_rect);
        assert_eq!(dirty.take_plan(), FlushPlan::Partial(vec![time_rect]));
    }

    #[test]
    fn test_full_supersedes_partial() {
        let mut dirty = DirtyRegions::new();
        dirty.push(rect(0, 0, 100, 100));
        dirty.mark_all();
        dirty.push(rect(10, 10, 20, 20));
        assert_eq!(dirty.take_plan(), FlushPlan::Full);
        // and the tracker is reset afterwards
        assert_eq!(dirty.take_plan(), FlushPlan::Nothing);
    }

    #[test]
    fn test_full_flush_never_also_partial() {
        let mut dirty = DirtyRegions::new();
        dirty.push(rect(0, 0, 100, 100));
        dirty.mark_all();
        let mut surface = MockSurface::new(1024, 600);
        dirty.flush(&mut surface).unwrap();
        assert_eq!(surface.flush_full_count, 1);
        assert!(surface.flushed_regions.is_empty());
    }

    #[test]
    fn test_enclosed_rects_are_coalesced() {
        let mut dirty = DirtyRegions::new();
        let outer = rect(0, 0, 200, 200);
        dirty.push(rect(10, 10, 50, 50));
        dirty.push(outer);
        // pushing a rect inside an already-tracked one is dropped
        dirty.push(rect(100, 100, 20, 20));
        assert_eq!(dirty.take_plan(), FlushPlan::Partial(vec![outer]));
    }

    #[test]
    fn test_empty_rects_ignored() {
        let mut dirty = DirtyRegions::new();
        dirty.push(rect(5, 5, 0, 10));
        assert_eq!(dirty.take_plan(), FlushPlan::Nothing);
    }

    #[test]
    fn test_panel_captures_once_then_restores() {
        let mut surface = MockSurface::new(1024, 600);
        let mut panel = PanelRegion::new("time");
        panel.relocate(rect(10, 90, 400, 180));

        panel.prepare(&mut surface).unwrap();
        assert_eq!(surface.captures.len(), 1);
        assert!(surface.blits.is_empty());

        panel.prepare(&mut surface).unwrap();
        assert_eq!(surface.captures.len(), 1, "second prepare must reuse the capture");
        assert_eq!(surface.blits.len(), 1);

        panel.invalidate();
        panel.prepare(&mut surface).unwrap();
        assert_eq!(surface.captures.len(), 2, "invalidation forces a fresh capture");
    }

    #[test]
    fn test_content_hash_changes_once() {
        let mut panel = PanelRegion::new("header");
        assert!(panel.content_changed(&"Tuesday 5"));
        assert!(!panel.content_changed(&"Tuesday 5"));
        assert!(panel.content_changed(&"Wednesday 6"));
    }
}
