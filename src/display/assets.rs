/*
 *  display/assets.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Icon and background resolution with a degradation ladder: requested
 *  asset, then the default asset, then a blank filled rectangle. Asset
 *  trouble never takes the dashboard down.
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

use embedded_graphics::geometry::Size;
use log::warn;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::constants::{DEFAULT_BKG, NA_ICON};
use crate::display::surface::{ImageHandle, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Icon,
    Moon,
    Alert,
    Background,
}

impl AssetKind {
    fn subdir(self) -> &'static str {
        match self {
            AssetKind::Icon => "icons",
            AssetKind::Moon => "moon",
            AssetKind::Alert => "alert",
            AssetKind::Background => "backgrounds",
        }
    }

    fn extension(self) -> &'static str {
        match self {
            AssetKind::Background => "jpg",
            _ => "png",
        }
    }

    fn fallback_code(self) -> &'static str {
        match self {
            AssetKind::Background => DEFAULT_BKG,
            _ => NA_ICON,
        }
    }
}

/// Decoded-image cache keyed by (kind, code, size). Decoding goes
/// through `Surface::load_image`; the store only resolves paths and
/// remembers handles.
pub struct AssetStore {
    base_dir: PathBuf,
    icon_set: String,
    cache: HashMap<(AssetKind, String, Option<Size>), ImageHandle>,
}

impl AssetStore {
    pub fn new(base_dir: PathBuf, icon_set: &str) -> Self {
        Self {
            base_dir,
            icon_set: icon_set.to_string(),
            cache: HashMap::new(),
        }
    }

    fn path_for(&self, kind: AssetKind, code: &str) -> PathBuf {
        let mut p = self.base_dir.clone();
        if kind == AssetKind::Icon {
            p.push(kind.subdir());
            p.push(&self.icon_set);
        } else {
            p.push(kind.subdir());
        }
        p.push(format!("{}.{}", code, kind.extension()));
        p
    }

    /// Fetch an asset, trying the fallback asset on a miss. `None`
    /// means even the fallback is unavailable; the caller paints a
    /// blank rectangle instead.
    pub fn get(
        &mut self,
        surface: &mut dyn Surface,
        kind: AssetKind,
        code: &str,
        scale_to: Option<Size>,
    ) -> Option<ImageHandle> {
        let key = (kind, code.to_string(), scale_to);
        if let Some(h) = self.cache.get(&key) {
            return Some(h.clone());
        }

        match surface.load_image(&self.path_for(kind, code), scale_to) {
            Ok(h) => {
                self.cache.insert(key, h.clone());
                Some(h)
            }
            Err(e) => {
                warn!("{}; falling back to '{}'", e, kind.fallback_code());
                if code == kind.fallback_code() {
                    // The fallback itself is missing; nothing to show.
                    return None;
                }
                let h = self.get(surface, kind, kind.fallback_code(), scale_to);
                if let Some(handle) = &h {
                    self.cache.insert(key, handle.clone());
                }
                h
            }
        }
    }

    /// Drop every cached handle (settings return rebuilds the backend,
    /// so old handles are dead).
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::surface::MockSurface;

    #[test]
    fn test_cache_hits_skip_reload() {
        let mut surface = MockSurface::new(1024, 600);
        let mut store = AssetStore::new(PathBuf::from("/assets"), "mono");
        let a = store.get(&mut surface, AssetKind::Icon, "rain", None).unwrap();
        let b = store.get(&mut surface, AssetKind::Icon, "rain", None).unwrap();
        assert_eq!(a, b);
        assert_eq!(surface.loaded.len(), 1);
        assert!(surface.loaded[0].ends_with("icons/mono/rain.png"));
    }

    #[test]
    fn test_missing_asset_falls_back_to_default() {
        let mut surface = MockSurface::new(1024, 600);
        surface
            .missing_assets
            .push(PathBuf::from("/assets/backgrounds/storm.jpg"));
        let mut store = AssetStore::new(PathBuf::from("/assets"), "mono");
        let h = store.get(&mut surface, AssetKind::Background, "storm", None);
        assert!(h.is_some());
        assert!(surface.loaded[0].ends_with("backgrounds/default.jpg"));
    }

    #[test]
    fn test_total_failure_yields_none() {
        let mut surface = MockSurface::new(1024, 600);
        surface
            .missing_assets
            .push(PathBuf::from("/assets/backgrounds/storm.jpg"));
        surface
            .missing_assets
            .push(PathBuf::from("/assets/backgrounds/default.jpg"));
        let mut store = AssetStore::new(PathBuf::from("/assets"), "mono");
        assert!(store.get(&mut surface, AssetKind::Background, "storm", None).is_none());
    }
}
