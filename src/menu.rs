/*
 *  menu.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Quick-options menu overlay: location switch, news source selection,
 *  one-shot actions. While open, the main panel repaint path is
 *  suspended; closing forces a full redraw.
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

use crate::config::Config;
use crate::display::color::Palette;
use crate::display::error::DisplayError;
use crate::display::layout::Layout;
use crate::display::surface::{FontId, Surface};
use crate::events::{InputEvent, Key};
use crate::news::NewsSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SelectLocation(usize),
    SelectNewsSource(NewsSlot),
    ActivateNews,
    SetWeatherMode,
    SetClockOnly,
    OpenSettings,
    OpenHelp,
    Back,
    Quit,
}

#[derive(Debug)]
pub struct MenuItem {
    pub label: String,
    pub action: MenuAction,
}

pub struct QuickMenu {
    items: Vec<MenuItem>,
    selected: usize,
    location_warning: bool,
}

impl QuickMenu {
    /// Build the menu for the current state: every configured location
    /// except the active one, the inactive news source, and the mode
    /// toggle matching the current display.
    pub fn build(
        cfg: &Config,
        current_location: usize,
        active_news: NewsSlot,
        clockish: bool,
        location_warning: bool,
    ) -> Self {
        let mut items = Vec::new();

        for (i, loc) in cfg.locations.iter().enumerate() {
            if i != current_location {
                items.push(MenuItem {
                    label: format!("Set Location: {}", loc.name),
                    action: MenuAction::SelectLocation(i),
                });
            }
        }

        let (other_slot, other_name) = match active_news {
            NewsSlot::A => (NewsSlot::B, &cfg.news.source_b.name),
            NewsSlot::B => (NewsSlot::A, &cfg.news.source_a.name),
        };
        items.push(MenuItem {
            label: format!("Next News Source: {}", other_name),
            action: MenuAction::SelectNewsSource(other_slot),
        });
        items.push(MenuItem {
            label: "Activate News Now".to_string(),
            action: MenuAction::ActivateNews,
        });

        if clockish {
            items.push(MenuItem {
                label: "Set Weather Mode".to_string(),
                action: MenuAction::SetWeatherMode,
            });
        } else {
            items.push(MenuItem {
                label: "Set Clock Only Mode".to_string(),
                action: MenuAction::SetClockOnly,
            });
        }

        let warn = if location_warning { "(!) " } else { "" };
        items.push(MenuItem {
            label: format!("{}Settings", warn),
            action: MenuAction::OpenSettings,
        });
        items.push(MenuItem { label: "Back".to_string(), action: MenuAction::Back });
        items.push(MenuItem { label: "Help".to_string(), action: MenuAction::OpenHelp });
        items.push(MenuItem { label: "Quit".to_string(), action: MenuAction::Quit });

        Self { items, selected: 0, location_warning }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Overlay input: arrows move, enter activates, escape backs out.
    pub fn handle(&mut self, event: InputEvent) -> Option<MenuAction> {
        match event {
            InputEvent::Key(Key::Up) => {
                self.selected = self.selected.checked_sub(1).unwrap_or(self.items.len() - 1);
                None
            }
            InputEvent::Key(Key::Down) => {
                self.selected = (self.selected + 1) % self.items.len();
                None
            }
            InputEvent::Key(Key::Enter) | InputEvent::MouseLeft => {
                Some(self.items[self.selected].action)
            }
            InputEvent::Key(Key::Quit) | InputEvent::MouseRight => Some(MenuAction::Back),
            InputEvent::Quit => Some(MenuAction::Quit),
            _ => None,
        }
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

        let title_size =
            surface.draw_text("Quick Options", FontId::City, palette.highlight, Point::new(x, y))?;
        y += title_size.height as i32 * 2;

        for (i, item) in self.items.iter().enumerate() {
            let color = if i == self.selected { palette.highlight } else { palette.clock };
            let marker = if i == self.selected { "> " } else { "  " };
            let size = surface.draw_text(
                &format!("{}{}", marker, item.label),
                FontId::Condition,
                color,
                Point::new(x, y),
            )?;
            y += size.height as i32 * 3 / 2;
        }

        if self.location_warning {
            y += layout.ymargin * 2;
            surface.draw_text(
                "(!) Location might not be properly set or too far. Check 'Weather' settings",
                FontId::By,
                palette.alert,
                Point::new(x, y),
            )?;
        }

        surface.flush_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> QuickMenu {
        let mut cfg = Config::default();
        cfg.locations.push(crate::config::LocationSpec {
            name: "Bilbao".to_string(),
            query: "lat=43.26&lon=-2.93".to_string(),
        });
        QuickMenu::build(&cfg, 0, NewsSlot::A, false, false)
    }

    #[test]
    fn test_build_skips_active_location_and_news_source() {
        let m = menu();
        assert!(m.items().iter().any(|i| i.label.contains("Bilbao")));
        assert!(!m.items().iter().any(|i| i.label.contains("Madrid")));
        assert!(m.items().iter().any(|i| i.label.contains("BBC")));
        assert!(!m.items().iter().any(|i| i.label.contains("Next News Source: RTVE")));
    }

    #[test]
    fn test_mode_toggle_matches_state() {
        let cfg = Config::default();
        let m = QuickMenu::build(&cfg, 0, NewsSlot::A, false, false);
        assert!(m.items().iter().any(|i| i.action == MenuAction::SetClockOnly));
        let m = QuickMenu::build(&cfg, 0, NewsSlot::A, true, false);
        assert!(m.items().iter().any(|i| i.action == MenuAction::SetWeatherMode));
    }

    #[test]
    fn test_navigation_wraps_and_activates() {
        let mut m = menu();
        assert_eq!(m.handle(InputEvent::Key(Key::Up)), None);
        assert_eq!(m.selected(), m.items().len() - 1);
        assert_eq!(m.handle(InputEvent::Key(Key::Down)), None);
        assert_eq!(m.selected(), 0);
        let first = m.items()[0].action;
        assert_eq!(m.handle(InputEvent::Key(Key::Enter)), Some(first));
    }

    #[test]
    fn test_escape_backs_out() {
        let mut m = menu();
        assert_eq!(m.handle(InputEvent::Key(Key::Quit)), Some(MenuAction::Back));
        assert_eq!(m.handle(InputEvent::Quit), Some(MenuAction::Quit));
    }
}
