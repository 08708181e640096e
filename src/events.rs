/*
 *  events.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Input translation. The windowing collaborator hands over raw events;
 *  this turns them into dashboard actions, applying the mode-dependent
 *  key rules and debouncing held keys.
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

use crate::news::NewsSlot;

/// Raw events from the windowing collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    MouseLeft,
    MouseRight,
    Key(Key),
    WindowMinimized,
    WindowRestored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// '1'..'9' - switch weather location
    Digit(u8),
    /// 'c' - world clocks only
    ClockOnly,
    /// 'w' - back to weather
    WeatherMode,
    /// 'a' / 'b' - activate a news source now
    NewsA,
    NewsB,
    /// 's' - settings editor
    Settings,
    /// 'm' - quick menu
    Menu,
    /// 'h' - help screen
    Help,
    /// 'q' / Escape
    Quit,
    /// Overlay navigation
    Up,
    Down,
    Enter,
    Other,
}

/// What the dashboard should do in response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    OpenMenu,
    OpenHelp,
    OpenSettings,
    /// Zero-based index into the configured locations.
    SwitchLocation(usize),
    SetClockOnly,
    SetWeatherMode,
    ActivateNews(NewsSlot),
    /// Window restored after minimize: repaint everything, re-show
    /// weather, but do not refetch.
    RedrawRestored,
}

/// Event source collaborator: the windowing backend drains its queue
/// into this each tick.
pub trait EventSource {
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// Source for backends without input (headless runs); signals arrive
/// via the process signal handler instead.
pub struct NullEventSource;

impl EventSource for NullEventSource {
    fn poll(&mut self) -> Vec<InputEvent> {
        Vec::new()
    }
}

/// Mode context the key rules depend on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchContext {
    /// Global clock-only setting (weather keys disabled entirely).
    pub clock_mode: bool,
    /// User pressed 'c' earlier.
    pub user_clock_mode: bool,
    pub showing_menu: bool,
    pub showing_config: bool,
    pub location_count: usize,
}

#[derive(Debug, Default)]
pub struct EventDispatcher {
    last_key: Option<Key>,
    minimized: bool,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate one raw event. `None` means the event changes nothing
    /// at the current state.
    pub fn dispatch(&mut self, event: InputEvent, ctx: &DispatchContext) -> Option<Action> {
        match event {
            InputEvent::Quit => Some(Action::Quit),

            InputEvent::MouseLeft => None,

            InputEvent::MouseRight => {
                if ctx.showing_menu {
                    None
                } else {
                    Some(Action::OpenMenu)
                }
            }

            InputEvent::WindowMinimized => {
                self.minimized = true;
                None
            }

            InputEvent::WindowRestored => {
                if std::mem::take(&mut self.minimized) {
                    Some(Action::RedrawRestored)
                } else {
                    None
                }
            }

            InputEvent::Key(key) => self.dispatch_key(key, ctx),
        }
    }

    fn dispatch_key(&mut self, key: Key, ctx: &DispatchContext) -> Option<Action> {
        if key == Key::Quit {
            return Some(Action::Quit);
        }

        // Holding a key yields one action; menu/help/settings keys
        // reset the latch so they can be pressed again after return.
        if self.last_key == Some(key) {
            return None;
        }
        self.last_key = Some(key);

        match key {
            Key::Digit(n) => {
                let idx = n.checked_sub(1)? as usize;
                if ctx.clock_mode || idx >= ctx.location_count {
                    None
                } else {
                    Some(Action::SwitchLocation(idx))
                }
            }
            Key::ClockOnly if !ctx.clock_mode => Some(Action::SetClockOnly),
            Key::WeatherMode if ctx.user_clock_mode && !ctx.clock_mode => {
                Some(Action::SetWeatherMode)
            }
            Key::NewsA if !ctx.clock_mode => Some(Action::ActivateNews(NewsSlot::A)),
            Key::NewsB if !ctx.clock_mode => Some(Action::ActivateNews(NewsSlot::B)),
            Key::Settings if !ctx.showing_config => {
                self.last_key = None;
                Some(Action::OpenSettings)
            }
            Key::Menu if !ctx.showing_menu => {
                self.last_key = None;
                Some(Action::OpenMenu)
            }
            Key::Help if !ctx.showing_menu => {
                self.last_key = None;
                Some(Action::OpenHelp)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> DispatchContext {
        DispatchContext {
            clock_mode: false,
            user_clock_mode: false,
            showing_menu: false,
            showing_config: false,
            location_count: 3,
        }
    }

    #[test]
    fn test_digit_switches_location() {
        let mut d = EventDispatcher::new();
        assert_eq!(
            d.dispatch(InputEvent::Key(Key::Digit(2)), &ctx()),
            Some(Action::SwitchLocation(1))
        );
        // out of range digit does nothing
        let mut d = EventDispatcher::new();
        assert_eq!(d.dispatch(InputEvent::Key(Key::Digit(7)), &ctx()), None);
    }

    #[test]
    fn test_weather_keys_disabled_in_clock_mode() {
        let mut d = EventDispatcher::new();
        let c = DispatchContext { clock_mode: true, ..ctx() };
        assert_eq!(d.dispatch(InputEvent::Key(Key::Digit(1)), &c), None);
        assert_eq!(d.dispatch(InputEvent::Key(Key::NewsA), &c), None);
        assert_eq!(d.dispatch(InputEvent::Key(Key::ClockOnly), &c), None);
    }

    #[test]
    fn test_weather_mode_requires_user_clock_toggle() {
        let mut d = EventDispatcher::new();
        assert_eq!(d.dispatch(InputEvent::Key(Key::WeatherMode), &ctx()), None);
        let c = DispatchContext { user_clock_mode: true, ..ctx() };
        let mut d = EventDispatcher::new();
        assert_eq!(
            d.dispatch(InputEvent::Key(Key::WeatherMode), &c),
            Some(Action::SetWeatherMode)
        );
    }

    #[test]
    fn test_held_key_debounced() {
        let mut d = EventDispatcher::new();
        assert!(d.dispatch(InputEvent::Key(Key::ClockOnly), &ctx()).is_some());
        assert!(d.dispatch(InputEvent::Key(Key::ClockOnly), &ctx()).is_none());
        // a different key re-arms
        assert!(d.dispatch(InputEvent::Key(Key::NewsB), &ctx()).is_some());
    }

    #[test]
    fn test_menu_key_rearms_after_return() {
        let mut d = EventDispatcher::new();
        assert_eq!(d.dispatch(InputEvent::Key(Key::Menu), &ctx()), Some(Action::OpenMenu));
        // the latch was reset, so pressing again (after the menu
        // closes) reopens it
        assert_eq!(d.dispatch(InputEvent::Key(Key::Menu), &ctx()), Some(Action::OpenMenu));
        // but not while the menu is up
        let showing = DispatchContext { showing_menu: true, ..ctx() };
        assert_eq!(d.dispatch(InputEvent::Key(Key::Menu), &showing), None);
    }

    #[test]
    fn test_right_click_opens_menu() {
        let mut d = EventDispatcher::new();
        assert_eq!(d.dispatch(InputEvent::MouseRight, &ctx()), Some(Action::OpenMenu));
        let showing = DispatchContext { showing_menu: true, ..ctx() };
        assert_eq!(d.dispatch(InputEvent::MouseRight, &showing), None);
    }

    #[test]
    fn test_restore_after_minimize_forces_redraw() {
        let mut d = EventDispatcher::new();
        assert_eq!(d.dispatch(InputEvent::WindowRestored, &ctx()), None);
        assert_eq!(d.dispatch(InputEvent::WindowMinimized, &ctx()), None);
        assert_eq!(
            d.dispatch(InputEvent::WindowRestored, &ctx()),
            Some(Action::RedrawRestored)
        );
    }

    #[test]
    fn test_quit_paths() {
        let mut d = EventDispatcher::new();
        assert_eq!(d.dispatch(InputEvent::Quit, &ctx()), Some(Action::Quit));
        assert_eq!(d.dispatch(InputEvent::Key(Key::Quit), &ctx()), Some(Action::Quit));
    }
}
