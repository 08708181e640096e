/*
 *  display/mode_controller.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display mode controller - the per-tick transition function deciding
 *  which mode is in the foreground and which panels repaint this tick.
 *  Pure state + arithmetic, so the whole decision table is testable
 *  without a graphics backend.
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

use super::DisplayMode;
use crate::config::NewsMode;
use crate::constants::{
    NEWS_PERIOD_MIN, NEWS_SHOW_SECOND, NEWS_UPDATE_SECOND, WEATHER_PERIOD_MIN,
    WEATHER_REFRESH_SECOND,
};
use crate::tick::Tick;
use log::{debug, info};

/// Configuration for the mode controller
#[derive(Debug, Clone)]
pub struct ModeControllerConfig {
    /// Global clock-only dashboard (weather never shown)
    pub clock_mode: bool,

    pub news_mode: NewsMode,

    /// Weather refetch cadence: `(minute + 1) % period == 0` at `second`
    pub weather_period_min: u32,
    pub weather_refresh_second: u32,

    /// News cadence; update and show are distinct seconds of the cycle
    pub news_period_min: u32,
    pub news_update_second: u32,
    pub news_show_second: u32,
}

impl Default for ModeControllerConfig {
    fn default() -> Self {
        Self {
            clock_mode: false,
            news_mode: NewsMode::Period,
            weather_period_min: WEATHER_PERIOD_MIN,
            weather_refresh_second: WEATHER_REFRESH_SECOND,
            news_period_min: NEWS_PERIOD_MIN,
            news_update_second: NEWS_UPDATE_SECOND,
            news_show_second: NEWS_SHOW_SECOND,
        }
    }
}

/// Panels to repaint this tick. The booleans are independent; several
/// can be true in the same tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSet {
    pub disp_header: bool,
    pub disp_time: bool,
    /// Blinking time separator, ticks where the full time is not drawn
    pub disp_sep: bool,
    pub disp_weather: bool,
    pub disp_clocks: bool,
    pub disp_news: bool,
    /// Network refresh requests, decided alongside the panels
    pub update_weather: bool,
    pub update_news: bool,
    /// Whole-screen repaint; supersedes the partial flush this tick
    pub display_all: bool,
}

/// One tick's decision: foreground mode plus the panel set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickPlan {
    pub mode: DisplayMode,
    pub panels: PanelSet,
    /// Config/menu/help is in front: skip the panel repaint path.
    pub suppressed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Menu,
    Help,
}

/// Decides, each tick, the active foreground mode and which panels
/// repaint.
///
/// `disp_weather` precedence, most binding first: the degraded
/// fallback, the user's clock toggle and the global clock-mode setting
/// each suppress the weather panels outright (the fallback still lets
/// the refresh retry run, which is how recovery happens); only then do
/// a forced refresh or the scheduled window activate them.
pub struct DisplayModeController {
    config: ModeControllerConfig,
    user_clock_mode: bool,
    /// Degraded clock-only display forced by stale weather
    fallback_clock: bool,
    overlay: Option<OverlayKind>,
    config_running: bool,
    showing_news: bool,
    pending_full: bool,
    pending_weather_refresh: bool,
    force_show_weather: bool,
    sunrise: String,
    sunset: String,
}

impl DisplayModeController {
    /// The first planned tick paints everything and kicks off the
    /// initial weather fetch.
    pub fn new(config: ModeControllerConfig) -> Self {
        Self {
            config,
            user_clock_mode: false,
            fallback_clock: false,
            overlay: None,
            config_running: false,
            showing_news: false,
            pending_full: true,
            pending_weather_refresh: true,
            force_show_weather: false,
            sunrise: String::new(),
            sunset: String::new(),
        }
    }

    /// Clock-only for any reason: setting, user toggle, or fallback.
    pub fn is_clockish(&self) -> bool {
        self.config.clock_mode || self.user_clock_mode || self.fallback_clock
    }

    pub fn user_clock_mode(&self) -> bool {
        self.user_clock_mode
    }

    pub fn showing_news(&self) -> bool {
        self.showing_news
    }

    pub fn overlay(&self) -> Option<OverlayKind> {
        self.overlay
    }

    pub fn config_running(&self) -> bool {
        self.config_running
    }

    /// The per-tick transition function. Priority order: config
    /// sub-application, then menu/help overlay, then the computed panel
    /// set.
    pub fn plan(&mut self, tick: &Tick) -> TickPlan {
        if self.config_running {
            return TickPlan {
                mode: DisplayMode::Config,
                panels: PanelSet::default(),
                suppressed: true,
            };
        }
        if let Some(kind) = self.overlay {
            return TickPlan {
                mode: match kind {
                    OverlayKind::Menu => DisplayMode::Menu,
                    OverlayKind::Help => DisplayMode::Help,
                },
                panels: PanelSet::default(),
                suppressed: true,
            };
        }

        let mut p = PanelSet::default();
        let mut display_all = std::mem::take(&mut self.pending_full);
        let force_show = std::mem::take(&mut self.force_show_weather);
        let force_refresh = std::mem::take(&mut self.pending_weather_refresh);

        if tick.second == 0 {
            p.disp_time = true;
            if tick.minute == 0 {
                p.disp_header = true;
            }
            if tick.matches(&self.sunrise) || tick.matches(&self.sunset) {
                // Day/night background swap needs the whole screen.
                display_all = true;
            }
        } else {
            p.disp_sep = true;
        }

        let clockish = self.is_clockish();
        if clockish && (tick.second == 0 || display_all) {
            p.disp_clocks = true;
        }
        if !clockish && (force_show || display_all) {
            p.disp_weather = true;
        }

        let always_on = self.config.news_mode == NewsMode::AlwaysOn;

        // The fallback suppresses weather *display*, never the retry:
        // refreshes keep firing on the same window until one succeeds.
        if !self.config.clock_mode
            && !self.user_clock_mode
            && (force_refresh
                || ((tick.minute + 1) % self.config.weather_period_min == 0
                    && (tick.second == self.config.weather_refresh_second
                        || display_all
                        || always_on)))
        {
            p.disp_weather = true;
            p.update_weather = true;
        }

        let news_eligible = !self.config.clock_mode
            && !self.showing_news
            && self.config.news_mode != NewsMode::Off;
        if news_eligible
            && (always_on
                || ((tick.minute + 1) % self.config.news_period_min == 0
                    && tick.second == self.config.news_update_second))
        {
            p.disp_news = true;
            p.update_news = true;
        } else if news_eligible
            && (always_on
                || (tick.minute % self.config.news_period_min == 0
                    && tick.second == self.config.news_show_second))
        {
            p.disp_news = true;
        }

        if display_all {
            p.disp_header = true;
            p.disp_time = true;
            p.disp_sep = false;
        }
        p.display_all = display_all;

        let mode = if self.showing_news {
            DisplayMode::NewsOverlay
        } else if clockish {
            DisplayMode::ClockOnly
        } else {
            DisplayMode::Weather
        };
        debug!("tick {:02}:{:02}:{:02} -> {:?}", tick.hour, tick.minute, tick.second, mode);

        TickPlan { mode, panels: p, suppressed: false }
    }

    /// Latch/unlatch the degraded clock-only display. Either edge
    /// forces one full redraw (entering hides stale weather, recovery
    /// restores it).
    pub fn set_fallback(&mut self, active: bool) {
        if self.fallback_clock != active {
            info!(
                "{} degraded clock-only mode",
                if active { "Entering" } else { "Leaving" }
            );
            self.fallback_clock = active;
            self.pending_full = true;
        }
    }

    pub fn fallback_active(&self) -> bool {
        self.fallback_clock
    }

    pub fn request_full_redraw(&mut self) {
        self.pending_full = true;
    }

    /// Consume a queued full redraw. Used when the caller escalates the
    /// current tick itself and the queued one would repaint twice.
    pub fn absorb_pending_full(&mut self) -> bool {
        std::mem::take(&mut self.pending_full)
    }

    /// Fetch weather on the next tick regardless of the window.
    pub fn request_weather_refresh(&mut self) {
        self.pending_weather_refresh = true;
    }

    /// Re-show weather panels without refetching (window restore).
    pub fn force_show_weather(&mut self) {
        self.force_show_weather = true;
        self.pending_full = true;
    }

    pub fn set_user_clock_mode(&mut self, on: bool) {
        if self.user_clock_mode != on {
            self.user_clock_mode = on;
            self.pending_full = true;
            if !on {
                // Returning to weather wants fresh data immediately.
                self.pending_weather_refresh = true;
            }
        }
    }

    pub fn open_overlay(&mut self, kind: OverlayKind) {
        self.overlay = Some(kind);
    }

    /// Leaving an overlay resumes panel repaint with a forced full
    /// redraw; the overlay drew over everything.
    pub fn close_overlay(&mut self) {
        if self.overlay.take().is_some() {
            self.pending_full = true;
        }
    }

    pub fn set_config_running(&mut self) {
        self.config_running = true;
    }

    /// The settings sub-application exited; previous mode resumes with
    /// a full redraw. User flags (clock toggle, news showing) survive -
    /// the dashboard restores its own state separately.
    pub fn on_config_exit(&mut self) {
        self.config_running = false;
        self.pending_full = true;
        self.pending_weather_refresh = true;
    }

    pub fn begin_news(&mut self) {
        self.showing_news = true;
    }

    pub fn end_news(&mut self) {
        self.showing_news = false;
    }

    pub fn set_sun_times(&mut self, sunrise: &str, sunset: &str) {
        self.sunrise = sunrise.to_string();
        self.sunset = sunset.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> DisplayModeController {
        let mut c = DisplayModeController::new(ModeControllerConfig::default());
        // swallow the construction-time full redraw
        let _ = c.plan(&Tick::from_hms(10, 7, 3));
        c
    }

    #[test]
    fn test_first_plan_paints_and_fetches_everything() {
        let mut c = DisplayModeController::new(ModeControllerConfig::default());
        let plan = c.plan(&Tick::from_hms(10, 7, 3));
        assert!(plan.panels.display_all);
        assert!(plan.panels.update_weather);
        assert!(plan.panels.disp_header);
        assert!(plan.panels.disp_time);
        assert!(!plan.panels.disp_sep);
    }

    #[test]
    fn test_header_and_time_false_off_the_minute() {
        let mut c = controller();
        for second in 1..60 {
            let plan = c.plan(&Tick::from_hms(9, 30, second));
            assert!(!plan.panels.disp_header, "header at :{:02}", second);
            assert!(!plan.panels.disp_time, "time at :{:02}", second);
            assert!(plan.panels.disp_sep);
        }
    }

    #[test]
    fn test_header_only_at_top_of_hour() {
        let mut c = controller();
        let plan = c.plan(&Tick::from_hms(9, 0, 0));
        assert!(plan.panels.disp_header);
        assert!(plan.panels.disp_time);

        let plan = c.plan(&Tick::from_hms(9, 30, 0));
        assert!(!plan.panels.disp_header);
        assert!(plan.panels.disp_time);
    }

    #[test]
    fn test_forced_full_redraw_overrides_seconds() {
        let mut c = controller();
        c.request_full_redraw();
        let plan = c.plan(&Tick::from_hms(9, 30, 17));
        assert!(plan.panels.display_all);
        assert!(plan.panels.disp_header);
        assert!(plan.panels.disp_time);
        assert!(!plan.panels.disp_sep);
        // one-shot: the next tick is ordinary again
        let plan = c.plan(&Tick::from_hms(9, 30, 18));
        assert!(!plan.panels.display_all);
    }

    #[test]
    fn test_minute_zero_second_zero_weather_window() {
        // Top of the hour, no forced redraw, weather mode: header and
        // time fire; the weather panel follows the scheduling window,
        // which is closed at minute 0 (period 15).
        let mut c = controller();
        let plan = c.plan(&Tick::from_hms(10, 0, 0));
        assert!(plan.panels.disp_header);
        assert!(plan.panels.disp_time);
        assert!(!plan.panels.update_weather);
        assert!(!plan.panels.disp_weather);
    }

    #[test]
    fn test_weather_refresh_window() {
        let mut c = controller();
        let plan = c.plan(&Tick::from_hms(10, 14, WEATHER_REFRESH_SECOND));
        assert!(plan.panels.update_weather);
        assert!(plan.panels.disp_weather);
        // same minute, wrong second: no-op
        let plan = c.plan(&Tick::from_hms(10, 14, WEATHER_REFRESH_SECOND + 1));
        assert!(!plan.panels.update_weather);
    }

    #[test]
    fn test_clock_modes_suppress_weather_but_fallback_does_not_stop_retry() {
        let mut cfg = ModeControllerConfig::default();
        cfg.clock_mode = true;
        let mut c = DisplayModeController::new(cfg);
        let _ = c.plan(&Tick::from_hms(0, 0, 1));
        let plan = c.plan(&Tick::from_hms(10, 14, WEATHER_REFRESH_SECOND));
        assert!(!plan.panels.update_weather, "global clock mode disables fetching");
        assert!(!plan.panels.disp_weather);

        // fallback: display suppressed, retry still scheduled
        let mut c = controller();
        c.set_fallback(true);
        let _ = c.plan(&Tick::from_hms(10, 10, 1)); // absorb the forced full
        let plan = c.plan(&Tick::from_hms(10, 14, WEATHER_REFRESH_SECOND));
        assert!(plan.panels.update_weather, "fallback keeps retrying on the window");
        assert_eq!(plan.mode, DisplayMode::ClockOnly);
    }

    #[test]
    fn test_fallback_edges_force_full_redraw() {
        let mut c = controller();
        c.set_fallback(true);
        let plan = c.plan(&Tick::from_hms(10, 10, 30));
        assert!(plan.panels.display_all);
        assert!(plan.panels.disp_clocks);

        // recovery edge also repaints everything
        c.set_fallback(false);
        let plan = c.plan(&Tick::from_hms(10, 10, 31));
        assert!(plan.panels.display_all);
        assert!(plan.panels.disp_weather);
    }

    #[test]
    fn test_clocks_repaint_once_per_minute_in_clock_mode() {
        let mut c = controller();
        c.set_user_clock_mode(true);
        let _ = c.plan(&Tick::from_hms(11, 0, 1));
        let plan = c.plan(&Tick::from_hms(11, 1, 0));
        assert!(plan.panels.disp_clocks);
        let plan = c.plan(&Tick::from_hms(11, 1, 30));
        assert!(!plan.panels.disp_clocks);
    }

    #[test]
    fn test_sunrise_match_forces_full_redraw() {
        let mut c = controller();
        c.set_sun_times("06:51", "20:12");
        let plan = c.plan(&Tick::from_hms(6, 51, 0));
        assert!(plan.panels.display_all);
        // only on the rollover second
        let plan = c.plan(&Tick::from_hms(6, 51, 1));
        assert!(!plan.panels.display_all);
    }

    #[test]
    fn test_news_update_and_show_windows() {
        let mut c = controller();
        let plan = c.plan(&Tick::from_hms(12, 4, NEWS_UPDATE_SECOND));
        assert!(plan.panels.disp_news);
        assert!(plan.panels.update_news);

        let plan = c.plan(&Tick::from_hms(12, 5, NEWS_SHOW_SECOND));
        assert!(plan.panels.disp_news);
        assert!(!plan.panels.update_news);

        let plan = c.plan(&Tick::from_hms(12, 6, 0));
        assert!(!plan.panels.disp_news);
    }

    #[test]
    fn test_news_suppressed_while_showing() {
        let mut c = controller();
        c.begin_news();
        let plan = c.plan(&Tick::from_hms(12, 4, NEWS_UPDATE_SECOND));
        assert!(!plan.panels.disp_news);
        assert_eq!(plan.mode, DisplayMode::NewsOverlay);
        c.end_news();
        let plan = c.plan(&Tick::from_hms(12, 9, NEWS_UPDATE_SECOND));
        assert!(plan.panels.disp_news);
    }

    #[test]
    fn test_overlays_and_config_suppress_repaint() {
        let mut c = controller();
        c.open_overlay(OverlayKind::Menu);
        let plan = c.plan(&Tick::from_hms(8, 0, 0));
        assert!(plan.suppressed);
        assert_eq!(plan.mode, DisplayMode::Menu);
        assert_eq!(plan.panels, PanelSet::default());

        c.close_overlay();
        let plan = c.plan(&Tick::from_hms(8, 0, 1));
        assert!(!plan.suppressed);
        assert!(plan.panels.display_all, "overlay exit forces a full redraw");

        c.set_config_running();
        let plan = c.plan(&Tick::from_hms(8, 0, 2));
        assert!(plan.suppressed);
        assert_eq!(plan.mode, DisplayMode::Config);

        c.on_config_exit();
        let plan = c.plan(&Tick::from_hms(8, 0, 3));
        assert!(!plan.suppressed);
        assert!(plan.panels.display_all);
        assert!(plan.panels.update_weather);
    }

    #[test]
    fn test_always_on_news_every_tick() {
        let mut cfg = ModeControllerConfig::default();
        cfg.news_mode = NewsMode::AlwaysOn;
        let mut c = DisplayModeController::new(cfg);
        let _ = c.plan(&Tick::from_hms(0, 0, 1));
        let plan = c.plan(&Tick::from_hms(3, 7, 33));
        assert!(plan.panels.disp_news);
        assert!(plan.panels.update_news);
    }
}
