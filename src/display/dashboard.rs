/*
 *  display/dashboard.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  The dashboard owns every piece of per-panel state and runs the tick
 *  pass: plan panels, refresh data if the scheduler says so, render
 *  into dirty regions, and flush exactly once. It is the only thing
 *  that touches the surface.
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
use log::{error, info, warn};
use std::path::PathBuf;

use crate::config::{self, BackgroundMode, Config, NewsMode};
use crate::constants::{DEFAULT_BKG, NEWS_TICKER_SECS};
use crate::display::assets::{AssetKind, AssetStore};
use crate::display::color::Palette;
use crate::display::components::alert::AlertPanel;
use crate::display::components::clock::TimePanel;
use crate::display::components::clocks::WorldClocksPanel;
use crate::display::components::header::HeaderPanel;
use crate::display::components::ticker::NewsTicker;
use crate::display::components::weather::{CurrentConditionsPanel, ForecastPanel};
use crate::display::components::RenderCtx;
use crate::display::error::DisplayError;
use crate::display::layout::Layout;
use crate::display::mode_controller::{DisplayModeController, ModeControllerConfig, OverlayKind};
use crate::display::regions::DirtyRegions;
use crate::display::surface::Surface;
use crate::events::{Action, DispatchContext, EventDispatcher, InputEvent};
use crate::help::HelpScreen;
use crate::menu::{MenuAction, QuickMenu};
use crate::news::{NewsClient, NewsSlot};
use crate::scheduler::UpdateScheduler;
use crate::settings_app::{NoopSettingsEditor, SettingsEditor, SettingsSupervisor};
use crate::sun;
use crate::tick::Tick;
use crate::weather::WeatherClient;

pub type SettingsFactory = Box<dyn Fn() -> Box<dyn SettingsEditor> + Send>;

pub struct Dashboard {
    cfg: Config,
    config_path: Option<PathBuf>,
    palette: Palette,
    layout: Layout,
    assets: AssetStore,
    controller: DisplayModeController,
    scheduler: UpdateScheduler,
    weather: WeatherClient,
    news: NewsClient,
    dispatcher: EventDispatcher,
    header: HeaderPanel,
    time: TimePanel,
    current: CurrentConditionsPanel,
    forecast: ForecastPanel,
    clocks: WorldClocksPanel,
    alert: AlertPanel,
    ticker: NewsTicker,
    dirty: DirtyRegions,
    settings: SettingsSupervisor,
    settings_factory: SettingsFactory,
    menu: Option<QuickMenu>,
    help: Option<HelpScreen>,
    /// Background code currently painted, None forces a repaint.
    background_prev: Option<String>,
    location_index: usize,
    /// The scene under the ticker changed; restore-by-blit would show
    /// stale pixels, so the overlay exit full-redraws instead.
    changed_while_news: bool,
    quit: bool,
}

fn controller_config(cfg: &Config) -> ModeControllerConfig {
    ModeControllerConfig {
        clock_mode: cfg.clock_mode,
        news_mode: cfg.news_mode,
        ..ModeControllerConfig::default()
    }
}

/// Pull lat/lon out of a provider query fragment like
/// "lat=40.41&lon=-3.70".
fn parse_latlon(query: &str) -> Option<(f64, f64)> {
    let mut lat = None;
    let mut lon = None;
    for part in query.split('&') {
        if let Some(v) = part.strip_prefix("lat=") {
            lat = v.parse().ok();
        } else if let Some(v) = part.strip_prefix("lon=") {
            lon = v.parse().ok();
        }
    }
    Some((lat?, lon?))
}

impl Dashboard {
    pub fn new(
        cfg: Config,
        config_path: Option<PathBuf>,
        screen: Size,
        settings_factory: Option<SettingsFactory>,
    ) -> anyhow::Result<Self> {
        let palette = Palette::from_config(&cfg.palette);
        let layout = Layout::compute(screen);
        let assets = AssetStore::new(cfg.assets_dir.clone(), &cfg.icon_set);
        let mut controller = DisplayModeController::new(controller_config(&cfg));
        let scheduler = UpdateScheduler::new(&cfg);
        let weather = WeatherClient::new(&cfg)?;
        let news = NewsClient::new(&cfg)?;
        let clocks = WorldClocksPanel::new(cfg.time_zones.clone());

        // Seed dawn/dusk so the sunrise/sunset edges work before the
        // first successful fetch fills in the provider's values.
        let latlon = cfg
            .latitude
            .zip(cfg.longitude)
            .or_else(|| parse_latlon(&weather.location().query));
        if let Some((lat, lon)) = latlon {
            let times = sun::sun_times_today(lat, lon);
            controller.set_sun_times(&times.sunrise_hhmm(), &times.sunset_hhmm());
            info!("Sun times seeded: {} / {}", times.sunrise_hhmm(), times.sunset_hhmm());
        }

        Ok(Self {
            cfg,
            config_path,
            palette,
            layout,
            assets,
            controller,
            scheduler,
            weather,
            news,
            dispatcher: EventDispatcher::new(),
            header: HeaderPanel::new(),
            time: TimePanel::new(),
            current: CurrentConditionsPanel::new(),
            forecast: ForecastPanel::new(),
            clocks,
            alert: AlertPanel::new(),
            ticker: NewsTicker::new(),
            dirty: DirtyRegions::new(),
            settings: SettingsSupervisor::new(),
            settings_factory: settings_factory
                .unwrap_or_else(|| Box::new(|| Box::new(NoopSettingsEditor))),
            menu: None,
            help: None,
            background_prev: None,
            location_index: 0,
            changed_while_news: false,
            quit: false,
        })
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// One loop iteration: decide, refresh, render, flush.
    pub async fn run_tick(
        &mut self,
        surface: &mut dyn Surface,
        tick: &Tick,
    ) -> Result<(), DisplayError> {
        // Settings return has top priority: tear down and rebuild all
        // in-memory display state before anything repaints.
        if self.settings.reap() {
            self.controller.on_config_exit();
            self.reinit(surface);
            return Ok(());
        }

        let mut plan = self.controller.plan(tick);
        if plan.suppressed {
            // Menu/help/config own the screen; they repaint on
            // interaction, not on the tick.
            return Ok(());
        }
        let p = &mut plan.panels;
        let always_on = self.cfg.news_mode == NewsMode::AlwaysOn;

        if p.update_weather {
            let was_fallback = self.scheduler.weather.fallback_active();
            let updated = self
                .scheduler
                .maybe_refresh_weather(&mut self.weather, tick, true)
                .await;
            let fallback = self.scheduler.weather.fallback_active();
            self.controller.set_fallback(fallback);
            if fallback != was_fallback {
                // Apply the mode edge this tick; the queued redraw
                // would otherwise repaint again next tick.
                self.controller.absorb_pending_full();
                p.display_all = true;
            }
            if fallback {
                p.disp_weather = false;
                p.disp_clocks = true;
            } else if updated {
                let report = &self.weather.report;
                self.controller.set_sun_times(&report.sunrise, &report.sunset);
                if self.background_prev.as_deref() != Some(report.background_code.as_str()) {
                    p.display_all = true;
                }
            }
            if p.display_all {
                p.disp_header = true;
                p.disp_time = true;
                p.disp_sep = false;
            }
        }

        let clockish = self.controller.is_clockish();

        if p.display_all {
            self.paint_background(surface, clockish)?;
            if self.ticker.active() {
                self.changed_while_news = true;
            }
            self.dirty.mark_all();
        }

        let ctx = RenderCtx {
            palette: &self.palette,
            layout: &self.layout,
            lang: self.cfg.language(),
            units: self.cfg.units,
            show_background: self.cfg.show_background,
        };

        if p.disp_sep && !p.disp_time {
            let r = self.time.render_separator(surface, &ctx, tick.second)?;
            self.dirty.push(r);
        }

        if p.disp_header {
            let report = &self.weather.report;
            let moon = (!clockish && !report.night_time && !report.current.moon.is_empty())
                .then_some(report.current.moon);
            let name = self.cfg.locations[self.location_index].name.clone();
            let r = self.header.render(
                surface,
                &ctx,
                &mut self.assets,
                &name,
                &self.cfg.weather_source,
                moon,
            )?;
            self.dirty.push(r);
        }

        if p.disp_time {
            let r = self.time.render(surface, &ctx, clockish)?;
            self.dirty.push(r);
        }

        if p.disp_weather {
            let r = self
                .current
                .render(surface, &ctx, &mut self.assets, &self.weather.report)?;
            self.dirty.push(r);
            let r = self.forecast.render(
                surface,
                &ctx,
                &mut self.assets,
                &self.weather.report,
                self.cfg.dim_background,
            )?;
            self.dirty.push(r);
            let r = self.alert.render(
                surface,
                &ctx,
                &mut self.assets,
                self.weather.report.alert.as_ref(),
            )?;
            self.dirty.push(r);
        } else if p.disp_clocks {
            let r = self.clocks.render(surface, &ctx, tick)?;
            self.dirty.push(r);
        }

        if p.disp_news {
            if p.update_news {
                self.scheduler
                    .maybe_refresh_news(&mut self.news, tick, true)
                    .await;
            }
            // In period mode the update window only fetches; display
            // waits for the show window. Always-on shows immediately.
            let show_now = !p.update_news || always_on;
            if show_now && !self.news.titles.is_empty() && !self.ticker.active() {
                self.ticker.begin(&self.news.titles, NEWS_TICKER_SECS);
                self.controller.begin_news();
                self.changed_while_news = false;
            }
        }

        if self.ticker.active() {
            if self.ticker.finished() {
                let restored = self.ticker.end(surface, !self.changed_while_news)?;
                self.controller.end_news();
                match restored {
                    Some(r) => self.dirty.push(r),
                    None => self.controller.request_full_redraw(),
                }
                self.changed_while_news = false;
            } else {
                let r = self.ticker.advance(surface, &ctx)?;
                self.dirty.push(r);
            }
        }

        self.dirty.flush(surface)?;
        Ok(())
    }

    /// Paint the whole-screen background: weather artwork when weather
    /// drives it, the default artwork otherwise, plain fill as the last
    /// resort. Every panel's capture dies with the old background.
    fn paint_background(&mut self, surface: &mut dyn Surface, clockish: bool) -> Result<(), DisplayError> {
        let weather_art = self.cfg.show_background
            && self.cfg.background_mode == BackgroundMode::Weather
            && !clockish
            && !self.weather.report.background_code.is_empty();
        let code = if weather_art {
            self.weather.report.background_code.clone()
        } else {
            DEFAULT_BKG.to_string()
        };

        if self.cfg.show_background {
            match self.assets.get(
                surface,
                AssetKind::Background,
                &code,
                Some(self.layout.screen.size),
            ) {
                Some(img) => {
                    surface.blit(&img, Point::zero())?;
                    if self.cfg.dim_background && code != DEFAULT_BKG {
                        surface.dim_rect(self.layout.screen, 64)?;
                    }
                }
                None => surface.fill_rect(self.layout.screen, self.palette.background)?,
            }
        } else {
            surface.fill_rect(self.layout.screen, self.palette.background)?;
        }

        self.background_prev = Some(code);
        self.invalidate_panels();
        Ok(())
    }

    fn invalidate_panels(&mut self) {
        self.header.region.invalidate();
        self.time.region.invalidate();
        self.current.region.invalidate();
        self.forecast.region.invalidate();
        self.clocks.region.invalidate();
        self.alert.region.invalidate();
    }

    /// Route one input event: overlays first, then the key rules.
    pub async fn handle_event(
        &mut self,
        surface: &mut dyn Surface,
        event: InputEvent,
    ) -> Result<(), DisplayError> {
        if self.controller.config_running() {
            // The settings editor owns input; only quit gets through.
            if event == InputEvent::Quit {
                self.quit = true;
            }
            return Ok(());
        }

        if self.menu.is_some() {
            let action = self.menu.as_mut().unwrap().handle(event);
            match action {
                Some(a) => self.apply_menu_action(surface, a).await?,
                None => {
                    if let Some(menu) = self.menu.as_ref() {
                        menu.render(surface, &self.palette, &self.layout)?;
                    }
                }
            }
            return Ok(());
        }

        if let Some(help) = self.help.as_ref() {
            if help.handle(event) {
                self.help = None;
                self.controller.close_overlay();
            }
            return Ok(());
        }

        let ctx = DispatchContext {
            clock_mode: self.cfg.clock_mode,
            user_clock_mode: self.controller.user_clock_mode(),
            showing_menu: false,
            showing_config: false,
            location_count: self.cfg.locations.len(),
        };
        if let Some(action) = self.dispatcher.dispatch(event, &ctx) {
            self.apply_action(surface, action).await?;
        }
        Ok(())
    }

    async fn apply_action(
        &mut self,
        surface: &mut dyn Surface,
        action: Action,
    ) -> Result<(), DisplayError> {
        match action {
            Action::Quit => self.quit = true,
            Action::OpenMenu => self.open_menu(surface)?,
            Action::OpenHelp => self.open_help(surface)?,
            Action::OpenSettings => self.open_settings(),
            Action::SwitchLocation(i) => self.switch_location(i),
            Action::SetClockOnly => self.controller.set_user_clock_mode(true),
            Action::SetWeatherMode => {
                self.controller.set_user_clock_mode(false);
                self.scheduler.weather.reset_signature();
            }
            Action::ActivateNews(slot) => self.activate_news(slot).await,
            Action::RedrawRestored => self.controller.force_show_weather(),
        }
        Ok(())
    }

    async fn apply_menu_action(
        &mut self,
        surface: &mut dyn Surface,
        action: MenuAction,
    ) -> Result<(), DisplayError> {
        match action {
            MenuAction::SelectNewsSource(slot) => {
                // stays in the menu; rebuild so the selector flips
                self.news.select(slot);
                self.menu = Some(QuickMenu::build(
                    &self.cfg,
                    self.location_index,
                    self.news.active_slot(),
                    self.controller.is_clockish(),
                    false,
                ));
                if let Some(menu) = self.menu.as_ref() {
                    menu.render(surface, &self.palette, &self.layout)?;
                }
                return Ok(());
            }
            MenuAction::Back => self.close_menu(),
            MenuAction::SelectLocation(i) => {
                self.close_menu();
                self.switch_location(i);
            }
            MenuAction::ActivateNews => {
                self.close_menu();
                let slot = self.news.active_slot();
                self.activate_news(slot).await;
            }
            MenuAction::SetWeatherMode => {
                self.close_menu();
                self.controller.set_user_clock_mode(false);
                self.scheduler.weather.reset_signature();
            }
            MenuAction::SetClockOnly => {
                self.close_menu();
                self.controller.set_user_clock_mode(true);
            }
            MenuAction::OpenSettings => {
                self.close_menu();
                self.open_settings();
            }
            MenuAction::OpenHelp => {
                self.close_menu();
                self.open_help(surface)?;
            }
            MenuAction::Quit => {
                self.close_menu();
                self.quit = true;
            }
        }
        Ok(())
    }

    pub fn open_menu(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let menu = QuickMenu::build(
            &self.cfg,
            self.location_index,
            self.news.active_slot(),
            self.controller.is_clockish(),
            false,
        );
        menu.render(surface, &self.palette, &self.layout)?;
        self.menu = Some(menu);
        self.controller.open_overlay(OverlayKind::Menu);
        Ok(())
    }

    fn close_menu(&mut self) {
        self.menu = None;
        self.controller.close_overlay();
    }

    pub fn open_help(&mut self, surface: &mut dyn Surface) -> Result<(), DisplayError> {
        let help = HelpScreen::load(&self.cfg.help_file);
        help.render(surface, &self.palette, &self.layout)?;
        self.help = Some(help);
        self.controller.open_overlay(OverlayKind::Help);
        Ok(())
    }

    pub fn open_settings(&mut self) {
        if self.settings.launch((self.settings_factory)()) {
            self.controller.set_config_running();
        }
    }

    fn switch_location(&mut self, index: usize) {
        let Some(loc) = self.cfg.locations.get(index).cloned() else { return };
        self.location_index = index;
        self.controller.set_user_clock_mode(false);
        self.weather.set_location(loc);
        self.scheduler.weather.reset_signature();
        self.controller.request_weather_refresh();
        self.controller.request_full_redraw();
        self.background_prev = None;
    }

    async fn activate_news(&mut self, slot: NewsSlot) {
        self.news.select(slot);
        let tick = Tick::sample();
        self.scheduler
            .maybe_refresh_news(&mut self.news, &tick, true)
            .await;
        if !self.news.titles.is_empty() && !self.ticker.active() {
            self.ticker.begin(&self.news.titles, NEWS_TICKER_SECS);
            self.controller.begin_news();
            self.changed_while_news = false;
        }
    }

    /// Full teardown/reinit after the settings editor exits: reload
    /// config, rebuild clients, panels, caches and refresh state. The
    /// user's clock toggle and a running news overlay survive in the
    /// controller, per the restore contract.
    fn reinit(&mut self, surface: &mut dyn Surface) {
        match config::load(self.config_path.as_deref()) {
            Ok(cfg) => self.cfg = cfg,
            Err(e) => warn!("Keeping previous config; reload failed: {}", e),
        }

        self.palette = Palette::from_config(&self.cfg.palette);
        self.layout = Layout::compute(surface.dimensions());
        self.assets = AssetStore::new(self.cfg.assets_dir.clone(), &self.cfg.icon_set);
        self.scheduler = UpdateScheduler::new(&self.cfg);

        match WeatherClient::new(&self.cfg) {
            Ok(mut client) => {
                if self.location_index >= self.cfg.locations.len() {
                    self.location_index = 0;
                }
                client.set_location(self.cfg.locations[self.location_index].clone());
                self.weather = client;
            }
            Err(e) => error!("Keeping previous weather client; rebuild failed: {}", e),
        }
        match NewsClient::new(&self.cfg) {
            Ok(client) => self.news = client,
            Err(e) => error!("Keeping previous news client; rebuild failed: {}", e),
        }

        self.header = HeaderPanel::new();
        self.time = TimePanel::new();
        self.current = CurrentConditionsPanel::new();
        self.forecast = ForecastPanel::new();
        self.clocks = WorldClocksPanel::new(self.cfg.time_zones.clone());
        self.alert = AlertPanel::new();
        self.ticker = NewsTicker::new();
        self.dirty = DirtyRegions::new();
        self.controller.end_news();
        self.background_prev = None;
        self.changed_while_news = false;
        info!("Dashboard state reinitialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::surface::MockSurface;

    fn dashboard() -> Dashboard {
        let mut cfg = Config::default();
        cfg.news_mode = NewsMode::Period;
        // fail the (unreachable) initial fetch immediately instead of
        // waiting out the default network timeout
        cfg.timeout_ms = 2;
        Dashboard::new(cfg, None, Size::new(1024, 600), None).unwrap()
    }

    /// Drive one tick and return the surface for inspection.
    async fn drive(d: &mut Dashboard, tick: Tick) -> MockSurface {
        let mut surface = MockSurface::new(1024, 600);
        d.run_tick(&mut surface, &tick).await.unwrap();
        surface
    }

    #[tokio::test]
    async fn test_first_tick_is_full_flush_only() {
        let mut d = dashboard();
        // avoid the initial forced weather fetch hitting the network:
        // the first planned tick carries update_weather, which fails
        // fast against the unreachable default endpoint and falls back
        // to clock-only. Either way the flush must be full, and only
        // full.
        let surface = drive(&mut d, Tick::from_hms(10, 7, 3)).await;
        assert_eq!(surface.flush_full_count, 1);
        assert!(surface.flushed_regions.is_empty());
    }

    #[tokio::test]
    async fn test_time_only_tick_flushes_only_time_rect() {
        let mut d = dashboard();
        let _ = drive(&mut d, Tick::from_hms(10, 7, 3)).await;
        // degraded or not, a plain minute rollover in clock-only mode
        // repaints time + clocks; at :30 seconds only the separator.
        let surface = drive(&mut d, Tick::from_hms(10, 7, 30)).await;
        assert_eq!(surface.flush_full_count, 0);
        assert_eq!(surface.flushed_regions.len(), 1);
        assert_eq!(surface.flushed_regions[0].len(), 1, "separator rect only");
    }

    #[tokio::test]
    async fn test_menu_suppresses_tick_rendering() {
        let mut d = dashboard();
        let _ = drive(&mut d, Tick::from_hms(10, 7, 3)).await;
        let mut surface = MockSurface::new(1024, 600);
        d.open_menu(&mut surface).unwrap();
        assert_eq!(surface.flush_full_count, 1, "menu painted once on open");

        let surface = drive(&mut d, Tick::from_hms(10, 8, 0)).await;
        assert_eq!(surface.flush_full_count, 0);
        assert!(surface.flushed_regions.is_empty());
    }

    #[tokio::test]
    async fn test_menu_close_forces_full_redraw() {
        let mut d = dashboard();
        let _ = drive(&mut d, Tick::from_hms(10, 7, 3)).await;
        let mut surface = MockSurface::new(1024, 600);
        d.open_menu(&mut surface).unwrap();
        d.handle_event(&mut surface, InputEvent::Key(crate::events::Key::Quit))
            .await
            .unwrap();
        let surface = drive(&mut d, Tick::from_hms(10, 8, 1)).await;
        assert_eq!(surface.flush_full_count, 1);
        assert!(surface.flushed_regions.is_empty());
    }

    #[test]
    fn test_parse_latlon() {
        assert_eq!(parse_latlon("lat=40.41&lon=-3.70"), Some((40.41, -3.70)));
        assert_eq!(parse_latlon("q=Madrid"), None);
    }
}
