/*
 *  scheduler.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Decides, per tick, whether a data source is eligible for a network
 *  refresh, independent of whether a repaint also happens. Fetch and
 *  display of news are deliberately decoupled windows so the ticker
 *  shows content fetched seconds earlier.
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

use log::{error, info, warn};

use crate::config::{Config, NewsMode};
use crate::constants::{
    ERR_MAX, NEWS_PERIOD_MIN, NEWS_SHOW_SECOND, NEWS_UPDATE_SECOND, WEATHER_PERIOD_MIN,
    WEATHER_REFRESH_SECOND,
};
use crate::news::NewsClient;
use crate::tick::Tick;
use crate::weather::WeatherClient;

/// Fetch bookkeeping for one data source.
#[derive(Debug, Default)]
pub struct RefreshState {
    last_signature: String,
    consecutive_errors: u32,
    fallback_active: bool,
    never_succeeded: bool,
}

impl RefreshState {
    pub fn new() -> Self {
        RefreshState {
            last_signature: String::new(),
            consecutive_errors: 0,
            fallback_active: false,
            never_succeeded: true,
        }
    }

    /// A fetch parsed cleanly. Clears the error run and the fallback
    /// latch - the only thing that ever clears it. Returns true when
    /// the content signature differs from the previous fetch (or the
    /// caller forced it), i.e. a repaint is warranted.
    pub fn record_success(&mut self, signature: &str, force: bool) -> bool {
        self.consecutive_errors = 0;
        if self.fallback_active {
            info!("Refresh recovered; leaving degraded mode");
        }
        self.fallback_active = false;
        self.never_succeeded = false;

        let updated = force || signature != self.last_signature;
        if updated {
            self.last_signature = signature.to_string();
        }
        updated
    }

    /// A fetch failed. The fallback latches on the very first run (no
    /// stale data to keep showing) or once the run of failures exceeds
    /// `err_max`. Returns the latch state.
    pub fn record_failure(&mut self, err_max: u32) -> bool {
        self.consecutive_errors += 1;
        if self.never_succeeded || self.consecutive_errors > err_max {
            self.fallback_active = true;
        }
        self.fallback_active
    }

    /// Forget the last signature so the next success always reports
    /// updated (location switches, settings return).
    pub fn reset_signature(&mut self) {
        self.last_signature.clear();
    }

    pub fn fallback_active(&self) -> bool {
        self.fallback_active
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }
}

pub struct UpdateScheduler {
    pub weather: RefreshState,
    pub news: RefreshState,
    always_on_news: bool,
    err_max: u32,
}

impl UpdateScheduler {
    pub fn new(cfg: &Config) -> Self {
        UpdateScheduler {
            weather: RefreshState::new(),
            news: RefreshState::new(),
            always_on_news: cfg.news_mode == NewsMode::AlwaysOn,
            err_max: ERR_MAX,
        }
    }

    /// Weather fetch eligibility. `relaxed` widens the second match to
    /// the whole eligible minute (full-redraw ticks piggyback on it).
    pub fn weather_window(&self, tick: &Tick, relaxed: bool) -> bool {
        (tick.minute + 1) % WEATHER_PERIOD_MIN == 0
            && (tick.second == WEATHER_REFRESH_SECOND || relaxed || self.always_on_news)
    }

    /// News fetch window: late in the minute before the show window.
    pub fn news_update_window(&self, tick: &Tick) -> bool {
        (tick.minute + 1) % NEWS_PERIOD_MIN == 0 && tick.second == NEWS_UPDATE_SECOND
    }

    /// News display window: content fetched in the update window goes
    /// on screen here, masking fetch latency.
    pub fn news_show_window(&self, tick: &Tick) -> bool {
        tick.minute % NEWS_PERIOD_MIN == 0 && tick.second == NEWS_SHOW_SECOND
    }

    /// Fetch weather if the window is open or the caller forces it.
    /// Idempotent no-op otherwise. Network and parse failures are
    /// absorbed here: logged, counted, reported as `updated = false`.
    pub async fn maybe_refresh_weather(
        &mut self,
        client: &mut WeatherClient,
        tick: &Tick,
        force_full: bool,
    ) -> bool {
        if !(force_full || self.weather_window(tick, false)) {
            return false;
        }
        match client.refresh().await {
            Ok(()) => self.weather.record_success(&client.signature(), force_full),
            Err(e) => {
                error!(
                    "Weather update failed ({} consecutive): {}",
                    self.weather.consecutive_errors() + 1,
                    e
                );
                if self.weather.record_failure(self.err_max) {
                    warn!("Weather stale; falling back to world clocks");
                }
                false
            }
        }
    }

    /// Fetch news if the update window is open or the caller forces it
    /// (menu action, source hotkey). Same failure absorption as
    /// weather, but news failures never degrade the display mode.
    pub async fn maybe_refresh_news(
        &mut self,
        client: &mut NewsClient,
        tick: &Tick,
        force: bool,
    ) -> bool {
        if !(force || self.news_update_window(tick)) {
            return false;
        }
        match client.refresh(tick).await {
            Ok(()) => self.news.record_success(&client.titles.clone(), force),
            Err(e) => {
                error!("News update failed: {}", e);
                self.news.record_failure(self.err_max);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn scheduler() -> UpdateScheduler {
        UpdateScheduler::new(&Config::default())
    }

    #[test]
    fn test_weather_window_fires_on_schedule() {
        let s = scheduler();
        // WEATHER_PERIOD_MIN = 15: minutes 14, 29, 44, 59 at second 20
        assert!(s.weather_window(&Tick::from_hms(10, 14, 20), false));
        assert!(s.weather_window(&Tick::from_hms(10, 59, 20), false));
        assert!(!s.weather_window(&Tick::from_hms(10, 14, 21), false));
        assert!(!s.weather_window(&Tick::from_hms(10, 15, 20), false));
        // relaxed widens the second but not the minute
        assert!(s.weather_window(&Tick::from_hms(10, 14, 0), true));
        assert!(!s.weather_window(&Tick::from_hms(10, 15, 0), true));
    }

    #[test]
    fn test_news_windows_never_coincide() {
        let s = scheduler();
        for minute in 0..60 {
            for second in 0..60 {
                let t = Tick::from_hms(12, minute, second);
                assert!(
                    !(s.news_update_window(&t) && s.news_show_window(&t)),
                    "update and show coincide at {:02}:{:02}",
                    minute,
                    second
                );
            }
        }
        // and both actually fire somewhere in the cycle
        assert!(s.news_update_window(&Tick::from_hms(12, 4, 50)));
        assert!(s.news_show_window(&Tick::from_hms(12, 5, 0)));
    }

    #[test]
    fn test_first_run_failure_latches_fallback() {
        let mut st = RefreshState::new();
        assert!(st.record_failure(3), "first-run failure must degrade immediately");
        assert!(st.fallback_active());
    }

    #[test]
    fn test_fallback_needs_threshold_after_first_success() {
        let mut st = RefreshState::new();
        st.record_success("sig", false);
        assert!(!st.record_failure(3));
        assert!(!st.record_failure(3));
        assert!(!st.record_failure(3));
        assert!(st.record_failure(3), "fourth consecutive failure exceeds err_max=3");
    }

    #[test]
    fn test_fallback_cleared_only_by_success() {
        let mut st = RefreshState::new();
        st.record_failure(0);
        assert!(st.fallback_active());
        // further failures keep it latched; nothing time-based clears it
        st.record_failure(0);
        assert!(st.fallback_active());
        st.record_success("sig", false);
        assert!(!st.fallback_active());
        assert_eq!(st.consecutive_errors(), 0);
    }

    #[test]
    fn test_signature_idempotence() {
        let mut st = RefreshState::new();
        assert!(st.record_success("abc", false), "first fetch always reports updated");
        assert!(
            !st.record_success("abc", false),
            "identical payload signature must report updated=false"
        );
        assert!(st.record_success("abd", false));
        assert!(st.record_success("abd", true), "force overrides signature stability");
    }

    #[test]
    fn test_reset_signature_forces_next_update() {
        let mut st = RefreshState::new();
        st.record_success("abc", false);
        st.reset_signature();
        assert!(st.record_success("abc", false));
    }
}
