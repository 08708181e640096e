/*
 *  tick.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Frame clock. One Tick is sampled per loop iteration and is the only
 *  notion of "now" the mode controller and scheduler see, so a whole
 *  iteration observes one consistent wall-clock instant.
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

use chrono::{Local, Timelike};
use std::time::Duration;

/// A wall-clock sample driving one loop iteration. Ephemeral; resampled
/// every iteration and never stored.
#[derive(Debug, Clone)]
pub struct Tick {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    /// "HH:MM", for sunrise/sunset edge comparison and header stamps.
    pub hhmm: String,
}

impl Tick {
    /// Sample the local wall clock. Never fails; clock skew simply shows
    /// up as whatever the OS reports.
    pub fn sample() -> Self {
        let now = Local::now();
        Self::from_hms(now.hour(), now.minute(), now.second())
    }

    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Self {
        Tick {
            hour,
            minute,
            second,
            hhmm: format!("{:02}:{:02}", hour, minute),
        }
    }

    /// True exactly once per minute; the synchronization point for all
    /// once-per-minute work.
    pub fn second_rollover(&self) -> bool {
        self.second == 0
    }

    /// Top of the hour.
    pub fn minute_rollover(&self) -> bool {
        self.minute == 0 && self.second == 0
    }

    /// Sunrise/sunset edge detection against an "HH:MM" string.
    pub fn matches(&self, hhmm: &str) -> bool {
        self.hhmm == hhmm
    }
}

/// Sleep until the next wall-clock second boundary. Sleeping a fixed
/// interval instead would drift against the clock and eventually skip
/// the `second == 0` rollover entirely.
pub async fn sleep_until_next_second() {
    let millis = Local::now().timestamp_subsec_millis() as u64;
    tokio::time::sleep(Duration::from_millis(1000u64.saturating_sub(millis).max(1))).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollover_edges() {
        let t = Tick::from_hms(13, 0, 0);
        assert!(t.second_rollover());
        assert!(t.minute_rollover());

        let t = Tick::from_hms(13, 5, 0);
        assert!(t.second_rollover());
        assert!(!t.minute_rollover());

        let t = Tick::from_hms(13, 0, 30);
        assert!(!t.second_rollover());
        assert!(!t.minute_rollover());
    }

    #[test]
    fn test_hhmm_match() {
        let t = Tick::from_hms(6, 51, 0);
        assert!(t.matches("06:51"));
        assert!(!t.matches("06:52"));
    }
}
