/*
 *  settings_app.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
 *
 *  Supervisor for the settings-editor sub-application. The editor is a
 *  collaborator that runs on its own thread; the render loop polls its
 *  liveness once per tick and never blocks on it, and the dashboard
 *  performs a full state reinitialization once it has exited. The
 *  editor must not touch the graphics surface - that is owned by the
 *  main loop thread.
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

use log::{info, warn};
use std::thread::JoinHandle;

/// The settings-editor collaborator. Implementations typically edit
/// the YAML config in place and return when the user closes them.
pub trait SettingsEditor: Send + 'static {
    fn run(self: Box<Self>);
}

/// Editor stub for hosts without a settings UI; exits immediately so
/// the dashboard just reloads its config.
pub struct NoopSettingsEditor;

impl SettingsEditor for NoopSettingsEditor {
    fn run(self: Box<Self>) {}
}

#[derive(Default)]
pub struct SettingsSupervisor {
    handle: Option<JoinHandle<()>>,
}

impl SettingsSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the editor thread. Refused while one is already running.
    pub fn launch(&mut self, editor: Box<dyn SettingsEditor>) -> bool {
        if self.is_running() {
            warn!("Settings editor already running");
            return false;
        }
        info!("Launching settings editor");
        self.handle = Some(std::thread::spawn(move || editor.run()));
        true
    }

    /// Editor thread alive right now. Non-blocking.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// If the editor has exited since the last poll, join it and report
    /// true exactly once - the dashboard's cue to reinitialize.
    pub fn reap(&mut self) -> bool {
        let finished = self.handle.as_ref().is_some_and(|h| h.is_finished());
        if finished {
            if let Some(h) = self.handle.take() {
                if h.join().is_err() {
                    warn!("Settings editor thread panicked");
                }
            }
            info!("Settings editor exited; reinitializing dashboard state");
        }
        finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct SlowEditor {
        done: Arc<AtomicBool>,
    }

    impl SettingsEditor for SlowEditor {
        fn run(self: Box<Self>) {
            std::thread::sleep(Duration::from_millis(30));
            self.done.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_lifecycle_launch_poll_reap() {
        let done = Arc::new(AtomicBool::new(false));
        let mut sup = SettingsSupervisor::new();
        assert!(!sup.reap(), "nothing to reap before launch");
        assert!(sup.launch(Box::new(SlowEditor { done: done.clone() })));
        assert!(sup.is_running());
        // a second launch while running is refused
        assert!(!sup.launch(Box::new(NoopSettingsEditor)));

        while sup.is_running() {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(done.load(Ordering::SeqCst));
        assert!(sup.reap(), "first poll after exit reports it");
        assert!(!sup.reap(), "reap reports an exit exactly once");
        // and a new editor can be launched afterwards
        assert!(sup.launch(Box::new(NoopSettingsEditor)));
    }
}
