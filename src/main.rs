/*
 *  main.rs
 *
 *  SkyDeck - eyes on the horizon
 *  (c) 2020-26 Stuart Hunter
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

use clap::{Arg, ArgAction, Command};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

mod config;
mod constants;
mod display;
mod events;
mod help;
mod lang;
mod menu;
mod news;
mod scheduler;
mod settings_app;
mod sun;
mod tick;
mod weather;

use display::headless::HeadlessSurface;
use display::surface::Surface;
use display::Dashboard;
use events::{EventSource, NullEventSource};
use tick::Tick;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

/// Wait for SIGINT, SIGTERM or SIGHUP; the loop side of the select!
/// tears the process down when this returns.
async fn signal_handler() -> Result<(), Box<dyn std::error::Error>> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Desktop weather station: time, conditions, forecasts, world clocks and news")
        .arg(Arg::new("debug")
        .action(ArgAction::SetTrue)
        .long("debug")
        .short('v')
        .alias("verbose")
        .help("Enable debug log level")
        .required(false))
        .arg(Arg::new("config")
        .short('c')
        .long("config")
        .help("Configuration file (YAML); searched in standard locations otherwise")
        .required(false))
        .arg(Arg::new("clock")
        .action(ArgAction::SetTrue)
        .long("clock")
        .help("Start in clock-only mode regardless of configuration")
        .required(false))
        .arg(Arg::new("firstrun")
        .index(1)
        .hide(true)
        .required(false))
        .after_help("SkyDeck:\
            \nweather station dashboard\
            \n\n\tClock, Weather, Forecasts, World Clocks and News\
            \n\n\
            CONTROLS:\
            \n\t1-9 location, c clock, w weather, a/b news,\
            \n\ts settings, m menu, h help, q quit.")
        .get_matches();

    let debug_enabled = matches.get_flag("debug");
    let clock_override = matches.get_flag("clock");
    let config_path = matches.get_one::<String>("config").map(PathBuf::from);
    // Any stray positional argument routes straight into the help
    // screen on the first iteration.
    let first_run_help = matches.get_one::<String>("firstrun").is_some();

    env_logger::Builder::from_env(Env::default().default_filter_or(if debug_enabled {"debug"} else {"info"}))
        .format_timestamp_secs()
        .init();

    info!("{} - eyes on the horizon", env!("CARGO_PKG_NAME"));
    info!("v.{} built {}", env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let mut cfg = config::load(config_path.as_deref())?;
    if clock_override {
        cfg.clock_mode = true;
    }
    let first_install = cfg.first_install;

    // The only fatal error in this program: no usable surface.
    let mut surface = HeadlessSurface::new(cfg.display.width, cfg.display.height)?;
    let mut event_source: Box<dyn EventSource> = Box::new(NullEventSource);

    let mut dashboard = Dashboard::new(cfg, config_path, surface.dimensions(), None)?;

    if first_run_help {
        dashboard.open_help(&mut surface)?;
    } else if first_install {
        info!("First install: opening the settings editor");
        dashboard.open_settings();
    }

    tokio::select! {
        _ = signal_handler() => {
            // Logged inside; fall through to teardown.
        }

        _ = async {
            loop {
                let tick = Tick::sample();

                if let Err(e) = dashboard.run_tick(&mut surface, &tick).await {
                    error!("Tick render failed: {}", e);
                }

                for event in event_source.poll() {
                    if let Err(e) = dashboard.handle_event(&mut surface, event).await {
                        error!("Event handling failed: {}", e);
                    }
                }

                if dashboard.should_quit() {
                    break;
                }

                // Sleep to the next second boundary, never a fixed
                // interval, so ticks stay locked to the wall clock.
                tick::sleep_until_next_second().await;
            }
        } => {
            info!("Closed application loop.");
        }
    }

    info!("Main application exiting.");
    Ok(())
}
