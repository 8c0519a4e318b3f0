//! Twinspool: headless trainer driver.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  stdin reader thread                                     │
//! │    line ──▶ SimCommand::parse ──▶ CMD_CHANNEL            │
//! │                                      │                   │
//! │  ───────────── bounded channel ──────┼──────────────     │
//! │                                      ▼                   │
//! │  main loop (wall-clock paced)                            │
//! │    drain_commands ──▶ pump(frame) ──▶ LogEventSink       │
//! │                         │                                │
//! │            EngineController · SafetyMonitor · Annunciator │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `twinspool [--json] [config.json]`.  `RUST_LOG` controls
//! verbosity; `info` by default.

use std::io::BufRead;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{info, warn};

use twinspool::adapters::log_sink::LogEventSink;
use twinspool::app::channels::CMD_CHANNEL;
use twinspool::app::commands::SimCommand;
use twinspool::app::events::SimEvent;
use twinspool::app::ports::EventSink;
use twinspool::app::service::SimService;
use twinspool::error::CommandError;
use twinspool::SimConfig;

const USAGE: &str = "commands: start | stop | thrust up|down | quit\n  \
    set <N1|EGT>_<L|R><1|2> fail|stuck\n  \
    set N1_xx overspeed amber|red | set EGT_xx overtemp amber|red\n  \
    set FUEL_RES low|invalid | set FUEL_FLOW invalid|value <n>\n  \
    reset <sensor>|FUEL_RES|FUEL_FLOW";

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Twinspool v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let mut json = false;
    let mut config_path = None;
    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else {
            config_path = Some(arg);
        }
    }
    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            let config =
                SimConfig::from_json(&text).with_context(|| format!("loading config {path}"))?;
            info!("Configuration loaded from {path}");
            config
        }
        None => SimConfig::default(),
    };

    // ── 3. Console reader ─────────────────────────────────────
    std::thread::Builder::new()
        .name("console".into())
        .spawn(read_console)
        .context("spawning console thread")?;
    info!("{USAGE}");

    // ── 4. Service ────────────────────────────────────────────
    let mut sink = if json {
        LogEventSink::json()
    } else {
        LogEventSink::new()
    };
    let mut service = SimService::new(config);
    service.start(&mut sink);

    // ── 5. Fixed-step loop ────────────────────────────────────
    let pace = Duration::from_secs_f64(service.step_secs());
    let mut last = Instant::now();
    let mut last_second: Option<f64> = None;

    while !service.quit_requested() {
        service.drain_commands(&CMD_CHANNEL, &mut sink);

        let now = Instant::now();
        service.pump(now.duration_since(last).as_secs_f64(), &mut sink);
        last = now;

        // Once per simulated second; the clock restarts with each start.
        let second = service.engine().sim_time().floor();
        if last_second != Some(second) {
            sink.emit(&SimEvent::Telemetry(service.build_telemetry()));
            last_second = Some(second);
        }

        std::thread::sleep(pace);
    }

    info!("Session ended at t={:.1}s", service.engine().sim_time());
    Ok(())
}

/// Parse console lines into the command channel until `quit` or EOF.
fn read_console() {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match SimCommand::parse(&line) {
            Ok(cmd) => {
                if CMD_CHANNEL.try_send(cmd).is_err() {
                    warn!("Command queue full, dropped: {}", line.trim());
                }
                if cmd == SimCommand::Quit {
                    return;
                }
            }
            Err(CommandError::Empty) => {}
            Err(e) => warn!("{e}: {}", line.trim()),
        }
    }
    // EOF ends the session.
    while CMD_CHANNEL.try_send(SimCommand::Quit).is_err() {
        std::thread::sleep(Duration::from_millis(10));
    }
}
