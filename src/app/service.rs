//! Simulation service: the hexagonal core.
//!
//! [`SimService`] owns the engine controller, safety monitor and
//! annunciator.  It turns variable wall-clock frames into fixed simulation
//! steps and applies external commands at tick boundaries.  All output
//! flows through an [`EventSink`] injected at call sites, making the whole
//! service testable with a recording sink.
//!
//! ```text
//!  SimCommand ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                 │          SimService           │
//!  frame dt   ──▶ │ Controller · Safety · Alerts  │
//!                 └──────────────────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use log::{info, warn};

use crate::annunciator::Annunciator;
use crate::config::SimConfig;
use crate::controller::EngineController;
use crate::engine::Side;
use crate::fsm::EngineState;
use crate::noise::NoiseSource;
use crate::safety::SafetyMonitor;
use crate::sensors::{Channel as SensorChannel, Quantity};

use super::commands::SimCommand;
use super::events::{SimEvent, TelemetryData};
use super::ports::EventSink;

/// Absorbs float drift in the step accumulator.
const STEP_EPSILON: f64 = 1e-9;

// ───────────────────────────────────────────────────────────────
// SimService
// ───────────────────────────────────────────────────────────────

/// The simulation service orchestrates all domain logic.
pub struct SimService {
    engine: EngineController,
    safety: SafetyMonitor,
    annunciator: Annunciator,
    /// Fixed step length in seconds.
    step_secs: f64,
    /// Longest wall-clock frame accepted by `pump`.
    max_frame_secs: f64,
    /// Unsimulated wall-clock time carried between frames.
    accumulator: f64,
    tick_count: u64,
    /// Condition bitmask from the latest safety pass.
    conditions: u16,
    quit_requested: bool,
}

impl SimService {
    /// Construct the service with entropy-seeded noise.
    pub fn new(config: SimConfig) -> Self {
        Self::from_engine(EngineController::new(config))
    }

    /// Construct the service with an injected noise source.
    pub fn with_noise(config: SimConfig, noise: impl NoiseSource + Send + 'static) -> Self {
        Self::from_engine(EngineController::with_noise(config, noise))
    }

    fn from_engine(engine: EngineController) -> Self {
        let config = engine.config();
        Self {
            safety: SafetyMonitor::new(config),
            annunciator: Annunciator::new(config.alert_hold_secs),
            step_secs: config.step_secs,
            max_frame_secs: config.max_frame_secs,
            accumulator: 0.0,
            tick_count: 0,
            conditions: 0,
            quit_requested: false,
            engine,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the initial state.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&SimEvent::Started(self.engine.state()));
        info!(
            "SimService started in {:?}, step {} ms",
            self.engine.state(),
            self.step_secs * 1000.0
        );
    }

    // ── Per-frame orchestration ───────────────────────────────

    /// Consume one wall-clock frame of `frame_dt` seconds.
    ///
    /// The frame is clamped to the configured maximum so a stalled host
    /// cannot make the simulation jump, then spent in whole fixed steps.
    /// Any remainder carries over to the next frame.  Returns the number
    /// of steps run.
    pub fn pump(&mut self, frame_dt: f64, sink: &mut impl EventSink) -> u32 {
        let frame = if frame_dt.is_nan() {
            0.0
        } else {
            frame_dt.clamp(0.0, self.max_frame_secs)
        };
        self.accumulator += frame;

        let mut steps = 0;
        while self.accumulator + STEP_EPSILON >= self.step_secs {
            self.step(sink);
            self.accumulator -= self.step_secs;
            steps += 1;
        }
        steps
    }

    /// Run one fixed step: advance → safety → annunciator.
    pub fn step(&mut self, sink: &mut impl EventSink) {
        self.tick_count += 1;
        let prev_state = self.engine.state();

        // 1. Physics, sensors, fuel
        self.engine.advance(self.step_secs);

        // 2. Safety evaluation (may command a shutdown)
        let report = self.safety.apply(&mut self.engine);
        self.conditions = report.conditions;
        if report.shutdown_commanded {
            let reason = report.most_severe().map_or("safety", |a| a.message);
            warn!("Automatic shutdown: {reason}");
            sink.emit(&SimEvent::ShutdownCommanded { reason });
        }

        // 3. Annunciator
        for alert in &report.alerts {
            if self.annunciator.raise(alert) {
                sink.emit(&SimEvent::AlertRaised(alert.clone()));
            }
        }
        self.annunciator.expire(self.engine.sim_time());

        // 4. Emit state change if the lifecycle moved
        self.emit_transition(prev_state, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Apply an external command at the current tick boundary.
    pub fn handle_command(&mut self, cmd: SimCommand, sink: &mut impl EventSink) {
        let prev_state = self.engine.state();
        let e = &mut self.engine;

        match cmd {
            SimCommand::Start => {
                if prev_state != EngineState::Off {
                    sink.emit(&SimEvent::CommandIgnored("start: engines not off"));
                }
                e.start();
                if prev_state == EngineState::Off && e.state() == EngineState::Starting {
                    self.annunciator.clear();
                }
            }
            SimCommand::Stop => {
                if matches!(prev_state, EngineState::Off | EngineState::Stopping) {
                    sink.emit(&SimEvent::CommandIgnored("stop: engines not running"));
                }
                e.stop();
            }
            SimCommand::ThrustUp | SimCommand::ThrustDown => {
                if prev_state != EngineState::Stable {
                    sink.emit(&SimEvent::CommandIgnored("thrust: engines not stable"));
                } else if cmd == SimCommand::ThrustUp {
                    e.increase_thrust();
                } else {
                    e.decrease_thrust();
                }
            }
            SimCommand::Quit => {
                info!("Quit requested");
                self.quit_requested = true;
            }
            SimCommand::ForceSensor { sensor, value } => {
                info!("Forcing {sensor} to {value}");
                e.set_forced_sensor(sensor.side, sensor.quantity, sensor.channel, value);
            }
            SimCommand::StickSensor(sensor) => {
                info!("Sticking {sensor}");
                e.set_sensor_stuck(sensor.side, sensor.quantity, sensor.channel, true);
            }
            SimCommand::ResetSensor(sensor) => {
                info!("Resetting {sensor}");
                e.set_sensor_stuck(sensor.side, sensor.quantity, sensor.channel, false);
                e.reset_sensor_override(sensor.side, sensor.quantity, sensor.channel);
            }
            SimCommand::ForceFuelReserve(value) => {
                info!("Forcing fuel reserve to {value}");
                e.set_forced_fuel_reserve(value);
            }
            SimCommand::InvalidateFuelReserve => {
                info!("Fuel reserve sensor marked invalid");
                e.set_fuel_reserve_sensor_invalid(true);
            }
            SimCommand::ResetFuelReserve => {
                info!("Fuel reserve restored");
                e.reset_fuel_reserve_override();
                e.set_fuel_reserve_sensor_invalid(false);
            }
            SimCommand::ForceFuelFlow(value) => {
                info!("Forcing fuel flow to {value}");
                e.set_forced_fuel_flow(value);
            }
            SimCommand::InvalidateFuelFlow => {
                info!("Fuel flow sensor marked invalid");
                e.set_fuel_flow_sensor_invalid(true);
            }
            SimCommand::ResetFuelFlow => {
                info!("Fuel flow override cleared");
                e.reset_forced_fuel_flow();
                e.set_fuel_flow_sensor_invalid(false);
            }
        }

        self.emit_transition(prev_state, sink);
    }

    /// Apply every command queued on `channel`.  Returns how many were
    /// applied.
    pub fn drain_commands<M: RawMutex, const N: usize>(
        &mut self,
        channel: &Channel<M, SimCommand, N>,
        sink: &mut impl EventSink,
    ) -> usize {
        let mut applied = 0;
        while let Ok(cmd) = channel.try_receive() {
            self.handle_command(cmd, sink);
            applied += 1;
        }
        applied
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot of every displayed value.
    pub fn build_telemetry(&self) -> TelemetryData {
        let e = &self.engine;
        let channels = |q: Quantity| {
            Side::BOTH.map(|s| SensorChannel::BOTH.map(|ch| e.sensor_value(s, q, ch)))
        };
        TelemetryData {
            sim_time: e.sim_time(),
            state: e.state(),
            sub_state: e.sub_state(),
            n1: Side::BOTH.map(|s| e.n1(s)),
            n1_pct: Side::BOTH.map(|s| e.n1_percentage(s)),
            egt: Side::BOTH.map(|s| e.egt(s)),
            n1_channels: channels(Quantity::N1),
            egt_channels: channels(Quantity::Egt),
            fuel_reserve: e.fuel_reserve(),
            fuel_flow: e.fuel_flow(),
            conditions: self.conditions,
            master_alert: self.annunciator.master().map(|a| a.message),
        }
    }

    pub fn engine(&self) -> &EngineController {
        &self.engine
    }

    pub fn annunciator(&self) -> &Annunciator {
        &self.annunciator
    }

    /// Fixed steps executed since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn step_secs(&self) -> f64 {
        self.step_secs
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    // ── Internal ──────────────────────────────────────────────

    fn emit_transition(&self, from: EngineState, sink: &mut impl EventSink) {
        let to = self.engine.state();
        if to != from {
            sink.emit(&SimEvent::StateChanged { from, to });
        }
    }
}
