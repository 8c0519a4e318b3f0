//! Engine controller: the aggregate root of the simulation.
//!
//! [`EngineController`] owns the lifecycle FSM and the plant context (both
//! engines, the fuel system, the noise source) and exposes the command,
//! query and fault-injection surfaces.  It never fails: abnormal
//! situations show up as NaN readings and flags for the
//! [`SafetyMonitor`](crate::safety::SafetyMonitor) to pick up.
//!
//! ```text
//!  advance(dt):  FSM.on_update ─▶ sensor channels ─▶ fuel model
//! ```

use log::{info, warn};

use crate::config::SimConfig;
use crate::engine::{EngineUnit, Side};
use crate::fsm::context::PlantContext;
use crate::fsm::states::build_state_table;
use crate::fsm::{EngineState, Fsm, SubState};
use crate::noise::{self, NoiseSource};
use crate::sensors::{Channel, FuelSystem, Quantity};

/// The twin-engine simulation.
pub struct EngineController {
    fsm: Fsm,
    ctx: PlantContext,
    sim_elapsed: f64,
}

impl EngineController {
    /// Controller with noise seeded from OS entropy.
    pub fn new(config: SimConfig) -> Self {
        Self::with_noise(config, noise::from_entropy())
    }

    /// Controller drawing its noise from `noise`.
    pub fn with_noise(config: SimConfig, noise: impl NoiseSource + Send + 'static) -> Self {
        let mut ctx = PlantContext::new(config, Box::new(noise));
        let mut fsm = Fsm::new(build_state_table(), EngineState::Off);
        fsm.start(&mut ctx);
        Self {
            fsm,
            ctx,
            sim_elapsed: 0.0,
        }
    }

    // ── Commands ──────────────────────────────────────────────

    /// Begin the start sequence.  Ignored unless the engines are off.
    ///
    /// An accepted start resets every parameter, the session clock
    /// included.
    pub fn start(&mut self) {
        if self.state() != EngineState::Off {
            info!("Start command ignored: engines are {:?}", self.state());
            return;
        }
        self.sim_elapsed = 0.0;
        self.fsm.force_transition(EngineState::Starting, &mut self.ctx);
    }

    /// Begin the shutdown sequence.  Ignored if already stopping or off.
    pub fn stop(&mut self) {
        match self.state() {
            EngineState::Off | EngineState::Stopping => {
                info!("Stop command ignored: engines are {:?}", self.state());
            }
            EngineState::Starting | EngineState::Stable => {
                self.fsm.force_transition(EngineState::Stopping, &mut self.ctx);
            }
        }
    }

    /// Advance the simulation by one fixed step of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        if self.state() == EngineState::Off {
            self.sim_elapsed += dt;
            return;
        }

        if self.ctx.fuel.check_reserve() && self.state() != EngineState::Stopping {
            warn!("Fuel reserve sensor invalid, shutting down");
            self.stop();
        }

        self.sim_elapsed += dt;
        self.fsm.tick(&mut self.ctx, dt);
        self.ctx.update_sensors();

        if self.ctx.fuel.consume(dt) && self.is_running_up() {
            warn!("Fuel exhausted at t={:.3}s, shutting down", self.sim_elapsed);
            self.stop();
        }
    }

    /// Throttle step up.  Only effective while stable.
    pub fn increase_thrust(&mut self) {
        self.thrust_step(1.0);
    }

    /// Throttle step down.  Only effective while stable.
    pub fn decrease_thrust(&mut self) {
        self.thrust_step(-1.0);
    }

    fn thrust_step(&mut self, direction: f64) {
        if self.state() != EngineState::Stable {
            return;
        }
        let cfg = &self.ctx.config;
        let magnitude = self
            .ctx
            .noise
            .uniform(cfg.thrust_step_min, cfg.thrust_step_max);
        let ratio = direction * magnitude;

        self.ctx
            .fuel
            .adjust_flow_base(direction * cfg.fuel_flow_step, cfg.fuel_flow_max);
        for engine in &mut self.ctx.engines {
            engine.scale_base(ratio, cfg);
        }
        info!(
            "Thrust {} by {:.1}%",
            if direction > 0.0 { "increased" } else { "decreased" },
            magnitude * 100.0
        );
    }

    // ── Lifecycle queries ─────────────────────────────────────

    pub fn state(&self) -> EngineState {
        self.fsm.current_state()
    }

    pub fn sub_state(&self) -> SubState {
        self.ctx.sub_state
    }

    /// Starting or stable: engines turning under fuel.
    pub fn is_running_up(&self) -> bool {
        matches!(self.state(), EngineState::Starting | EngineState::Stable)
    }

    /// Total simulated seconds, including time spent off.
    pub fn sim_time(&self) -> f64 {
        self.sim_elapsed
    }

    pub fn config(&self) -> &SimConfig {
        &self.ctx.config
    }

    // ── Displayed values ──────────────────────────────────────

    /// Voted N1 of one engine; NaN when neither channel is healthy.
    pub fn n1(&self, side: Side) -> f64 {
        self.engine(side).n1.displayed()
    }

    /// Voted EGT of one engine; NaN when neither channel is healthy.
    pub fn egt(&self, side: Side) -> f64 {
        self.engine(side).egt.displayed()
    }

    /// Voted N1 as a percentage of rated maximum.
    pub fn n1_percentage(&self, side: Side) -> f64 {
        self.n1(side) / self.ctx.config.n1_rated_max * 100.0
    }

    pub fn n1_left(&self) -> f64 {
        self.n1(Side::Left)
    }

    pub fn n1_right(&self) -> f64 {
        self.n1(Side::Right)
    }

    pub fn egt_left(&self) -> f64 {
        self.egt(Side::Left)
    }

    pub fn egt_right(&self) -> f64 {
        self.egt(Side::Right)
    }

    pub fn n1_left_percentage(&self) -> f64 {
        self.n1_percentage(Side::Left)
    }

    pub fn n1_right_percentage(&self) -> f64 {
        self.n1_percentage(Side::Right)
    }

    /// Displayed fuel flow; NaN while the flow sensor is invalid.
    pub fn fuel_flow(&self) -> f64 {
        self.ctx.fuel.flow()
    }

    /// Displayed fuel reserve; NaN while the reserve sensor is invalid.
    pub fn fuel_reserve(&self) -> f64 {
        self.ctx.fuel.reserve()
    }

    /// Channel reading as reported to instruments; NaN while anomalous.
    pub fn sensor_value(&self, side: Side, quantity: Quantity, channel: Channel) -> f64 {
        self.engine(side).sensor(quantity).reported(channel)
    }

    // ── Sensor health ─────────────────────────────────────────

    pub fn is_n1_sensor_anomalous(&self, side: Side, channel: Channel) -> bool {
        self.engine(side).n1.is_anomalous(channel)
    }

    pub fn is_egt_sensor_anomalous(&self, side: Side, channel: Channel) -> bool {
        self.engine(side).egt.is_anomalous(channel)
    }

    pub fn is_n1_system_fault(&self, side: Side) -> bool {
        self.engine(side).n1.is_system_fault()
    }

    pub fn is_egt_system_fault(&self, side: Side) -> bool {
        self.engine(side).egt.is_system_fault()
    }

    pub fn is_fuel_reserve_sensor_invalid(&self) -> bool {
        self.ctx.fuel.is_reserve_sensor_invalid()
    }

    pub fn is_fuel_flow_sensor_invalid(&self) -> bool {
        self.ctx.fuel.is_flow_sensor_invalid()
    }

    // ── Diagnostics ───────────────────────────────────────────

    /// Read-only view of one engine, true and reference values included.
    pub fn engine(&self, side: Side) -> &EngineUnit {
        self.ctx.engine(side)
    }

    /// Read-only view of the fuel system.
    pub fn fuel(&self) -> &FuelSystem {
        &self.ctx.fuel
    }

    pub fn start_phase_elapsed(&self) -> f64 {
        self.ctx.start_phase_elapsed
    }

    pub fn stop_phase_elapsed(&self) -> f64 {
        self.ctx.stop_phase_elapsed
    }

    // ── Fault injection ───────────────────────────────────────

    pub fn set_forced_n1_sensor(&mut self, side: Side, channel: Channel, value: f64) {
        self.ctx.engine_mut(side).n1.set_override(channel, value);
    }

    pub fn reset_n1_sensor_override(&mut self, side: Side, channel: Channel) {
        self.ctx.engine_mut(side).n1.reset_override(channel);
    }

    pub fn set_forced_egt_sensor(&mut self, side: Side, channel: Channel, value: f64) {
        self.ctx.engine_mut(side).egt.set_override(channel, value);
    }

    pub fn reset_egt_sensor_override(&mut self, side: Side, channel: Channel) {
        self.ctx.engine_mut(side).egt.reset_override(channel);
    }

    /// Override either quantity.
    pub fn set_forced_sensor(&mut self, side: Side, quantity: Quantity, channel: Channel, value: f64) {
        self.ctx
            .engine_mut(side)
            .sensor_mut(quantity)
            .set_override(channel, value);
    }

    /// Release an override on either quantity.
    pub fn reset_sensor_override(&mut self, side: Side, quantity: Quantity, channel: Channel) {
        self.ctx
            .engine_mut(side)
            .sensor_mut(quantity)
            .reset_override(channel);
    }

    /// Freeze a channel at its last reading, or release it.
    pub fn set_sensor_stuck(&mut self, side: Side, quantity: Quantity, channel: Channel, stuck: bool) {
        self.ctx
            .engine_mut(side)
            .sensor_mut(quantity)
            .set_stuck(channel, stuck);
    }

    pub fn set_forced_fuel_reserve(&mut self, value: f64) {
        self.ctx.fuel.force_reserve(value);
    }

    /// Refill the tank to capacity.
    pub fn reset_fuel_reserve_override(&mut self) {
        self.ctx.fuel.reset_reserve();
    }

    pub fn set_fuel_reserve_sensor_invalid(&mut self, invalid: bool) {
        self.ctx.fuel.set_reserve_sensor_invalid(invalid);
    }

    pub fn set_fuel_flow_sensor_invalid(&mut self, invalid: bool) {
        self.ctx.fuel.set_flow_sensor_invalid(invalid);
    }

    pub fn set_forced_fuel_flow(&mut self, value: f64) {
        self.ctx.fuel.force_flow(value);
    }

    pub fn reset_forced_fuel_flow(&mut self) {
        self.ctx.fuel.reset_forced_flow();
    }
}
