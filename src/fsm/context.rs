//! Shared mutable context threaded through every FSM handler.
//!
//! `PlantContext` is the single struct that state handlers read from and
//! write to: both engines, the fuel system, the phase clocks, the
//! configuration and the injected noise source.  Think of it as the
//! "blackboard" the lifecycle handlers share.

use crate::config::SimConfig;
use crate::engine::{EngineUnit, Side};
use crate::noise::NoiseSource;
use crate::sensors::FuelSystem;

use super::SubState;

/// The shared context passed to every state handler function.
pub struct PlantContext {
    // -- Configuration --
    pub config: SimConfig,

    // -- Physical plant --
    /// Indexed by [`Side::index`].
    pub engines: [EngineUnit; 2],
    pub fuel: FuelSystem,

    // -- Lifecycle --
    /// Refinement of the current lifecycle state.
    pub sub_state: SubState,
    /// Seconds since the start sequence began.
    pub start_phase_elapsed: f64,
    /// Seconds since the shutdown sequence began.
    pub stop_phase_elapsed: f64,

    // -- Randomness --
    pub noise: Box<dyn NoiseSource + Send>,
}

impl PlantContext {
    /// Create a context with both engines at rest and a full tank.
    pub fn new(config: SimConfig, noise: Box<dyn NoiseSource + Send>) -> Self {
        Self {
            engines: [EngineUnit::new(&config), EngineUnit::new(&config)],
            fuel: FuelSystem::new(config.fuel_capacity),
            sub_state: SubState::None,
            start_phase_elapsed: 0.0,
            stop_phase_elapsed: 0.0,
            config,
            noise,
        }
    }

    /// Restore every parameter to its power-on default.  The noise source
    /// and configuration are kept.
    pub fn reset(&mut self) {
        self.engines = [EngineUnit::new(&self.config), EngineUnit::new(&self.config)];
        self.fuel = FuelSystem::new(self.config.fuel_capacity);
        self.sub_state = SubState::None;
        self.start_phase_elapsed = 0.0;
        self.stop_phase_elapsed = 0.0;
    }

    pub fn engine(&self, side: Side) -> &EngineUnit {
        &self.engines[side.index()]
    }

    pub fn engine_mut(&mut self, side: Side) -> &mut EngineUnit {
        &mut self.engines[side.index()]
    }

    /// Set both engines to the same true values (symmetric twin start).
    pub fn set_both(&mut self, n1: f64, egt: f64) {
        for engine in &mut self.engines {
            engine.n1_true = n1;
            engine.egt_true = egt;
        }
    }

    /// Returns `true` if every engine satisfies `pred`.
    pub fn all_engines(&self, pred: impl Fn(&EngineUnit) -> bool) -> bool {
        self.engines.iter().all(pred)
    }

    /// Refresh every sensor channel from the current true values.
    pub fn update_sensors(&mut self) {
        let amp = self.config.sensor_noise;
        for engine in &mut self.engines {
            engine.update_sensors(amp, self.noise.as_mut());
        }
    }
}
