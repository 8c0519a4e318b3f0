//! One physical engine: true values, reference values and its sensors.

use serde::Serialize;

use crate::config::SimConfig;
use crate::noise::NoiseSource;
use crate::sensors::{NominalRange, Quantity, SensorChannelPair};

/// Engine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left = 0,
    Right = 1,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Map a raw engine index (0 = left, 1 = right) from an outer layer.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
        }
    }
}

/// Physical state of a single engine.
#[derive(Debug, Clone)]
pub struct EngineUnit {
    pub n1_true: f64,
    pub egt_true: f64,
    /// Reference N1 for stable oscillation and shutdown decay.
    pub n1_base: f64,
    /// Reference EGT for stable oscillation and shutdown decay.
    pub egt_base: f64,
    pub n1: SensorChannelPair,
    pub egt: SensorChannelPair,
}

impl EngineUnit {
    /// Engine at rest: zero N1, EGT at ambient, healthy sensors.
    pub fn new(config: &SimConfig) -> Self {
        let ambient = config.ambient_temp;
        Self {
            n1_true: 0.0,
            egt_true: ambient,
            n1_base: 0.0,
            egt_base: ambient,
            n1: SensorChannelPair::new(NominalRange::new(0.0, config.n1_valid_max()), 0.0),
            egt: SensorChannelPair::new(
                NominalRange::new(config.egt_valid_min, config.egt_max),
                ambient,
            ),
        }
    }

    pub fn sensor(&self, quantity: Quantity) -> &SensorChannelPair {
        match quantity {
            Quantity::N1 => &self.n1,
            Quantity::Egt => &self.egt,
        }
    }

    pub fn sensor_mut(&mut self, quantity: Quantity) -> &mut SensorChannelPair {
        match quantity {
            Quantity::N1 => &mut self.n1,
            Quantity::Egt => &mut self.egt,
        }
    }

    /// Pin the true values at rest.
    pub fn come_to_rest(&mut self, ambient: f64) {
        self.n1_true = 0.0;
        self.egt_true = ambient;
    }

    /// Snapshot the current true values as the reference values.
    pub fn latch_base(&mut self) {
        self.n1_base = self.n1_true;
        self.egt_base = self.egt_true;
    }

    /// Re-base on what the crew last saw, skipping quantities with no
    /// valid display.
    pub fn rebase_on_display(&mut self) {
        let n1 = self.n1.displayed();
        let egt = self.egt.displayed();
        if !n1.is_nan() {
            self.n1_base = n1;
        }
        if !egt.is_nan() {
            self.egt_base = egt;
        }
    }

    /// Redraw the true values around the reference values.
    pub fn oscillate(&mut self, jitter: f64, noise: &mut dyn NoiseSource) {
        self.n1_true = self.n1_base * (1.0 + noise.uniform(-jitter, jitter));
        self.egt_true = self.egt_base * (1.0 + noise.uniform(-jitter, jitter));
    }

    /// Apply the shutdown decay factor `f` (1 at stop, 0 when spun down).
    pub fn decay(&mut self, factor: f64, ambient: f64) {
        self.n1_true = self.n1_base * factor;
        self.egt_true = ambient + (self.egt_base - ambient) * factor;
    }

    /// Scale the reference values by `1 + ratio` after a thrust step,
    /// keeping N1 within `[0, n1_max]` and EGT within `[ambient, egt_max]`.
    pub fn scale_base(&mut self, ratio: f64, config: &SimConfig) {
        self.n1_base = (self.n1_base * (1.0 + ratio)).clamp(0.0, config.n1_rated_max);
        self.egt_base = (self.egt_base * (1.0 + ratio)).clamp(config.ambient_temp, config.egt_max);
    }

    /// Refresh both sensor pairs from the true values.
    pub fn update_sensors(&mut self, noise_amp: f64, noise: &mut dyn NoiseSource) {
        self.n1.update(self.n1_true, noise_amp, noise);
        self.egt.update(self.egt_true, noise_amp, noise);
    }
}
