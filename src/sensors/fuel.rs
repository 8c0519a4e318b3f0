//! Fuel reserve and fuel flow model shared by both engines.
//!
//! The reserve gauge doubles as the consumption integrator: while its
//! sensor is valid, the reserve drains by `flow · dt` each tick.  A reserve
//! outside `[0, capacity]` can only come from fault injection and marks the
//! reserve sensor invalid.

/// Fuel state of the aircraft.
#[derive(Debug, Clone)]
pub struct FuelSystem {
    capacity: f64,
    reserve: f64,
    flow: f64,
    flow_base: f64,
    reserve_sensor_invalid: bool,
    flow_sensor_invalid: bool,
    flow_overridden: bool,
}

impl FuelSystem {
    /// Full tank, no flow, healthy sensors.
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            reserve: capacity,
            flow: 0.0,
            flow_base: 0.0,
            reserve_sensor_invalid: false,
            flow_sensor_invalid: false,
            flow_overridden: false,
        }
    }

    // ── Physics ───────────────────────────────────────────────

    /// Set the flow computed by the engine model.  Ignored while an
    /// injected flow value is active.
    pub fn set_flow(&mut self, flow: f64) {
        if !self.flow_overridden {
            self.flow = flow;
        }
    }

    /// Capture the current flow as the stable-phase reference.
    pub fn latch_flow_base(&mut self) {
        self.flow_base = self.flow;
    }

    /// Move the stable-phase reference by `delta`, clamped to `[0, max]`.
    pub fn adjust_flow_base(&mut self, delta: f64, max: f64) {
        self.flow_base = (self.flow_base + delta).clamp(0.0, max);
    }

    /// Cut the flow and drop any injected flow value.
    pub fn shut_off(&mut self) {
        self.flow = 0.0;
        self.flow_overridden = false;
    }

    /// Mark the reserve sensor invalid if the reserve is implausible.
    /// Returns the resulting validity flag.
    pub fn check_reserve(&mut self) -> bool {
        if !(0.0..=self.capacity).contains(&self.reserve) {
            self.reserve_sensor_invalid = true;
        }
        self.reserve_sensor_invalid
    }

    /// Drain `flow · dt` from the reserve, floored at zero.
    ///
    /// Returns `true` when the tank is empty after this tick.  Nothing is
    /// drained while the reserve sensor is invalid.
    pub fn consume(&mut self, dt: f64) -> bool {
        if self.reserve_sensor_invalid {
            return false;
        }
        self.reserve -= self.flow * dt;
        if self.reserve <= 0.0 {
            self.reserve = 0.0;
            return true;
        }
        false
    }

    // ── Fault injection ───────────────────────────────────────

    pub fn force_reserve(&mut self, value: f64) {
        self.reserve = value;
    }

    /// Refill to capacity.
    pub fn reset_reserve(&mut self) {
        self.reserve = self.capacity;
    }

    pub fn set_reserve_sensor_invalid(&mut self, invalid: bool) {
        self.reserve_sensor_invalid = invalid;
    }

    pub fn set_flow_sensor_invalid(&mut self, invalid: bool) {
        self.flow_sensor_invalid = invalid;
    }

    /// Pin the flow to `value` until reset or shutdown.
    pub fn force_flow(&mut self, value: f64) {
        self.flow = value;
        self.flow_overridden = true;
    }

    pub fn reset_forced_flow(&mut self) {
        self.flow_overridden = false;
    }

    // ── Queries ───────────────────────────────────────────────

    /// Displayed reserve; NaN while the reserve sensor is invalid.
    pub fn reserve(&self) -> f64 {
        if self.reserve_sensor_invalid {
            f64::NAN
        } else {
            self.reserve
        }
    }

    /// Displayed flow; NaN while the flow sensor is invalid.
    pub fn flow(&self) -> f64 {
        if self.flow_sensor_invalid {
            f64::NAN
        } else {
            self.flow
        }
    }

    /// Physical reserve regardless of sensor validity.
    pub fn true_reserve(&self) -> f64 {
        self.reserve
    }

    /// Physical flow regardless of sensor validity.
    pub fn true_flow(&self) -> f64 {
        self.flow
    }

    pub fn flow_base(&self) -> f64 {
        self.flow_base
    }

    pub fn is_reserve_sensor_invalid(&self) -> bool {
        self.reserve_sensor_invalid
    }

    pub fn is_flow_sensor_invalid(&self) -> bool {
        self.flow_sensor_invalid
    }

    pub fn is_flow_overridden(&self) -> bool {
        self.flow_overridden
    }
}
