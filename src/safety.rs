//! Safety monitor.
//!
//! The monitor runs **every tick after the controller has advanced** and
//! turns the displayed values and sensor flags into prioritised alerts and
//! a shutdown decision.
//!
//! ## Evaluation lifecycle
//!
//! 1. [`SafetyMonitor::evaluate`] reads the controller and builds a
//!    [`SafetyReport`]: every active alert, the accumulated condition
//!    bitmask and whether any rule demands a shutdown.  It is pure.
//! 2. [`SafetyMonitor::apply`] evaluates, logs condition bits that were
//!    raised or cleared since the previous tick, and issues `stop()` when
//!    a shutdown is required and the engines are still running up.
//!
//! Rules are independent of each other; several may fire in one tick.

use heapless::Vec;
use log::{error, info, warn};
use serde::Serialize;

use crate::config::SimConfig;
use crate::controller::EngineController;
use crate::engine::Side;
use crate::error::Condition;
use crate::fsm::EngineState;
use crate::sensors::{Channel, Quantity};

/// Upper bound on simultaneous alerts: 8 channel anomalies, 4 system
/// faults, 2 dual failures, 2 fuel, 2 overspeed, 2 overtemperature.
pub const MAX_ALERTS: usize = 24;

/// Alert colour, ordered by priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    /// Advisory.
    White,
    /// Caution.
    Amber,
    /// Warning.
    Red,
}

/// One condition raised in one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub message: &'static str,
    pub severity: Severity,
    /// Simulation seconds.
    pub timestamp: f64,
    pub condition: Condition,
    /// Engine concerned, `None` for aircraft-wide conditions.
    pub side: Option<Side>,
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct SafetyReport {
    pub alerts: Vec<Alert, MAX_ALERTS>,
    /// OR of every raised [`Condition::mask`].
    pub conditions: u16,
    /// A RED rule demands an automatic shutdown.
    pub shutdown_required: bool,
    /// `apply` actually issued `stop()` this tick.
    pub shutdown_commanded: bool,
}

impl SafetyReport {
    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions & condition.mask() != 0
    }

    /// Highest-severity alert, first raised wins ties.
    pub fn most_severe(&self) -> Option<&Alert> {
        self.alerts
            .iter()
            .fold(None, |best: Option<&Alert>, a| match best {
                Some(b) if b.severity >= a.severity => Some(b),
                _ => Some(a),
            })
    }

    fn raise(
        &mut self,
        message: &'static str,
        severity: Severity,
        condition: Condition,
        side: Option<Side>,
        timestamp: f64,
    ) {
        self.conditions |= condition.mask();
        let alert = Alert {
            message,
            severity,
            timestamp,
            condition,
            side,
        };
        if self.alerts.push(alert).is_err() {
            warn!("Alert buffer full, dropped: {message}");
        }
    }
}

/// Safety monitor.
pub struct SafetyMonitor {
    n1_caution_pct: f64,
    n1_warning_pct: f64,
    start_egt_caution: f64,
    start_egt_warning: f64,
    stable_egt_caution: f64,
    stable_egt_warning: f64,
    low_fuel_threshold: f64,
    fuel_flow_max: f64,
    /// Condition bitmask seen by the previous `apply`, for edge logging.
    active: u16,
}

impl SafetyMonitor {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            n1_caution_pct: config.n1_caution_pct,
            n1_warning_pct: config.n1_warning_pct,
            start_egt_caution: config.start_egt_caution,
            start_egt_warning: config.start_egt_warning,
            stable_egt_caution: config.stable_egt_caution,
            stable_egt_warning: config.stable_egt_warning,
            low_fuel_threshold: config.low_fuel_threshold,
            fuel_flow_max: config.fuel_flow_max,
            active: 0,
        }
    }

    /// Evaluate every rule against the controller's current values.
    pub fn evaluate(&self, engine: &EngineController) -> SafetyReport {
        let mut report = SafetyReport::default();
        let now = engine.sim_time();

        // ── Sensor channels ───────────────────────────────────────
        for side in Side::BOTH {
            for quantity in [Quantity::N1, Quantity::Egt] {
                for ch in Channel::BOTH {
                    if engine.engine(side).sensor(quantity).is_anomalous(ch) {
                        report.raise(
                            anomaly_message(quantity, side, ch),
                            Severity::White,
                            Condition::SensorAnomaly,
                            Some(side),
                            now,
                        );
                    }
                }
            }
        }

        // ── System faults ─────────────────────────────────────────
        for quantity in [Quantity::N1, Quantity::Egt] {
            let faulted = Side::BOTH.map(|s| engine.engine(s).sensor(quantity).is_system_fault());
            for side in Side::BOTH {
                if faulted[side.index()] {
                    report.raise(
                        system_fault_message(quantity),
                        Severity::Amber,
                        Condition::SystemFault,
                        Some(side),
                        now,
                    );
                }
            }
            if faulted.iter().all(|&f| f) {
                report.raise(
                    dual_failure_message(quantity),
                    Severity::Red,
                    Condition::DualSystemFailure,
                    None,
                    now,
                );
                report.shutdown_required = true;
            }
        }

        // ── Fuel ──────────────────────────────────────────────────
        let running = engine.state().is_running();
        let reserve = engine.fuel_reserve();
        if engine.is_fuel_reserve_sensor_invalid() {
            report.raise(
                "FUEL RESERVE SENSOR INVALID",
                Severity::Red,
                Condition::InvalidReserveSensor,
                None,
                now,
            );
        } else if running && reserve <= 0.0 {
            report.raise(
                "FUEL DEPLETED - ENGINE SHUTDOWN",
                Severity::Red,
                Condition::FuelDepleted,
                None,
                now,
            );
        } else if running && reserve < self.low_fuel_threshold {
            report.raise(
                "LOW FUEL RESERVE",
                Severity::Amber,
                Condition::LowFuel,
                None,
                now,
            );
        }

        let flow = engine.fuel_flow();
        if engine.is_fuel_flow_sensor_invalid() {
            report.raise(
                "FUEL FLOW SENSOR INVALID",
                Severity::Amber,
                Condition::InvalidFlowSensor,
                None,
                now,
            );
        } else if flow > self.fuel_flow_max {
            report.raise(
                "FUEL FLOW EXCEEDED LIMIT",
                Severity::Amber,
                Condition::FuelFlowExceeded,
                None,
                now,
            );
        }

        // ── Overspeed ─────────────────────────────────────────────
        for side in Side::BOTH {
            // NaN compares false and raises nothing.
            let pct = engine.n1_percentage(side);
            if pct > self.n1_warning_pct {
                report.raise(
                    overspeed_message(side, Severity::Red),
                    Severity::Red,
                    Condition::Overspeed,
                    Some(side),
                    now,
                );
                report.shutdown_required = true;
            } else if pct > self.n1_caution_pct {
                report.raise(
                    overspeed_message(side, Severity::Amber),
                    Severity::Amber,
                    Condition::Overspeed,
                    Some(side),
                    now,
                );
            }
        }

        // ── Overtemperature ───────────────────────────────────────
        let limits = if engine.sub_state().is_starting() {
            Some((
                self.start_egt_caution,
                self.start_egt_warning,
                "EGT STARTING OVERTEMP CAUTION",
                "EGT STARTING OVERTEMP - SHUTDOWN",
            ))
        } else if engine.state() == EngineState::Stable {
            Some((
                self.stable_egt_caution,
                self.stable_egt_warning,
                "EGT STABLE OVERTEMP CAUTION",
                "EGT STABLE OVERTEMP - SHUTDOWN",
            ))
        } else {
            None
        };
        if let Some((caution, warning, caution_msg, warning_msg)) = limits {
            for side in Side::BOTH {
                let egt = engine.egt(side);
                if egt > warning {
                    report.raise(
                        warning_msg,
                        Severity::Red,
                        Condition::Overtemperature,
                        Some(side),
                        now,
                    );
                    report.shutdown_required = true;
                } else if egt > caution {
                    report.raise(
                        caution_msg,
                        Severity::Amber,
                        Condition::Overtemperature,
                        Some(side),
                        now,
                    );
                }
            }
        }

        report
    }

    /// Evaluate, log condition edges, and command a shutdown if needed.
    pub fn apply(&mut self, engine: &mut EngineController) -> SafetyReport {
        let mut report = self.evaluate(engine);
        self.log_edges(&report);

        if report.shutdown_required && engine.is_running_up() {
            if let Some(alert) = report.most_severe() {
                error!("SAFETY SHUTDOWN: {}", alert.message);
            }
            engine.stop();
            report.shutdown_commanded = true;
        }
        report
    }

    /// Condition bitmask seen by the last `apply`.
    pub fn active_conditions(&self) -> u16 {
        self.active
    }

    // ── Internal ──────────────────────────────────────────────────

    fn log_edges(&mut self, report: &SafetyReport) {
        for condition in Condition::ALL {
            let was = self.active & condition.mask() != 0;
            let is = report.has_condition(condition);
            if is && !was {
                let red = report
                    .alerts
                    .iter()
                    .any(|a| a.condition == condition && a.severity == Severity::Red);
                if red {
                    error!("SAFETY CONDITION SET: {condition}");
                } else {
                    warn!("SAFETY CONDITION SET: {condition}");
                }
            } else if was && !is {
                info!("SAFETY CONDITION CLEARED: {condition}");
            }
        }
        self.active = report.conditions;
    }
}

fn anomaly_message(quantity: Quantity, side: Side, ch: Channel) -> &'static str {
    match (quantity, side, ch) {
        (Quantity::N1, Side::Left, Channel::One) => "N1 SENSOR 1 LEFT ANOMALY",
        (Quantity::N1, Side::Left, Channel::Two) => "N1 SENSOR 2 LEFT ANOMALY",
        (Quantity::N1, Side::Right, Channel::One) => "N1 SENSOR 1 RIGHT ANOMALY",
        (Quantity::N1, Side::Right, Channel::Two) => "N1 SENSOR 2 RIGHT ANOMALY",
        (Quantity::Egt, Side::Left, Channel::One) => "EGT SENSOR 1 LEFT ANOMALY",
        (Quantity::Egt, Side::Left, Channel::Two) => "EGT SENSOR 2 LEFT ANOMALY",
        (Quantity::Egt, Side::Right, Channel::One) => "EGT SENSOR 1 RIGHT ANOMALY",
        (Quantity::Egt, Side::Right, Channel::Two) => "EGT SENSOR 2 RIGHT ANOMALY",
    }
}

fn system_fault_message(quantity: Quantity) -> &'static str {
    match quantity {
        Quantity::N1 => "N1 SYSTEM FAULT",
        Quantity::Egt => "EGT SYSTEM FAULT",
    }
}

fn dual_failure_message(quantity: Quantity) -> &'static str {
    match quantity {
        Quantity::N1 => "DUAL N1 SYSTEM FAILURE - SHUTDOWN",
        Quantity::Egt => "DUAL EGT SYSTEM FAILURE - SHUTDOWN",
    }
}

fn overspeed_message(side: Side, severity: Severity) -> &'static str {
    match (side, severity) {
        (Side::Left, Severity::Red) => "N1 LEFT OVERSPEED - SHUTDOWN",
        (Side::Right, Severity::Red) => "N1 RIGHT OVERSPEED - SHUTDOWN",
        (Side::Left, _) => "N1 LEFT OVERSPEED CAUTION",
        (Side::Right, _) => "N1 RIGHT OVERSPEED CAUTION",
    }
}
