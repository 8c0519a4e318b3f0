//! Outbound simulation events.
//!
//! The [`SimService`](super::service::SimService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to the console, record them in a
//! test, stream them to a display.

use serde::Serialize;

use crate::fsm::{EngineState, SubState};
use crate::safety::Alert;

/// Structured events emitted by the simulation core.
#[derive(Debug, Clone)]
pub enum SimEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The lifecycle state changed.
    StateChanged { from: EngineState, to: EngineState },

    /// An alert entered the annunciator history.
    AlertRaised(Alert),

    /// The safety monitor stopped the engines.
    ShutdownCommanded { reason: &'static str },

    /// A console command could not be applied in the current state.
    CommandIgnored(&'static str),

    /// The service has started (carries initial state).
    Started(EngineState),
}

/// A point-in-time snapshot of everything the cockpit displays.
///
/// NaN readings serialise as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryData {
    pub sim_time: f64,
    pub state: EngineState,
    pub sub_state: SubState,
    /// Voted N1, `[left, right]`.
    pub n1: [f64; 2],
    /// Voted N1 in percent of rated, `[left, right]`.
    pub n1_pct: [f64; 2],
    /// Voted EGT, `[left, right]`.
    pub egt: [f64; 2],
    /// Per-channel N1 as reported, `[side][channel]`.
    pub n1_channels: [[f64; 2]; 2],
    /// Per-channel EGT as reported, `[side][channel]`.
    pub egt_channels: [[f64; 2]; 2],
    pub fuel_reserve: f64,
    pub fuel_flow: f64,
    /// [`Condition`](crate::error::Condition) bitmask from the last tick.
    pub conditions: u16,
    pub master_alert: Option<&'static str>,
}
