//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured simulation events to the
//! `log` facade (which `env_logger` sends to stderr in the binary).  In
//! JSON mode telemetry is rendered with `serde_json`, one object per line,
//! for piping into a plotting tool.

use log::{error, info, warn};

use crate::app::events::SimEvent;
use crate::app::ports::EventSink;
use crate::safety::Severity;

/// Adapter that logs every [`SimEvent`] to the console.
pub struct LogEventSink {
    json_telemetry: bool,
}

impl LogEventSink {
    /// Human-readable telemetry lines.
    pub fn new() -> Self {
        Self {
            json_telemetry: false,
        }
    }

    /// Telemetry as JSON objects.
    pub fn json() -> Self {
        Self {
            json_telemetry: true,
        }
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &SimEvent) {
        match event {
            SimEvent::Telemetry(t) if self.json_telemetry => match serde_json::to_string(t) {
                Ok(line) => info!("{line}"),
                Err(e) => warn!("TELEM | serialisation failed: {e}"),
            },
            SimEvent::Telemetry(t) => {
                info!(
                    "TELEM | t={:.1}s {:?}/{:?} | N1 {:.1}%/{:.1}% | EGT {:.0}/{:.0} | \
                     fuel {:.0} @ {:.2}/s | cond=0b{:010b}{}",
                    t.sim_time,
                    t.state,
                    t.sub_state,
                    t.n1_pct[0],
                    t.n1_pct[1],
                    t.egt[0],
                    t.egt[1],
                    t.fuel_reserve,
                    t.fuel_flow,
                    t.conditions,
                    t.master_alert
                        .map(|m| format!(" | MASTER {m}"))
                        .unwrap_or_default(),
                );
            }
            SimEvent::StateChanged { from, to } => {
                info!("STATE | {from:?} -> {to:?}");
            }
            SimEvent::AlertRaised(alert) => match alert.severity {
                Severity::Red => error!("ALERT | t={:.2}s {}", alert.timestamp, alert.message),
                Severity::Amber => warn!("ALERT | t={:.2}s {}", alert.timestamp, alert.message),
                Severity::White => info!("ALERT | t={:.2}s {}", alert.timestamp, alert.message),
            },
            SimEvent::ShutdownCommanded { reason } => {
                warn!("SHUTDOWN | {reason}");
            }
            SimEvent::CommandIgnored(why) => {
                info!("COMMAND | ignored, {why}");
            }
            SimEvent::Started(state) => {
                info!("START | initial_state={state:?}");
            }
        }
    }
}
