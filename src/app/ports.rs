//! Port traits: the hexagonal boundary between the simulation core and
//! the outside world.
//!
//! ```text
//!   SimService (domain) ──▶ Port trait ──▶ Adapter
//! ```

use super::events::SimEvent;

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`SimEvent`]s through this port.  Adapters
/// decide where they go (console log, JSON stream, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &SimEvent);
}

/// Sink that drops everything.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &SimEvent) {}
}
