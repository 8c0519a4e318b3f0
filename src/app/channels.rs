//! Inter-thread command channel.
//!
//! Uses an `embassy-sync` bounded MPMC channel to bridge the console
//! reader thread with the fixed-step simulation loop.  Producers use
//! `try_send`; the loop drains it once per frame at a tick boundary.
//!
//! ```text
//! ┌──────────────┐  SimCommand  ┌──────────────┐
//! │ stdin reader │────────────▶│  Sim loop     │
//! │  (thread)    │              │  (main)       │
//! └──────────────┘              └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::commands::SimCommand;

/// Channel depth for console commands.
pub const CMD_DEPTH: usize = 16;

/// Inbound command channel: console thread → simulation loop.
pub static CMD_CHANNEL: Channel<CriticalSectionRawMutex, SimCommand, CMD_DEPTH> = Channel::new();
