//! Application core: simulation orchestration, zero I/O.
//!
//! This module wires the engine controller, the safety monitor and the
//! annunciator into one fixed-step service.  All interaction with the
//! outside world happens through the [`ports`] traits and the bounded
//! command channel in [`channels`], keeping this layer fully testable.

pub mod channels;
pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
