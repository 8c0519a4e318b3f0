//! Twin-engine trainer simulation library.
//!
//! Exposes the simulation core for the headless driver and for
//! integration testing:
//!
//! - [`controller`]: the engine lifecycle, sensors and fuel model.
//! - [`safety`]: per-tick alert and shutdown decisions.
//! - [`annunciator`]: master alert and history buffering.
//! - [`app`]: the fixed-step service, commands, events and ports.

#![deny(unused_must_use)]

pub mod adapters;
pub mod annunciator;
pub mod app;
pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod fsm;
pub mod noise;
pub mod safety;
pub mod sensors;

pub use config::SimConfig;
pub use controller::EngineController;
pub use engine::Side;
pub use error::{Condition, Error, Result};
pub use fsm::{EngineState, SubState};
pub use sensors::{Channel, Quantity};
