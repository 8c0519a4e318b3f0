//! Inbound commands to the simulation service.
//!
//! These represent actions requested by the outside world (the stdin
//! console, a test harness) that the [`SimService`](super::service::SimService)
//! applies at the next tick boundary.  [`SimCommand::parse`] turns one
//! line of operator text into a command.

use core::fmt;
use core::str::FromStr;

use crate::engine::Side;
use crate::error::CommandError;
use crate::sensors::{Channel, Quantity};

/// Reading injected by `set <sensor> fail`.
pub const FAIL_VALUE: f64 = -50.0;
/// N1 injected by `set N1_xx overspeed amber` (107.5 % of rated).
pub const OVERSPEED_AMBER: f64 = 43_000.0;
/// N1 injected by `set N1_xx overspeed red` (122.5 % of rated).
pub const OVERSPEED_RED: f64 = 49_000.0;
/// EGT injected by `set EGT_xx overtemp amber`.
pub const OVERTEMP_AMBER: f64 = 960.0;
/// EGT injected by `set EGT_xx overtemp red`.
pub const OVERTEMP_RED: f64 = 1_110.0;
/// Reserve injected by `set FUEL_RES low`.
pub const FUEL_RES_LOW: f64 = 1_000.0;

/// One sensor channel, written `N1_L1` … `EGT_R2` on the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorId {
    pub side: Side,
    pub quantity: Quantity,
    pub channel: Channel,
}

impl FromStr for SensorId {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        let (quantity, rest) = if let Some(rest) = upper.strip_prefix("N1_") {
            (Quantity::N1, rest)
        } else if let Some(rest) = upper.strip_prefix("EGT_") {
            (Quantity::Egt, rest)
        } else {
            return Err(CommandError::UnknownTarget);
        };
        let side = match rest.as_bytes().first() {
            Some(b'L') => Side::Left,
            Some(b'R') => Side::Right,
            _ => return Err(CommandError::UnknownTarget),
        };
        let channel = match &rest[1..] {
            "1" => Channel::One,
            "2" => Channel::Two,
            _ => return Err(CommandError::UnknownTarget),
        };
        Ok(Self {
            side,
            quantity,
            channel,
        })
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.side {
            Side::Left => 'L',
            Side::Right => 'R',
        };
        write!(
            f,
            "{}_{}{}",
            self.quantity.name(),
            side,
            self.channel.number()
        )
    }
}

/// Commands that external adapters can send into the simulation core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    Start,
    Stop,
    ThrustUp,
    ThrustDown,
    /// End the session.
    Quit,
    /// Pin a sensor channel to a value.
    ForceSensor { sensor: SensorId, value: f64 },
    /// Freeze a sensor channel at its last reading.
    StickSensor(SensorId),
    /// Release any override and stuck state on a channel.
    ResetSensor(SensorId),
    ForceFuelReserve(f64),
    InvalidateFuelReserve,
    /// Refill the reserve and mark its sensor valid.
    ResetFuelReserve,
    ForceFuelFlow(f64),
    InvalidateFuelFlow,
    /// Drop the flow override and mark its sensor valid.
    ResetFuelFlow,
}

impl SimCommand {
    /// Parse one console line.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        line.parse()
    }
}

impl FromStr for SimCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let cmd = words.next().ok_or(CommandError::Empty)?;

        match cmd.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "quit" | "exit" => Ok(Self::Quit),
            "thrust" => match words.next().map(str::to_ascii_lowercase).as_deref() {
                Some("up") => Ok(Self::ThrustUp),
                Some("down") => Ok(Self::ThrustDown),
                Some(_) => Err(CommandError::InvalidType),
                None => Err(CommandError::MissingArgument),
            },
            "set" => {
                let target = words.next().ok_or(CommandError::MissingArgument)?;
                let kind = words.next().ok_or(CommandError::MissingArgument)?;
                parse_set(target, kind, words.next())
            }
            "reset" => {
                let target = words.next().ok_or(CommandError::MissingArgument)?;
                parse_reset(target)
            }
            _ => Err(CommandError::UnknownCommand),
        }
    }
}

fn parse_set(target: &str, kind: &str, arg: Option<&str>) -> Result<SimCommand, CommandError> {
    let kind = kind.to_ascii_lowercase();
    match target.to_ascii_uppercase().as_str() {
        "FUEL_RES" => match kind.as_str() {
            "low" => Ok(SimCommand::ForceFuelReserve(FUEL_RES_LOW)),
            "invalid" => Ok(SimCommand::InvalidateFuelReserve),
            _ => Err(CommandError::InvalidType),
        },
        "FUEL_FLOW" => match kind.as_str() {
            "invalid" => Ok(SimCommand::InvalidateFuelFlow),
            "value" => {
                let raw = arg.ok_or(CommandError::MissingArgument)?;
                let value = raw
                    .parse::<f64>()
                    .map_err(|_| CommandError::InvalidValue)?;
                Ok(SimCommand::ForceFuelFlow(value))
            }
            _ => Err(CommandError::InvalidType),
        },
        _ => {
            let sensor: SensorId = target.parse()?;
            let value = match (kind.as_str(), sensor.quantity) {
                ("fail", _) => FAIL_VALUE,
                ("stuck", _) => return Ok(SimCommand::StickSensor(sensor)),
                ("overspeed", Quantity::N1) => level(arg, OVERSPEED_AMBER, OVERSPEED_RED)?,
                ("overtemp", Quantity::Egt) => level(arg, OVERTEMP_AMBER, OVERTEMP_RED)?,
                _ => return Err(CommandError::InvalidType),
            };
            Ok(SimCommand::ForceSensor { sensor, value })
        }
    }
}

fn level(arg: Option<&str>, amber: f64, red: f64) -> Result<f64, CommandError> {
    match arg.map(str::to_ascii_lowercase).as_deref() {
        Some("amber") => Ok(amber),
        Some("red") => Ok(red),
        Some(_) => Err(CommandError::InvalidLevel),
        None => Err(CommandError::MissingArgument),
    }
}

fn parse_reset(target: &str) -> Result<SimCommand, CommandError> {
    match target.to_ascii_uppercase().as_str() {
        "FUEL_RES" => Ok(SimCommand::ResetFuelReserve),
        "FUEL_FLOW" => Ok(SimCommand::ResetFuelFlow),
        _ => target.parse().map(SimCommand::ResetSensor),
    }
}
