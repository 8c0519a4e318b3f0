//! Unified error and condition types for the simulation.
//!
//! Two different things live here:
//!
//! - [`Condition`]: the physical/sensor-domain taxonomy.  These are *data*,
//!   never propagated errors.  The engine simulation degrades every
//!   abnormal situation to NaN readings and flags, and the safety monitor
//!   turns those into conditions once per tick.
//! - [`Error`]: genuine software failures at the crate's outer edges
//!   (loading configuration, parsing text commands).

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation outside the tick loop funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// A text command could not be understood.
    Command(CommandError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for [`SimConfig`](crate::config::SimConfig).
    Parse,
    /// A field failed range validation.
    /// The `&'static str` names the field and the reason.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "malformed configuration document"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Blank input line.
    Empty,
    /// First word is not a known command.
    UnknownCommand,
    /// The sensor or system name is not recognised.
    UnknownTarget,
    /// The fault type does not apply to the target.
    InvalidType,
    /// Severity level other than `amber` / `red`.
    InvalidLevel,
    /// A numeric argument could not be parsed.
    InvalidValue,
    /// The command needs more words.
    MissingArgument,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownCommand => {
                write!(f, "unknown command (supported: start, stop, thrust, set, reset, quit)")
            }
            Self::UnknownTarget => write!(f, "unknown target"),
            Self::InvalidType => write!(f, "invalid fault type for target"),
            Self::InvalidLevel => write!(f, "invalid level, use 'amber' or 'red'"),
            Self::InvalidValue => write!(f, "invalid numeric value"),
            Self::MissingArgument => write!(f, "missing argument"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Physical conditions
// ---------------------------------------------------------------------------

/// Abnormal engine conditions detected by the safety monitor.
///
/// Conditions are accumulated in a bitfield so that several simultaneous
/// conditions can be reported from one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[repr(u16)]
pub enum Condition {
    /// One sensor channel is out of range, NaN, or stuck.
    SensorAnomaly = 0b0000_0000_0001,
    /// Both channels of one quantity on one engine are anomalous.
    SystemFault = 0b0000_0000_0010,
    /// The same system fault exists on both engines.
    DualSystemFailure = 0b0000_0000_0100,
    /// Fuel reserve sensor reports an implausible quantity.
    InvalidReserveSensor = 0b0000_0000_1000,
    /// Fuel flow sensor has been declared invalid.
    InvalidFlowSensor = 0b0000_0001_0000,
    /// Fuel reserve reached zero.
    FuelDepleted = 0b0000_0010_0000,
    /// Fuel reserve below the low-fuel threshold.
    LowFuel = 0b0000_0100_0000,
    /// Fuel flow above its rated maximum.
    FuelFlowExceeded = 0b0000_1000_0000,
    /// N1 above the caution or warning limit.
    Overspeed = 0b0001_0000_0000,
    /// EGT above the caution or warning limit for the current phase.
    Overtemperature = 0b0010_0000_0000,
}

impl Condition {
    /// Return the bitmask for this condition.
    pub const fn mask(self) -> u16 {
        self as u16
    }

    /// Every condition, in mask order.
    pub const ALL: [Condition; 10] = [
        Self::SensorAnomaly,
        Self::SystemFault,
        Self::DualSystemFailure,
        Self::InvalidReserveSensor,
        Self::InvalidFlowSensor,
        Self::FuelDepleted,
        Self::LowFuel,
        Self::FuelFlowExceeded,
        Self::Overspeed,
        Self::Overtemperature,
    ];
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SensorAnomaly => write!(f, "sensor anomaly"),
            Self::SystemFault => write!(f, "system fault"),
            Self::DualSystemFailure => write!(f, "dual system failure"),
            Self::InvalidReserveSensor => write!(f, "fuel reserve sensor invalid"),
            Self::InvalidFlowSensor => write!(f, "fuel flow sensor invalid"),
            Self::FuelDepleted => write!(f, "fuel depleted"),
            Self::LowFuel => write!(f, "low fuel"),
            Self::FuelFlowExceeded => write!(f, "fuel flow exceeded"),
            Self::Overspeed => write!(f, "overspeed"),
            Self::Overtemperature => write!(f, "overtemperature"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
