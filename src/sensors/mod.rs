//! Sensor subsystem: redundant engine channels and the fuel gauges.
//!
//! Every engine carries one [`SensorChannelPair`] per measured quantity.
//! The fuel system ([`FuelSystem`]) is shared by both engines and carries
//! its own validity flags instead of redundant channels.

pub mod channel;
pub mod fuel;

pub use channel::{NominalRange, SensorChannelPair};
pub use fuel::FuelSystem;

use serde::Serialize;

/// Measured engine quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Quantity {
    /// Fan/core rotational speed.
    N1,
    /// Exhaust gas temperature.
    Egt,
}

impl Quantity {
    /// Map a raw selector (0 = N1, 1 = EGT) from an outer layer.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::N1),
            1 => Some(Self::Egt),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::N1 => "N1",
            Self::Egt => "EGT",
        }
    }
}

/// One of the two redundant channels of a sensor pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    One = 0,
    Two = 1,
}

impl Channel {
    pub const BOTH: [Channel; 2] = [Channel::One, Channel::Two];

    /// Map a zero-based channel index from an outer layer.
    pub fn from_index(idx: usize) -> Option<Self> {
        match idx {
            0 => Some(Self::One),
            1 => Some(Self::Two),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human channel number (1 or 2).
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }
}
