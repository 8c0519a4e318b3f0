//! Fuzz target: `SimCommand::parse`
//!
//! Drives arbitrary console lines into the command parser and asserts that
//! it never panics and that every accepted sensor command names a sensor
//! that prints back in console syntax.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use twinspool::app::commands::{SensorId, SimCommand};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let sensor = match SimCommand::parse(line) {
        Ok(
            SimCommand::ForceSensor { sensor, .. }
            | SimCommand::StickSensor(sensor)
            | SimCommand::ResetSensor(sensor),
        ) => sensor,
        _ => return,
    };

    let printed = sensor.to_string();
    assert_eq!(printed.parse::<SensorId>(), Ok(sensor));
});
