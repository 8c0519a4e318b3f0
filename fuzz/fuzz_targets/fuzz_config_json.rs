//! Fuzz target: `SimConfig::from_json`
//!
//! Any document either fails cleanly or yields a configuration that a
//! controller can run with for a few ticks.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use twinspool::controller::EngineController;
use twinspool::noise::Midpoint;
use twinspool::SimConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(config) = SimConfig::from_json(text) else {
        return;
    };
    assert!(config.validate().is_ok());

    let step = config.step_secs;
    let mut engine = EngineController::with_noise(config, Midpoint);
    engine.start();
    for _ in 0..16 {
        engine.advance(step);
    }
});
