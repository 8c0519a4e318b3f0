//! Integration test driver for `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises the simulation through
//! its public API, with a recording event sink in place of the console.

mod mock_sink;
mod scenario_tests;
mod service_tests;
