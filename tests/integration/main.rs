//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a specific subsystem
//! against the mock station.  All tests run on the host with no real
//! hardware required.

mod menu_tests;
mod mock_hw;
mod session_tests;
mod station_tests;
