//! eCharger controller library.
//!
//! Exposes the pure-logic modules for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod charging;
pub mod config;
pub mod fsm;
pub mod menu;
pub mod pins;
pub mod protocol;
pub mod rfid;
pub mod session;

mod error;

pub use error::{AuthError, CardError, Error, FrameError, LinkError, Result};
