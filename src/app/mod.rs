//! Application core: pure domain logic, zero I/O.
//!
//! The station's machines reach hardware only through the **port traits**
//! in [`ports`], so the full controller is testable on the host against
//! mock adapters.

pub mod amount;
pub mod context;
pub mod keys;
pub mod ports;
pub mod station;
