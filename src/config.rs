//! Station configuration parameters
//!
//! All tunable parameters for the charging station controller.
//! Defaults reproduce the behaviour of the deployed stations.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core station configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationConfig {
    // --- Addressing ---
    /// Numeric id this station puts in the frame source field
    pub station_id: u8,
    /// Numeric id of the billing server
    pub server_id: u8,

    // --- Pricing ---
    /// Fixed price used while the server is unreachable (dkk/kWs)
    pub offline_price: u16,

    // --- Authentication ---
    /// Wrong PIN entries tolerated offline before lock-out
    pub max_pin_attempts: u8,

    // --- Protocol ---
    /// Repeat-last-packet requests before an exchange is abandoned
    pub max_repeat_requests: u8,
    /// Empty polls before a reply wait gives up (0 = wait forever)
    pub reply_poll_limit: u32,
    /// Reject frames whose checksum byte does not match
    pub verify_checksum: bool,
    /// Idle passes before a card exchange gives up (0 = wait forever)
    pub card_poll_limit: u32,
    /// Pause between the energy and cost reports (milliseconds)
    pub report_gap_ms: u32,

    // --- Charging ---
    /// Energy at which a charge is considered complete (kWs)
    pub charge_target_energy: f32,
    /// Interval between energy samples (milliseconds)
    pub sample_period_ms: u32,

    // --- Display ---
    /// How long result messages stay on screen (milliseconds)
    pub message_hold_ms: u32,
    /// How long an entered PIN digit is shown before masking (milliseconds)
    pub pin_echo_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            // Addressing
            station_id: 2,
            server_id: 1,

            // Pricing
            offline_price: 15,

            // Authentication
            max_pin_attempts: 3,

            // Protocol
            max_repeat_requests: 5,
            reply_poll_limit: 0,
            verify_checksum: true,
            card_poll_limit: 0,
            report_gap_ms: 500,

            // Charging
            charge_target_energy: 100.0,
            sample_period_ms: 1000,

            // Display
            message_hold_ms: 2000,
            pin_echo_ms: 100,
        }
    }
}

impl StationConfig {
    /// Reject values the state machines cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.station_id > 99 || self.server_id > 99 {
            return Err(Error::Config("ids must fit two decimal digits"));
        }
        if self.station_id == self.server_id {
            return Err(Error::Config("station and server ids collide"));
        }
        if self.offline_price == 0 || self.offline_price > 99 {
            return Err(Error::Config("offline price must be 1..=99"));
        }
        if self.max_pin_attempts == 0 {
            return Err(Error::Config("at least one PIN attempt required"));
        }
        if self.charge_target_energy.is_nan() || self.charge_target_energy <= 0.0 {
            return Err(Error::Config("charge target must be positive"));
        }
        Ok(())
    }
}
