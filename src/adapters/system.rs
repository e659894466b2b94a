//! Watchdog-backed controller restart.
//!
//! Every session ends in a full restart so the next user starts from a
//! clean boot.  On target this calls `esp_restart`; on non-espidf
//! targets it only records the request.

use log::warn;

use crate::app::ports::SystemControl;

#[derive(Debug, Default)]
pub struct WatchdogRestart {
    requests: u32,
}

impl WatchdogRestart {
    pub fn new() -> Self {
        Self { requests: 0 }
    }

    /// Restarts requested so far (always 0 on target).
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl SystemControl for WatchdogRestart {
    fn restart(&mut self) {
        self.requests = self.requests.wrapping_add(1);
        warn!("SYSTEM: restarting controller");

        #[cfg(target_os = "espidf")]
        {
            // SAFETY: esp_restart has no preconditions and does not return.
            unsafe { esp_idf_svc::sys::esp_restart() };
        }
    }
}
