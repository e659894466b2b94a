//! Station service: the hexagonal core of the controller.
//!
//! [`Station`] owns the menu machine (which owns the session machine)
//! and the shared [`StationContext`].  Hardware is injected per call, so
//! the whole boot-to-restart cycle runs against mocks on the host.
//!
//! ```text
//!   Keypad, CardReader ──▶ ┌──────────────────────┐ ──▶ Display
//!                          │       Station        │
//!   ServerPort ◀──────────▶│  Menu · Session · RF │ ──▶ SystemControl
//!                          └──────────────────────┘
//! ```

use log::info;

use crate::config::StationConfig;
use crate::error::Result;
use crate::menu::{MenuFsm, MenuState};
use crate::session::SessionState;

use super::context::StationContext;
use super::ports::StationHw;

// ───────────────────────────────────────────────────────────────
// Station
// ───────────────────────────────────────────────────────────────

pub struct Station {
    ctx: StationContext,
    menu: MenuFsm,
    cycles: u32,
}

impl Station {
    /// Build the station from a validated configuration.
    pub fn new(config: StationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ctx: StationContext::new(config),
            menu: MenuFsm::new(),
            cycles: 0,
        })
    }

    /// Run one boot cycle: idle screen, identification, menu, session end.
    ///
    /// Returns once the controller has been asked to restart.  On target
    /// the restart never returns, so this is only reached on the host.
    pub fn run(&mut self, hw: &mut impl StationHw) -> Result<()> {
        self.cycles = self.cycles.wrapping_add(1);
        info!(
            "STATION: cycle {} (station {:02}, server {:02})",
            self.cycles, self.ctx.config.station_id, self.ctx.config.server_id
        );
        self.menu.run(&mut self.ctx, hw)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn context(&self) -> &StationContext {
        &self.ctx
    }

    pub fn config(&self) -> &StationConfig {
        &self.ctx.config
    }

    pub fn menu_state(&self) -> MenuState {
        self.menu.state()
    }

    pub fn session_state(&self) -> SessionState {
        self.menu.session().state()
    }

    /// Boot cycles run so far.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}
