//! State shared by every machine of the station.
//!
//! `StationContext` is the one blackboard the session and menu actions
//! read from and write to: the identification outcome, the menu cursor,
//! the card exchange with its decoded card data, and the configuration.

use crate::config::StationConfig;
use crate::menu::MenuContext;
use crate::rfid::RfidExchange;
use crate::session::SessionContext;

pub struct StationContext {
    pub config: StationConfig,
    pub session: SessionContext,
    pub menu: MenuContext,
    pub rfid: RfidExchange,
}

impl StationContext {
    pub fn new(config: StationConfig) -> Self {
        Self {
            config,
            session: SessionContext::new(),
            menu: MenuContext::new(),
            rfid: RfidExchange::new(),
        }
    }
}
