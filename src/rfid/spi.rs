//! [`CardReader`] over an `embedded-hal` SPI bus plus the interrupt edge queue.

use embedded_hal::spi::SpiBus;
use log::{trace, warn};

use super::edges::EdgeSignals;
use crate::app::ports::{CardEdge, CardReader};
use crate::error::CardError;

pub struct SpiCardReader<'e, SPI> {
    spi: SPI,
    edges: &'e EdgeSignals,
    present: bool,
    dropped_seen: u32,
}

impl<'e, SPI: SpiBus<u8>> SpiCardReader<'e, SPI> {
    pub fn new(spi: SPI, edges: &'e EdgeSignals) -> Self {
        Self {
            spi,
            edges,
            present: false,
            dropped_seen: 0,
        }
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI: SpiBus<u8>> CardReader for SpiCardReader<'_, SPI> {
    fn card_present(&self) -> bool {
        self.present
    }

    fn poll_edge(&mut self) -> Option<CardEdge> {
        let dropped = self.edges.dropped();
        if dropped != self.dropped_seen {
            warn!("RFID: {} edges lost", dropped.wrapping_sub(self.dropped_seen));
            self.dropped_seen = dropped;
        }
        let edge = self.edges.next_edge()?;
        match edge {
            CardEdge::Present => self.present = true,
            CardEdge::Removed => self.present = false,
            CardEdge::DataReady | CardEdge::StartTransmit => {}
        }
        Some(edge)
    }

    fn exchange(&mut self, byte: u8) -> Result<u8, CardError> {
        let mut word = [byte];
        self.spi
            .transfer_in_place(&mut word)
            .and_then(|()| self.spi.flush())
            .map_err(|_| CardError::Bus)?;
        trace!("RFID SPI: {:02X} -> {:02X}", byte, word[0]);
        Ok(word[0])
    }
}
