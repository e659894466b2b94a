//! RFID card exchange.
//!
//! Drives the card reader through one [`Sequence`] of reads or writes.
//! The reader's two interrupt lines are levels, not one-shot events: the
//! last edge seen stays latched and is re-applied on every pass, which
//! is what makes `ReadBuffer` clock out one reply byte per pass until the
//! reader drops its data line.  `TransmitString` chains to the next
//! operation by latching `CardPresent` itself, or ends the exchange by
//! latching `Nil`.

pub mod context;
pub mod edges;
pub mod machine;
pub mod spi;

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

pub use context::{Block, CardData, Operation, RfidContext, Sequence, block_text};
pub use machine::{RfidAction, RfidEvent, RfidMachine, RfidState};

use context::{OP_BLOCK_SUFFIX, OP_CLOCK, OP_READ_BLOCK, OP_READ_UID, OP_WRITE_BLOCK};
use crate::app::ports::CardReader;
use crate::error::{CardError, Result};
use crate::fsm::Dispatcher;

/// Settle time before each reply byte is clocked out.
const BYTE_SETTLE_MS: u32 = 2;
/// ASCII zeros written by a delete.
const DELETE_FILL: [u8; 6] = [b'0'; 6];

pub struct RfidExchange {
    engine: Dispatcher<RfidMachine>,
    ctx: RfidContext,
    latched: RfidEvent,
}

impl Default for RfidExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl RfidExchange {
    pub fn new() -> Self {
        Self {
            engine: Dispatcher::new(RfidState::Idle),
            ctx: RfidContext::new(),
            latched: RfidEvent::Nil,
        }
    }

    pub fn state(&self) -> RfidState {
        self.engine.state()
    }

    pub fn card(&self) -> &CardData {
        &self.ctx.card
    }

    pub fn card_mut(&mut self) -> &mut CardData {
        &mut self.ctx.card
    }

    /// Run `sequence` to completion.
    ///
    /// Returns [`CardError::Absent`] once `poll_limit` consecutive passes
    /// make no progress (`0` waits forever).
    pub fn run(
        &mut self,
        sequence: Sequence,
        hw: &mut (impl CardReader + DelayNs),
        poll_limit: u32,
    ) -> Result<()> {
        info!("RFID: starting {:?}", sequence);
        self.ctx.begin(sequence);
        self.engine.reset(RfidState::Idle);
        self.latched = if hw.card_present() {
            RfidEvent::CardPresent
        } else {
            RfidEvent::Nil
        };

        let mut idle_passes: u32 = 0;
        while !self.ctx.done {
            let edge = hw.poll_edge();
            if let Some(edge) = edge {
                self.latched = edge.into();
            }

            let action = self.engine.dispatch(self.latched);
            if edge.is_none() && action == RfidAction::NoAction {
                idle_passes = idle_passes.saturating_add(1);
                if poll_limit != 0 && idle_passes >= poll_limit {
                    warn!("RFID: no card activity in {:?}", self.engine.state());
                    return Err(CardError::Absent.into());
                }
            } else {
                idle_passes = 0;
            }

            self.perform(action, hw)?;
        }
        info!("RFID: {:?} complete", sequence);
        Ok(())
    }

    fn perform(&mut self, action: RfidAction, hw: &mut (impl CardReader + DelayNs)) -> Result<()> {
        match action {
            RfidAction::NoAction => Ok(()),
            RfidAction::SendCommand => self.send_command(hw),
            RfidAction::ReadBuffer => self.read_buffer(hw),
            RfidAction::TransmitString => {
                self.transmit_string();
                Ok(())
            }
        }
    }

    fn send_command(&mut self, hw: &mut impl CardReader) -> Result<()> {
        let op = self.ctx.operation();
        debug!("RFID: command {:?}", op);
        self.ctx.clear_reply();
        match op {
            Operation::ReadUid => {
                hw.exchange(OP_READ_UID)?;
            }
            Operation::Read(block) => {
                for byte in [OP_READ_BLOCK, block.address(), OP_BLOCK_SUFFIX] {
                    hw.exchange(byte)?;
                }
            }
            Operation::Write(block) => {
                for byte in [OP_WRITE_BLOCK, block.address(), OP_BLOCK_SUFFIX] {
                    hw.exchange(byte)?;
                }
                let staged = self.ctx.card.block(block);
                let mut data = [0u8; context::BLOCK_LEN];
                let n = staged.len().min(data.len());
                data[..n].copy_from_slice(&staged[..n]);
                for byte in data {
                    hw.exchange(byte)?;
                }
            }
            Operation::DeleteCredit => {
                for byte in [OP_WRITE_BLOCK, Block::Debt.address(), OP_BLOCK_SUFFIX] {
                    hw.exchange(byte)?;
                }
                for byte in DELETE_FILL {
                    hw.exchange(byte)?;
                }
            }
        }
        Ok(())
    }

    fn read_buffer(&mut self, hw: &mut (impl CardReader + DelayNs)) -> Result<()> {
        hw.delay_ms(BYTE_SETTLE_MS);
        let byte = hw.exchange(OP_CLOCK)?;
        if self.ctx.operation() == Operation::ReadUid {
            self.ctx.push_uid_byte(byte)?;
        } else {
            self.ctx.push_reply_byte(byte)?;
        }
        Ok(())
    }

    fn transmit_string(&mut self) {
        self.ctx.commit_reply();
        if self.ctx.advance() {
            debug!("RFID: next {:?}", self.ctx.operation());
            self.latched = RfidEvent::CardPresent;
        } else {
            self.ctx.done = true;
            self.latched = RfidEvent::Nil;
        }
    }
}
