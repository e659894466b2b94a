//! Per-exchange context for the RFID machine.
//!
//! `RfidContext` holds what the actions read and write while one
//! [`Sequence`] runs: which operation is current, the raw reply buffer,
//! the card-id cursor, and the decoded [`CardData`] that outlives the
//! exchange.

use heapless::{String, Vec};

use crate::error::CardError;

/// Size of the raw reply buffer.
pub const EXCHANGE_BUFFER_LEN: usize = 100;
/// Hex characters in a card id (7 id bytes).
pub const UID_HEX_LEN: usize = 14;
/// Data bytes in one card block.
pub const BLOCK_LEN: usize = 16;
/// PIN digits stored at the start of the PIN block.
pub const PIN_LEN: usize = 4;

pub type BlockData = [u8; BLOCK_LEN];

// ---------------------------------------------------------------------------
// Reader opcodes
// ---------------------------------------------------------------------------

pub const OP_READ_UID: u8 = 0x55;
pub const OP_READ_BLOCK: u8 = 0x52;
pub const OP_WRITE_BLOCK: u8 = 0x57;
/// Trailing byte of every block command.
pub const OP_BLOCK_SUFFIX: u8 = 0x01;
/// Dummy byte clocked out to shift one reply byte in.
pub const OP_CLOCK: u8 = 0xF5;

/// Card memory block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    Pin,
    Debt,
    PastExpense,
    PastEnergy,
}

impl Block {
    pub const fn address(self) -> u8 {
        match self {
            Self::Pin => 0x01,
            Self::Debt => 0x02,
            Self::PastExpense => 0x04,
            Self::PastEnergy => 0x05,
        }
    }
}

/// One reader command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ReadUid,
    Read(Block),
    Write(Block),
    /// Overwrite the debt block with six ASCII zeros.
    DeleteCredit,
}

/// A linear run of operations started by one call into the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sequence {
    /// uid → PIN → debt → past consumption → past expense.
    OfflineBootstrap,
    /// uid → debt.
    OnlineFirstRead,
    /// debt → past consumption → past expense, all writes.
    OfflineSettlement,
    DeleteCredit,
}

impl Sequence {
    pub const fn operations(self) -> &'static [Operation] {
        match self {
            Self::OfflineBootstrap => &[
                Operation::ReadUid,
                Operation::Read(Block::Pin),
                Operation::Read(Block::Debt),
                Operation::Read(Block::PastEnergy),
                Operation::Read(Block::PastExpense),
            ],
            Self::OnlineFirstRead => &[Operation::ReadUid, Operation::Read(Block::Debt)],
            Self::OfflineSettlement => &[
                Operation::Write(Block::Debt),
                Operation::Write(Block::PastEnergy),
                Operation::Write(Block::PastExpense),
            ],
            Self::DeleteCredit => &[Operation::DeleteCredit],
        }
    }
}

// ---------------------------------------------------------------------------
// Decoded card contents
// ---------------------------------------------------------------------------

/// Values read from (or staged for) the card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardData {
    /// Card id as upper-case hex.
    pub uid: String<UID_HEX_LEN>,
    pub pin: [u8; PIN_LEN],
    pub debt: BlockData,
    pub past_energy: BlockData,
    pub past_expense: BlockData,
}

impl Default for CardData {
    fn default() -> Self {
        Self {
            uid: String::new(),
            pin: [0; PIN_LEN],
            debt: [0; BLOCK_LEN],
            past_energy: [0; BLOCK_LEN],
            past_expense: [0; BLOCK_LEN],
        }
    }
}

impl CardData {
    pub fn block(&self, block: Block) -> &[u8] {
        match block {
            Block::Pin => &self.pin,
            Block::Debt => &self.debt,
            Block::PastExpense => &self.past_expense,
            Block::PastEnergy => &self.past_energy,
        }
    }

    /// Stage `text` into a block, zero-padded, truncated to the block size.
    pub fn stage(&mut self, block: Block, text: &str) {
        let target: &mut [u8] = match block {
            Block::Pin => &mut self.pin,
            Block::Debt => &mut self.debt,
            Block::PastExpense => &mut self.past_expense,
            Block::PastEnergy => &mut self.past_energy,
        };
        target.fill(0);
        let n = text.len().min(target.len());
        target[..n].copy_from_slice(&text.as_bytes()[..n]);
    }
}

/// Text content of a zero-padded block.
pub fn block_text(block: &[u8]) -> &str {
    let end = block.iter().position(|&b| b == 0).unwrap_or(block.len());
    core::str::from_utf8(&block[..end]).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Exchange context
// ---------------------------------------------------------------------------

pub struct RfidContext {
    sequence: Sequence,
    /// Index of the current operation within the sequence.
    step: usize,
    /// Raw reply bytes of the current block operation.
    pub buffer: Vec<u8, EXCHANGE_BUFFER_LEN>,
    /// Card id characters, filled from the end backwards.
    uid_hex: [u8; UID_HEX_LEN],
    uid_cursor: usize,
    /// Set by the terminal transmit of the sequence.
    pub done: bool,
    pub card: CardData,
}

impl Default for RfidContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RfidContext {
    pub const fn new() -> Self {
        Self {
            sequence: Sequence::OnlineFirstRead,
            step: 0,
            buffer: Vec::new(),
            uid_hex: [b'0'; UID_HEX_LEN],
            uid_cursor: UID_HEX_LEN,
            done: false,
            card: CardData {
                uid: String::new(),
                pin: [0; PIN_LEN],
                debt: [0; BLOCK_LEN],
                past_energy: [0; BLOCK_LEN],
                past_expense: [0; BLOCK_LEN],
            },
        }
    }

    /// Arm a new sequence.  Staged card data is kept.
    pub fn begin(&mut self, sequence: Sequence) {
        self.sequence = sequence;
        self.step = 0;
        self.done = false;
        self.clear_reply();
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn operation(&self) -> Operation {
        let ops = self.sequence.operations();
        ops[self.step.min(ops.len() - 1)]
    }

    /// Move to the next operation.  Returns `false` when the sequence
    /// has run out.
    pub fn advance(&mut self) -> bool {
        self.step += 1;
        self.step < self.sequence.operations().len()
    }

    pub fn clear_reply(&mut self) {
        self.buffer.clear();
        self.uid_hex = [b'0'; UID_HEX_LEN];
        self.uid_cursor = UID_HEX_LEN;
    }

    /// Store one card-id byte as two hex characters, right to left.
    pub fn push_uid_byte(&mut self, byte: u8) -> Result<(), CardError> {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";
        if self.uid_cursor < 2 {
            return Err(CardError::BufferOverflow);
        }
        self.uid_cursor -= 2;
        self.uid_hex[self.uid_cursor] = HEX[usize::from(byte >> 4)];
        self.uid_hex[self.uid_cursor + 1] = HEX[usize::from(byte & 0x0F)];
        Ok(())
    }

    pub fn push_reply_byte(&mut self, byte: u8) -> Result<(), CardError> {
        self.buffer.push(byte).map_err(|_| CardError::BufferOverflow)
    }

    /// Copy the finished reply of the current operation into [`CardData`].
    ///
    /// Block replies start with one status byte.
    pub fn commit_reply(&mut self) {
        match self.operation() {
            Operation::ReadUid => {
                self.card.uid.clear();
                for &c in &self.uid_hex {
                    // Capacity equals the hex length.
                    let _ = self.card.uid.push(char::from(c));
                }
            }
            Operation::Read(block) => {
                let data = self.buffer.get(1..).unwrap_or(&[]);
                let target: &mut [u8] = match block {
                    Block::Pin => &mut self.card.pin,
                    Block::Debt => &mut self.card.debt,
                    Block::PastExpense => &mut self.card.past_expense,
                    Block::PastEnergy => &mut self.card.past_energy,
                };
                target.fill(0);
                let n = data.len().min(target.len());
                target[..n].copy_from_slice(&data[..n]);
            }
            Operation::Write(_) | Operation::DeleteCredit => {}
        }
        self.clear_reply();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uid_fills_from_the_end() {
        let mut ctx = RfidContext::new();
        ctx.begin(Sequence::OnlineFirstRead);
        ctx.push_uid_byte(0x04).unwrap();
        ctx.push_uid_byte(0xA2).unwrap();
        for b in [0x11, 0x22, 0x33, 0x44, 0x5F] {
            ctx.push_uid_byte(b).unwrap();
        }
        ctx.commit_reply();
        assert_eq!(ctx.card.uid.as_str(), "5F44332211A204");
    }

    #[test]
    fn eighth_uid_byte_overflows() {
        let mut ctx = RfidContext::new();
        for _ in 0..7 {
            ctx.push_uid_byte(0xFF).unwrap();
        }
        assert_eq!(ctx.push_uid_byte(0xFF), Err(CardError::BufferOverflow));
    }

    #[test]
    fn block_reply_skips_status_byte() {
        let mut ctx = RfidContext::new();
        ctx.begin(Sequence::OfflineBootstrap);
        assert!(ctx.advance());
        assert_eq!(ctx.operation(), Operation::Read(Block::Pin));
        for &b in b"\x001234000000000000" {
            ctx.push_reply_byte(b).unwrap();
        }
        ctx.commit_reply();
        assert_eq!(&ctx.card.pin, b"1234");
        assert!(ctx.buffer.is_empty());
    }

    #[test]
    fn sequences_have_expected_lengths() {
        assert_eq!(Sequence::OfflineBootstrap.operations().len(), 5);
        assert_eq!(Sequence::OnlineFirstRead.operations().len(), 2);
        assert_eq!(Sequence::OfflineSettlement.operations().len(), 3);
        assert_eq!(Sequence::DeleteCredit.operations().len(), 1);
    }

    #[test]
    fn stage_pads_and_truncates() {
        let mut card = CardData::default();
        card.stage(Block::Debt, "22.50");
        assert_eq!(block_text(&card.debt), "22.50");
        card.stage(Block::PastEnergy, "12345678901234567890");
        assert_eq!(block_text(&card.past_energy), "1234567890123456");
    }
}
