//! Identification outcome shared by the session and menu machines.

use heapless::String;

use crate::app::amount::{Amount, normalize_amount};
use crate::rfid::{CardData, block_text};

/// Digits in a PIN.
pub const PIN_DIGITS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Billing server reachable; it checks the PIN and keeps the account.
    Online,
    /// Server unreachable; PIN and account live on the card.
    Offline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    /// Identification finished successfully.
    pub identified: bool,
    pub mode: Mode,
    /// PIN as typed by the user.
    pub pin: String<PIN_DIGITS>,
    /// Card id, upper-case hex.
    pub card_id: String<14>,
    pub credit: Amount,
    pub past_energy: Amount,
    pub past_expense: Amount,
    /// Price per kWs for this session, in whole dkk.
    pub price: u16,

    // --- Pending sends and retries ---
    /// The card id has been read and still has to be reported.
    pub card_pending: bool,
    /// A PIN has been typed and still has to be checked.
    pub pin_pending: bool,
    /// A repeat request went out; the next wait must not resend.
    pub repeat_requested: bool,
    /// Repeat requests since the last understood reply.
    pub repeats: u8,

    // --- Offline PIN check ---
    pub incorrect_pin: bool,
    pub pin_failures: u8,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self {
            identified: false,
            mode: Mode::Online,
            pin: String::new(),
            card_id: String::new(),
            credit: Amount::new(),
            past_energy: Amount::new(),
            past_expense: Amount::new(),
            price: 0,
            card_pending: false,
            pin_pending: false,
            repeat_requested: false,
            repeats: 0,
            incorrect_pin: false,
            pin_failures: 0,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.mode == Mode::Offline
    }

    /// Copy the card id and the numeric card fields, normalized.
    pub fn load_card(&mut self, card: &CardData) {
        self.card_id.clone_from(&card.uid);
        self.credit = normalize_amount(block_text(&card.debt));
        self.past_energy = normalize_amount(block_text(&card.past_energy));
        self.past_expense = normalize_amount(block_text(&card.past_expense));
    }

    /// Logical reset at the end of a session.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
