//! Menu cursor and the results of the current session's charge.

use heapless::String;

use crate::app::amount::Amount;

/// Row of the Charge entry.
pub const CHARGE_ITEM: u8 = 1;
/// Row of the Consumption entry.
pub const CONSUMPTION_ITEM: u8 = 2;
/// Row of the Balance / Debit entry.
pub const BALANCE_ITEM: u8 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct MenuContext {
    /// Row the arrow points at.
    pub position: u8,
    /// First selectable row; moves past Charge once it has been used.
    pub first_item: u8,
    pub last_item: u8,
    /// A charge has completed in this session.
    pub charged: bool,
    /// Price as shown in the menu header.
    pub price_text: String<2>,
    /// Energy of the completed charge.
    pub energy: Amount,
    /// Cost of the completed charge.
    pub cost: Amount,
}

impl Default for MenuContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuContext {
    pub fn new() -> Self {
        Self {
            position: CHARGE_ITEM,
            first_item: CHARGE_ITEM,
            last_item: BALANCE_ITEM,
            charged: false,
            price_text: String::new(),
            energy: Amount::new(),
            cost: Amount::new(),
        }
    }

    /// Cursor up, wrapping from the first selectable row to the last.
    pub fn move_up(&mut self) {
        self.position = if self.position <= self.first_item {
            self.last_item
        } else {
            self.position - 1
        };
    }

    /// Cursor down, wrapping from the last row to the first selectable one.
    pub fn move_down(&mut self) {
        self.position = if self.position >= self.last_item {
            self.first_item
        } else {
            self.position + 1
        };
    }

    pub fn home(&mut self) {
        self.position = self.first_item;
    }

    /// Record a finished charge and retire the Charge entry.
    pub fn complete_charge(&mut self, energy: Amount, cost: Amount) {
        self.energy = energy;
        self.cost = cost;
        self.charged = true;
        self.first_item = CONSUMPTION_ITEM;
        self.position = CONSUMPTION_ITEM;
    }
}
