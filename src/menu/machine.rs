//! Menu navigation transition table.
//!
//! | state       | None              | A1                | B2                    | C3                | D4                         | E5                 |
//! |-------------|-------------------|-------------------|-----------------------|-------------------|----------------------------|--------------------|
//! | Init        | Idle / EndSession | RetrievePrice     | DrawMenu              | Charge / Charging | Consumption / Consumption  | Balance / Balance  |
//! | Charge      |                   | Init / DrawMenu   |                       |                   |                            |                    |
//! | Consumption |                   | Init / DrawMenu   |                       |                   |                            |                    |
//! | Balance     |                   | Init / DrawMenu   |                       |                   |                            |                    |
//! | Idle        |                   | IdleWaiting       | Init / Identification |                   |                            |                    |

use crate::fsm::{Machine, Transition, to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MenuState {
    Init = 0,
    Charge = 1,
    Consumption = 2,
    Balance = 3,
    Idle = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MenuEvent {
    None = 0,
    A1 = 1,
    B2 = 2,
    C3 = 3,
    D4 = 4,
    E5 = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuAction {
    NoAction,
    RetrievePrice,
    DrawMenu,
    Charging,
    GetConsumption,
    GetBalance,
    EndSession,
    Identification,
    IdleWaiting,
}

pub struct MenuMachine;

use MenuAction::{
    Charging, DrawMenu, EndSession, GetBalance, GetConsumption, IdleWaiting, Identification,
    NoAction, RetrievePrice,
};
use MenuState::{Balance, Charge, Consumption, Idle, Init};

type Cell = Transition<MenuState, MenuAction>;

/// Result screens: only A1 (back to the menu) does anything.
const fn result_row(state: MenuState) -> [Cell; 6] {
    let mut row = [to(state, NoAction); 6];
    row[1] = to(Init, DrawMenu);
    row
}

static TABLE: [[Cell; 6]; 5] = [
    /* Init */
    [
        to(Idle, EndSession),
        to(Init, RetrievePrice),
        to(Init, DrawMenu),
        to(Charge, Charging),
        to(Consumption, GetConsumption),
        to(Balance, GetBalance),
    ],
    result_row(Charge),
    result_row(Consumption),
    result_row(Balance),
    /* Idle */
    [
        to(Idle, NoAction),
        to(Idle, IdleWaiting),
        to(Init, Identification),
        to(Idle, NoAction),
        to(Idle, NoAction),
        to(Idle, NoAction),
    ],
];

impl Machine for MenuMachine {
    type State = MenuState;
    type Event = MenuEvent;
    type Action = MenuAction;

    const NAME: &'static str = "MENU";
    const STATES: &'static [MenuState] = &[Init, Charge, Consumption, Balance, Idle];
    const EVENTS: &'static [MenuEvent] = &[
        MenuEvent::None,
        MenuEvent::A1,
        MenuEvent::B2,
        MenuEvent::C3,
        MenuEvent::D4,
        MenuEvent::E5,
    ];

    fn transition(state: MenuState, event: MenuEvent) -> Cell {
        TABLE[state as usize][event as usize]
    }
}
