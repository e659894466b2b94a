//! RFID exchange transition table.
//!
//! | state \ event | Nil          | CardPresent              | DataReady            | StartTransmit                 |
//! |---------------|--------------|--------------------------|----------------------|-------------------------------|
//! | Idle          | Idle         | Commanding / send        | Reading              | Idle                          |
//! | Commanding    | Idle         | WaitData                 | Reading              | Idle                          |
//! | WaitData      | Idle         | WaitData                 | Reading              | Idle                          |
//! | Reading       | Idle         | WaitData                 | Reading / read byte  | Presenting                    |
//! | Presenting    | Idle         | WaitRemoved              | Reading              | Presenting / transmit         |
//! | WaitRemoved   | Idle         | Commanding / send        | WaitRemoved          | WaitRemoved                   |

use crate::app::ports::CardEdge;
use crate::fsm::{Machine, Transition, to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RfidState {
    Idle = 0,
    Commanding = 1,
    WaitData = 2,
    Reading = 3,
    Presenting = 4,
    WaitRemoved = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RfidEvent {
    Nil = 0,
    CardPresent = 1,
    DataReady = 2,
    StartTransmit = 3,
}

impl From<CardEdge> for RfidEvent {
    fn from(edge: CardEdge) -> Self {
        match edge {
            CardEdge::Present => Self::CardPresent,
            CardEdge::Removed => Self::Nil,
            CardEdge::DataReady => Self::DataReady,
            CardEdge::StartTransmit => Self::StartTransmit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfidAction {
    NoAction,
    /// Shift the current operation's command bytes to the reader.
    SendCommand,
    /// Clock one reply byte out of the reader.
    ReadBuffer,
    /// Interpret the reply and pick the next operation of the sequence.
    TransmitString,
}

pub struct RfidMachine;

use RfidAction::{NoAction, ReadBuffer, SendCommand, TransmitString};
use RfidState::{Commanding, Idle, Presenting, Reading, WaitData, WaitRemoved};

static TABLE: [[Transition<RfidState, RfidAction>; 4]; 6] = [
    /* Idle        */
    [to(Idle, NoAction), to(Commanding, SendCommand), to(Reading, NoAction), to(Idle, NoAction)],
    /* Commanding  */
    [to(Idle, NoAction), to(WaitData, NoAction), to(Reading, NoAction), to(Idle, NoAction)],
    /* WaitData    */
    [to(Idle, NoAction), to(WaitData, NoAction), to(Reading, NoAction), to(Idle, NoAction)],
    /* Reading     */
    [to(Idle, NoAction), to(WaitData, NoAction), to(Reading, ReadBuffer), to(Presenting, NoAction)],
    /* Presenting  */
    [to(Idle, NoAction), to(WaitRemoved, NoAction), to(Reading, NoAction), to(Presenting, TransmitString)],
    /* WaitRemoved */
    [to(Idle, NoAction), to(Commanding, SendCommand), to(WaitRemoved, NoAction), to(WaitRemoved, NoAction)],
];

impl Machine for RfidMachine {
    type State = RfidState;
    type Event = RfidEvent;
    type Action = RfidAction;

    const NAME: &'static str = "RFID";
    const STATES: &'static [RfidState] = &[Idle, Commanding, WaitData, Reading, Presenting, WaitRemoved];
    const EVENTS: &'static [RfidEvent] = &[
        RfidEvent::Nil,
        RfidEvent::CardPresent,
        RfidEvent::DataReady,
        RfidEvent::StartTransmit,
    ];

    fn transition(state: RfidState, event: RfidEvent) -> Transition<RfidState, RfidAction> {
        TABLE[state as usize][event as usize]
    }
}
