//! Session authentication transition table.
//!
//! Events carry no fixed meaning of their own; each action raises the
//! letter that selects the next cell.  Cells not listed are self-loops
//! with no action.
//!
//! | state        | A               | B                  | C                   | D                    | E                | F                      | G                      | H            |
//! |--------------|-----------------|--------------------|---------------------|----------------------|------------------|------------------------|------------------------|--------------|
//! | Init         | Welcome         | InSession/Start    | AwaitKeypad/PIN     |                      |                  |                        |                        |              |
//! | AwaitDisplay | Welcome         |                    |                     |                      |                  |                        |                        |              |
//! | AwaitCard    | AwaitServer/Send|                    |                     | InSession/End        |                  |                        |                        |              |
//! | AwaitKeypad  | AwaitServer/Send|                    |                     |                      |                  |                        |                        |              |
//! | AwaitServer  | Receive         | AwaitKeypad/PIN    | Repeat              | InSession/End        | Receive          | InSession/Done         | AwaitKeypad/PIN        | Repeat       |
//! | InSession    | Offline/Welcome | Repeat             | AwaitCard/ReadCard  | End                  | Init/Welcome     | Start                  | IdleWaiting            |              |
//! | Offline      | ReadCardOffline | PIN                | CheckPinOffline     |                      |                  |                        | Done                   |              |

use crate::fsm::{Machine, Transition, to};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionState {
    Init = 0,
    AwaitDisplay = 1,
    AwaitCard = 2,
    AwaitKeypad = 3,
    AwaitServer = 4,
    InSession = 5,
    Offline = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SessionEvent {
    None = 0,
    A = 1,
    B = 2,
    C = 3,
    D = 4,
    E = 5,
    F = 6,
    G = 7,
    H = 8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionAction {
    NoAction,
    Welcome,
    StartSession,
    KeypadRead,
    Send,
    Receive,
    RepeatPacket,
    EndSession,
    SessionDone,
    RfidIdRead,
    OfflineWelcome,
    OfflineGetCardInfo,
    OfflinePinCheck,
    IdleWaiting,
}

pub struct SessionMachine;

use SessionAction::{
    EndSession, IdleWaiting, KeypadRead, NoAction, OfflineGetCardInfo, OfflinePinCheck,
    OfflineWelcome, Receive, RepeatPacket, RfidIdRead, Send, SessionDone, StartSession, Welcome,
};
use SessionState::{AwaitCard, AwaitDisplay, AwaitKeypad, AwaitServer, InSession, Init, Offline};

type Cell = Transition<SessionState, SessionAction>;

const fn idle_row(state: SessionState) -> [Cell; 9] {
    [to(state, NoAction); 9]
}

static TABLE: [[Cell; 9]; 7] = [
    /* Init */
    [
        to(Init, NoAction),
        to(Init, Welcome),
        to(InSession, StartSession),
        to(AwaitKeypad, KeypadRead),
        to(Init, NoAction),
        to(Init, NoAction),
        to(Init, NoAction),
        to(Init, NoAction),
        to(Init, NoAction),
    ],
    /* AwaitDisplay */
    {
        let mut row = idle_row(AwaitDisplay);
        row[1] = to(AwaitDisplay, Welcome);
        row
    },
    /* AwaitCard */
    {
        let mut row = idle_row(AwaitCard);
        row[1] = to(AwaitServer, Send);
        row[4] = to(InSession, EndSession);
        row
    },
    /* AwaitKeypad */
    {
        let mut row = idle_row(AwaitKeypad);
        row[1] = to(AwaitServer, Send);
        row
    },
    /* AwaitServer */
    [
        to(AwaitServer, NoAction),
        to(AwaitServer, Receive),
        to(AwaitKeypad, KeypadRead),
        to(AwaitServer, RepeatPacket),
        to(InSession, EndSession),
        to(AwaitServer, Receive),
        to(InSession, SessionDone),
        to(AwaitKeypad, KeypadRead),
        to(AwaitServer, RepeatPacket),
    ],
    /* InSession */
    [
        to(InSession, NoAction),
        to(Offline, OfflineWelcome),
        to(InSession, RepeatPacket),
        to(AwaitCard, RfidIdRead),
        to(InSession, EndSession),
        to(Init, Welcome),
        to(InSession, StartSession),
        to(InSession, IdleWaiting),
        to(InSession, NoAction),
    ],
    /* Offline */
    {
        let mut row = idle_row(Offline);
        row[1] = to(Offline, OfflineGetCardInfo);
        row[2] = to(Offline, KeypadRead);
        row[3] = to(Offline, OfflinePinCheck);
        row[7] = to(Offline, SessionDone);
        row
    },
];

impl Machine for SessionMachine {
    type State = SessionState;
    type Event = SessionEvent;
    type Action = SessionAction;

    const NAME: &'static str = "SESSION";
    const STATES: &'static [SessionState] =
        &[Init, AwaitDisplay, AwaitCard, AwaitKeypad, AwaitServer, InSession, Offline];
    const EVENTS: &'static [SessionEvent] = &[
        SessionEvent::None,
        SessionEvent::A,
        SessionEvent::B,
        SessionEvent::C,
        SessionEvent::D,
        SessionEvent::E,
        SessionEvent::F,
        SessionEvent::G,
        SessionEvent::H,
    ];

    fn transition(state: SessionState, event: SessionEvent) -> Cell {
        TABLE[state as usize][event as usize]
    }
}
