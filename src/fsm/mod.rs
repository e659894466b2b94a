//! Table-driven finite state machine engine.
//!
//! Shared by the session, menu and RFID machines:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  Transition table  [state][event]                    │
//! │  ┌──────────┬─────────────┬─────────────┬─────┐      │
//! │  │          │ event 0     │ event 1     │ ... │      │
//! │  ├──────────┼─────────────┼─────────────┼─────┤      │
//! │  │ state 0  │ (next, act) │ (next, act) │     │      │
//! │  │ state 1  │ (next, act) │ (next, act) │     │      │
//! │  │ ...      │             │             │     │      │
//! │  └──────────┴─────────────┴─────────────┴─────┘      │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! A machine is a closed set of state, event and action enums plus a
//! static table with one cell per `(state, event)` pair, so lookup is
//! total by construction.  Unused cells hold a self-loop with the
//! machine's no-op action.
//!
//! Actions never call back into the engine.  An action that wants to
//! chain into the next step [`raise`](Dispatcher::raise)s an event; the
//! owning machine drains the queue with [`step`](Dispatcher::step) in a
//! plain loop, so chained events run in FIFO order at constant stack
//! depth.

use core::fmt::Debug;

use heapless::Deque;
use log::{debug, info};

use crate::error::{Error, Result};

/// Default depth of a machine's pending-event queue.
pub const EVENT_QUEUE_DEPTH: usize = 4;

// ---------------------------------------------------------------------------
// Table cell
// ---------------------------------------------------------------------------

/// One cell of a transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S, A> {
    pub next: S,
    pub action: A,
}

/// Shorthand for building table rows.
pub const fn to<S, A>(next: S, action: A) -> Transition<S, A> {
    Transition { next, action }
}

// ---------------------------------------------------------------------------
// Machine description
// ---------------------------------------------------------------------------

/// Static description of one table-driven machine.
pub trait Machine {
    type State: Copy + Eq + Debug + 'static;
    type Event: Copy + Eq + Debug + 'static;
    type Action: Copy + Eq + Debug;

    /// Tag used in transition logs.
    const NAME: &'static str;
    /// Every state, in table row order.
    const STATES: &'static [Self::State];
    /// Every event, in table column order.
    const EVENTS: &'static [Self::Event];

    /// Look up the cell for `(state, event)`.
    fn transition(state: Self::State, event: Self::Event) -> Transition<Self::State, Self::Action>;
}

/// Visit every cell of `M`'s table.
pub fn for_each_cell<M: Machine>(
    mut visit: impl FnMut(M::State, M::Event, Transition<M::State, M::Action>),
) {
    for &state in M::STATES {
        for &event in M::EVENTS {
            visit(state, event, M::transition(state, event));
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Current state plus the queue of events raised by actions.
pub struct Dispatcher<M: Machine, const Q: usize = EVENT_QUEUE_DEPTH> {
    state: M::State,
    pending: Deque<M::Event, Q>,
}

impl<M: Machine, const Q: usize> Dispatcher<M, Q> {
    pub fn new(initial: M::State) -> Self {
        Self {
            state: initial,
            pending: Deque::new(),
        }
    }

    pub fn state(&self) -> M::State {
        self.state
    }

    /// Move to `state` without running a table lookup and drop any
    /// pending events.
    pub fn reset(&mut self, state: M::State) {
        self.state = state;
        self.pending.clear();
    }

    /// Apply one event: update the state and return the action to run.
    pub fn dispatch(&mut self, event: M::Event) -> M::Action {
        let cell = M::transition(self.state, event);
        if cell.next == self.state {
            debug!("{} {:?}: {:?} -> {:?}", M::NAME, event, self.state, cell.action);
        } else {
            info!(
                "{} transition: {:?} -> {:?} on {:?}",
                M::NAME,
                self.state,
                cell.next,
                event
            );
        }
        self.state = cell.next;
        cell.action
    }

    /// Queue `event` for the next [`step`](Self::step).
    pub fn raise(&mut self, event: M::Event) -> Result<()> {
        self.pending
            .push_back(event)
            .map_err(|_| Error::QueueFull(M::NAME))
    }

    /// Dispatch the oldest pending event.  `None` once the queue is empty.
    pub fn step(&mut self) -> Option<M::Action> {
        let event = self.pending.pop_front()?;
        Some(self.dispatch(event))
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
