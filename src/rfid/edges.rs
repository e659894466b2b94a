//! Card reader interrupt lines → foreground edge queue.
//!
//! ```text
//! ┌──────────────┐ presence ┐
//! │ INT0 (level) │──────────┤ try_send ┌────────────┐ try_receive ┌──────────┐
//! └──────────────┘          ├─────────▶│ EdgeSignals│────────────▶│ RFID FSM │
//! ┌──────────────┐ data     │          └────────────┘             └──────────┘
//! │ INT1 (level) │──────────┘
//! └──────────────┘
//! ```
//!
//! Each line has its own handler and each handler reads the line level,
//! so an edge is tagged by the line and level it came from.  A missed
//! edge cannot swap the meaning of later ones.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::app::ports::CardEdge;

/// Edges buffered between the interrupt and the foreground.
pub const EDGE_QUEUE_DEPTH: usize = 8;

pub struct EdgeSignals {
    channel: Channel<CriticalSectionRawMutex, CardEdge, EDGE_QUEUE_DEPTH>,
    dropped: AtomicU32,
}

impl Default for EdgeSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeSignals {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Presence-line interrupt.  `high` is the line level after the edge.
    pub fn on_presence_edge(&self, high: bool) {
        self.push(if high { CardEdge::Present } else { CardEdge::Removed });
    }

    /// Data-line interrupt.  The reader raises the line when a reply is
    /// ready and drops it when the reply has been sent.
    pub fn on_data_edge(&self, high: bool) {
        self.push(if high {
            CardEdge::DataReady
        } else {
            CardEdge::StartTransmit
        });
    }

    /// Foreground side: next latched edge, if any.
    pub fn next_edge(&self) -> Option<CardEdge> {
        self.channel.try_receive().ok()
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Interrupt context: never logs, never blocks.
    fn push(&self, edge: CardEdge) {
        if self.channel.try_send(edge).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
