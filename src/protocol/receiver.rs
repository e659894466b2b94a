//! Interrupt-fed frame receiver.
//!
//! ```text
//! ┌──────────┐ enqueue ┌─────────────┐ dequeue ┌────────────────┐
//! │ UART ISR │────────▶│ RxQueue     │────────▶│ PacketReceiver │──▶ Frame
//! │ (1 byte) │         │ (SPSC)      │         │  FrameAssembler│
//! └──────────┘         └─────────────┘         └────────────────┘
//! ```
//!
//! The ISR only copies the received byte into a lock-free single-producer
//! single-consumer queue.  The foreground loop drains it through a
//! [`FrameAssembler`] (`Idle → Collecting → Complete`) which arms on the
//! `*-` start marker and completes on the `-*` end marker.

use heapless::Vec;
use heapless::spsc::{Consumer, Producer, Queue};
use log::{debug, warn};

use super::codec::{self, END_MARKER, Frame, RX_BUFFER_LEN, START_MARKER};
use crate::error::FrameError;

/// Depth of the ISR → foreground byte queue (holds one less than this).
pub const RX_QUEUE_DEPTH: usize = 128;

pub type RxQueue = Queue<u8, RX_QUEUE_DEPTH>;

// ───────────────────────────────────────────────────────────────
// ISR side
// ───────────────────────────────────────────────────────────────

/// Producer half, owned by the byte-received interrupt.
pub struct ByteSink<'q> {
    tx: Producer<'q, u8, RX_QUEUE_DEPTH>,
    dropped: u32,
}

impl ByteSink<'_> {
    /// Called once per received byte.  Never blocks; a full queue drops
    /// the byte and counts it.
    pub fn on_byte_received(&mut self, byte: u8) -> bool {
        if self.tx.enqueue(byte).is_ok() {
            true
        } else {
            self.dropped = self.dropped.wrapping_add(1);
            false
        }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Split a queue into the ISR sink and the foreground receiver.
pub fn split(queue: &mut RxQueue, verify_checksum: bool) -> (ByteSink<'_>, PacketReceiver<'_>) {
    let (tx, rx) = queue.split();
    (
        ByteSink { tx, dropped: 0 },
        PacketReceiver {
            rx,
            assembler: FrameAssembler::new(),
            verify_checksum,
        },
    )
}

// ───────────────────────────────────────────────────────────────
// Frame assembler
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    /// Waiting for the start marker.
    Idle,
    /// Start marker seen, accumulating bytes.
    Collecting,
    /// End marker seen, frame waiting to be taken.
    Complete,
}

/// Accumulates raw bytes into the fixed frame buffer.
///
/// One slot beyond [`RX_BUFFER_LEN`] holds the first end-marker byte of a
/// full-size frame until the second one arrives.
pub struct FrameAssembler {
    state: RxState,
    buf: Vec<u8, { RX_BUFFER_LEN + 1 }>,
    prev: u8,
    overflowed: bool,
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler {
    pub const fn new() -> Self {
        Self {
            state: RxState::Idle,
            buf: Vec::new(),
            prev: 0,
            overflowed: false,
        }
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == RxState::Complete
    }

    /// Feed one byte.
    ///
    /// A start marker seen while a completed frame is still waiting
    /// overwrites that frame; there is no queuing.
    pub fn push(&mut self, byte: u8) {
        let prev = core::mem::replace(&mut self.prev, byte);
        let pair = [prev, byte];

        match self.state {
            RxState::Idle | RxState::Complete => {
                if pair == START_MARKER {
                    if self.state == RxState::Complete {
                        warn!("RX: unread frame overwritten by new start marker");
                    }
                    self.buf.clear();
                    self.overflowed = false;
                    self.prev = 0;
                    self.state = RxState::Collecting;
                }
            }
            RxState::Collecting => {
                if pair == END_MARKER {
                    // The first marker byte went into the buffer last time.
                    if !self.overflowed {
                        self.buf.pop();
                    }
                    self.prev = 0;
                    self.state = RxState::Complete;
                } else if self.buf.push(byte).is_err() {
                    self.overflowed = true;
                }
            }
        }
    }

    /// Take the completed frame, if any, and reset for the next one.
    ///
    /// Returns `Some` exactly once per completed frame.
    pub fn take_frame(&mut self, verify_checksum: bool) -> Option<Result<Frame, FrameError>> {
        if self.state != RxState::Complete {
            return None;
        }
        self.state = RxState::Idle;

        let result = if self.overflowed || self.buf.len() > RX_BUFFER_LEN {
            Err(FrameError::TooLong)
        } else {
            codec::decode(&self.buf).and_then(|view| {
                if verify_checksum {
                    view.verify()?;
                }
                view.to_frame()
            })
        };
        self.buf.clear();
        self.overflowed = false;

        match &result {
            Ok(frame) => debug!(
                "RX: frame {:02}->{:02} cmd={:02} len={}",
                frame.source,
                frame.destination,
                frame.command,
                frame.payload.len()
            ),
            Err(e) => warn!("RX: dropped frame: {}", e),
        }
        Some(result)
    }
}

// ───────────────────────────────────────────────────────────────
// Foreground side
// ───────────────────────────────────────────────────────────────

/// Consumer half plus the assembler, owned by the foreground loop.
pub struct PacketReceiver<'q> {
    rx: Consumer<'q, u8, RX_QUEUE_DEPTH>,
    assembler: FrameAssembler,
    verify_checksum: bool,
}

impl PacketReceiver<'_> {
    /// Drain queued bytes until a frame completes or the queue is empty.
    ///
    /// Bytes after a completed frame stay queued for the next poll.
    pub fn poll(&mut self) -> Option<Result<Frame, FrameError>> {
        while !self.assembler.is_complete() {
            match self.rx.dequeue() {
                Some(byte) => self.assembler.push(byte),
                None => break,
            }
        }
        self.assembler.take_frame(self.verify_checksum)
    }

    pub fn state(&self) -> RxState {
        self.assembler.state()
    }
}
