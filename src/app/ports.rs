//! Port traits — the boundary between the state machines and the station hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Session / Menu / RFID machines
//! ```
//!
//! Everything the controller touches (character display, keypad, energy
//! meter, server UART, card reader, watchdog) is reached through one of
//! these traits.  [`StationHw`] bundles them so an action only needs a
//! single `&mut impl StationHw`; the ESP-IDF adapters and the host-side
//! mocks both implement the full set.

use embedded_hal::delay::DelayNs;

use crate::error::{CardError, FrameError, LinkError};
use crate::protocol::Frame;

// ───────────────────────────────────────────────────────────────
// Display port (domain → 20x4 character display)
// ───────────────────────────────────────────────────────────────

pub trait Display {
    /// Blank the whole screen and home the cursor.
    fn clear_display(&mut self);

    /// Write `text` starting at column `x`, row `y`.
    fn display_text(&mut self, x: u8, y: u8, text: &str);
}

pub const DISPLAY_COLUMNS: u8 = 20;
pub const DISPLAY_ROWS: u8 = 4;

/// One formatted display row (bytes, so glyphs may take two).
pub type Line = heapless::String<32>;

/// Glyph the display maps to the selection arrow (CGRAM slot 1).
pub const ARROW_GLYPH: &str = "\u{1}";
/// Glyph the display maps to the done mark (CGRAM slot 0).
pub const DONE_GLYPH: &str = "\u{0}";
/// Solid 5x8 cell used for the charging progress bar.
pub const FULL_CELL_GLYPH: &str = "\u{ff}";

// ───────────────────────────────────────────────────────────────
// Keypad port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// One key of the 4x4 matrix keypad.
///
/// ```text
///   1 2 3 F
///   4 5 6 E
///   7 8 9 D
///   A 0 B C
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Digit(u8),
    /// Accept / select.
    A,
    /// Back / cancel.
    B,
    /// Cursor down.
    C,
    D,
    E,
    /// Cursor up.
    F,
}

impl Key {
    /// Map the keypad's ASCII legend to a key.
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '0'..='9' => Self::Digit(c as u8 - b'0'),
            'A' => Self::A,
            'B' => Self::B,
            'C' => Self::C,
            'D' => Self::D,
            'E' => Self::E,
            'F' => Self::F,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Digit(d) => char::from(b'0' + d % 10),
            Self::A => 'A',
            Self::B => 'B',
            Self::C => 'C',
            Self::D => 'D',
            Self::E => 'E',
            Self::F => 'F',
        }
    }
}

/// Debounced key source.
pub trait Keypad {
    /// Return the next debounced key press, if one is pending.
    fn poll_key(&mut self) -> Option<Key>;
}

// ───────────────────────────────────────────────────────────────
// Energy meter port (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait EnergyMeter {
    /// Energy delivered since the previous sample (one sample period).
    fn sample_energy(&mut self) -> f32;
}

// ───────────────────────────────────────────────────────────────
// Server port (domain ↔ billing server UART)
// ───────────────────────────────────────────────────────────────

/// Framed link to the billing server.
///
/// Outbound frames are already encoded; inbound frames are assembled by
/// the interrupt-fed [`PacketReceiver`](crate::protocol::receiver::PacketReceiver).
pub trait ServerPort {
    /// Transmit one encoded frame.
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Return the next completed frame, if any.  Returns `Some` exactly
    /// once per frame.
    fn poll_frame(&mut self) -> Option<Result<Frame, FrameError>>;
}

// ───────────────────────────────────────────────────────────────
// Card reader port (domain ↔ RFID module)
// ───────────────────────────────────────────────────────────────

/// Edge signals raised by the card reader's two interrupt lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEdge {
    /// Presence line rose: a card entered the field.
    Present,
    /// Presence line fell: the card left the field.
    Removed,
    /// Data line: the reply to the last command is ready to clock out.
    DataReady,
    /// Data line: the reader has finished its reply.
    StartTransmit,
}

pub trait CardReader {
    /// Level of the presence line.
    fn card_present(&self) -> bool;

    /// Next edge latched by the reader interrupts, if any.
    fn poll_edge(&mut self) -> Option<CardEdge>;

    /// Full-duplex single-byte transfer.  Returns the byte clocked in.
    fn exchange(&mut self, byte: u8) -> Result<u8, CardError>;
}

// ───────────────────────────────────────────────────────────────
// System control port
// ───────────────────────────────────────────────────────────────

pub trait SystemControl {
    /// Arm the watchdog and let it reset the controller.
    ///
    /// On target this does not return.  Host implementations record the
    /// request and return so the caller can unwind.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Bundle
// ───────────────────────────────────────────────────────────────

/// Everything the station's machines need, in one bound.
pub trait StationHw:
    Display + Keypad + EnergyMeter + ServerPort + CardReader + SystemControl + DelayNs
{
}

impl<T> StationHw for T where
    T: Display + Keypad + EnergyMeter + ServerPort + CardReader + SystemControl + DelayNs
{
}
