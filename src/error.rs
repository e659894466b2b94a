//! Unified error types for the eCharger firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! foreground loop's error handling uniform.  All variants are `Copy` so
//! they can be passed through the state machines without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A wire frame could not be encoded or decoded.
    Frame(FrameError),
    /// The server exchange did not produce a usable reply.
    Link(LinkError),
    /// The RFID reader exchange failed.
    Card(CardError),
    /// User identification was refused.
    Auth(AuthError),
    /// An event queue overflowed (a machine raised too many events).
    QueueFull(&'static str),
    /// A machine ran out of events before reaching a terminal action.
    Stalled(&'static str),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Card(e) => write!(f, "card: {e}"),
            Self::Auth(e) => write!(f, "auth: {e}"),
            Self::QueueFull(machine) => write!(f, "{machine}: event queue full"),
            Self::Stalled(machine) => write!(f, "{machine}: no pending event"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Declared length reads past the supplied buffer.
    Malformed,
    /// XOR-fold of header and payload does not match the checksum byte.
    ChecksumMismatch { expected: u8, actual: u8 },
    /// A numeric header field holds a non-digit character.
    BadField(&'static str),
    /// Payload or frame exceeds the wire/buffer limits.
    TooLong,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "declared length exceeds buffer"),
            Self::ChecksumMismatch { expected, actual } => {
                write!(f, "checksum mismatch (expected 0x{expected:02X}, got 0x{actual:02X})")
            }
            Self::BadField(field) => write!(f, "non-numeric {field} field"),
            Self::TooLong => write!(f, "frame too long"),
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Server link errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The server answered with a command the exchange did not expect.
    UnexpectedReply(u8),
    /// Repeat-last-packet requests hit the configured ceiling.
    RetriesExhausted,
    /// No frame arrived within the configured poll budget.
    Timeout,
    /// The transport refused the outgoing bytes.
    WriteFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedReply(cmd) => write!(f, "unexpected reply command {cmd:02}"),
            Self::RetriesExhausted => write!(f, "repeat requests exhausted"),
            Self::Timeout => write!(f, "no reply from server"),
            Self::WriteFailed => write!(f, "transport write failed"),
        }
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

// ---------------------------------------------------------------------------
// Card errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardError {
    /// The card was removed or never presented.
    Absent,
    /// The reader returned more bytes than the exchange buffer holds.
    BufferOverflow,
    /// SPI transfer to the reader failed.
    Bus,
}

impl fmt::Display for CardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "card absent or unknown"),
            Self::BufferOverflow => write!(f, "reader buffer overflow"),
            Self::Bus => write!(f, "SPI bus error"),
        }
    }
}

impl From<CardError> for Error {
    fn from(e: CardError) -> Self {
        Self::Card(e)
    }
}

// ---------------------------------------------------------------------------
// Authentication errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// The entered PIN did not match.
    PinMismatch,
    /// Too many wrong PIN entries.
    LockedOut,
    /// The server does not know the presented card.
    UnknownCard,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinMismatch => write!(f, "PIN mismatch"),
            Self::LockedOut => write!(f, "locked out after repeated wrong PIN"),
            Self::UnknownCard => write!(f, "unknown card"),
        }
    }
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
