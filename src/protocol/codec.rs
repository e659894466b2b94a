//! ASCII-decimal frame codec.
//!
//! Wire format:
//! ```text
//! ┌────┬─────┬─────┬─────┬────────┬───────────┬────────┬─────┬────┐
//! │ *- │ src │ dst │ cmd │ length │ payload   │ filler │ xor │ -* │
//! │ 2B │ 2B  │ 2B  │ 2B  │ 4B     │ length B  │ "00"   │ 1B  │ 2B │
//! └────┴─────┴─────┴─────┴────────┴───────────┴────────┴─────┴────┘
//! ```
//!
//! Numeric subfields are zero-padded ASCII decimal.  The checksum is a
//! single **raw** byte: the XOR-fold of the ten header digits and the
//! payload.  The filler and the markers are not covered.
//!
//! [`decode`] works on the bytes *between* the markers, which is what the
//! [`receiver`](super::receiver) hands over.

use heapless::Vec;

use crate::error::FrameError;

/// Frame start marker.
pub const START_MARKER: [u8; 2] = *b"*-";
/// Frame end marker.
pub const END_MARKER: [u8; 2] = *b"-*";
/// Filler digits between payload and checksum.
pub const FILLER: [u8; 2] = *b"00";

/// src + dst + cmd + length digits.
pub const HEADER_LEN: usize = 10;
/// filler + checksum byte.
pub const TRAILER_LEN: usize = 3;
/// Markers plus header and trailer: everything except the payload.
pub const OVERHEAD: usize = START_MARKER.len() + HEADER_LEN + TRAILER_LEN + END_MARKER.len();
/// Largest value the 4-digit length field can carry.
pub const MAX_WIRE_PAYLOAD: usize = 9999;

/// Size of the receive buffer (matches the station's UART frame buffer).
pub const RX_BUFFER_LEN: usize = 100;
/// Largest payload an owned [`Frame`] can hold.
pub const MAX_PAYLOAD: usize = RX_BUFFER_LEN - HEADER_LEN - TRAILER_LEN;
/// Largest encoded frame the station sends.
pub const MAX_ENCODED: usize = MAX_PAYLOAD + OVERHEAD;

pub type Payload = Vec<u8, MAX_PAYLOAD>;
pub type EncodedFrame = Vec<u8, MAX_ENCODED>;

/// XOR-fold of every byte in `bytes`.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, b| acc ^ b)
}

/// A decoded frame with an owned payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub source: u8,
    pub destination: u8,
    pub command: u8,
    pub payload: Payload,
}

impl Frame {
    pub fn new(source: u8, destination: u8, command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        Ok(Self {
            source,
            destination,
            command,
            payload: Vec::from_slice(payload).map_err(|_| FrameError::TooLong)?,
        })
    }

    /// Payload interpreted as text; non-UTF-8 payloads read as empty.
    pub fn payload_str(&self) -> &str {
        core::str::from_utf8(&self.payload).unwrap_or("")
    }

    /// Encode into a fixed-capacity buffer.
    pub fn encode(&self) -> Result<EncodedFrame, FrameError> {
        encode_to_vec(self.source, self.destination, self.command, &self.payload)
    }
}

/// Borrowed view of a frame as it sits in the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameView<'a> {
    pub source: u8,
    pub destination: u8,
    pub command: u8,
    pub payload: &'a [u8],
    /// The three trailing bytes: filler digits and the raw checksum byte.
    pub trailer: [u8; TRAILER_LEN],
    covered: &'a [u8],
}

impl FrameView<'_> {
    /// Check the received checksum byte against the header + payload.
    pub fn verify(&self) -> Result<(), FrameError> {
        let expected = checksum(self.covered);
        let actual = self.trailer[TRAILER_LEN - 1];
        if expected == actual {
            Ok(())
        } else {
            Err(FrameError::ChecksumMismatch { expected, actual })
        }
    }

    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(self.source, self.destination, self.command, self.payload)
    }
}

/// Encode a frame into `out`.
///
/// Returns the number of bytes written, or [`FrameError::TooLong`] when
/// the payload does not fit the length field or `out`.
pub fn encode(
    source: u8,
    destination: u8,
    command: u8,
    payload: &[u8],
    out: &mut [u8],
) -> Result<usize, FrameError> {
    let len = payload.len();
    let total = OVERHEAD + len;
    if len > MAX_WIRE_PAYLOAD || total > out.len() || source > 99 || destination > 99 || command > 99 {
        return Err(FrameError::TooLong);
    }

    out[..2].copy_from_slice(&START_MARKER);
    let header = &mut out[2..2 + HEADER_LEN];
    write_digits(&mut header[0..2], source as usize);
    write_digits(&mut header[2..4], destination as usize);
    write_digits(&mut header[4..6], command as usize);
    write_digits(&mut header[6..10], len);

    let body_end = 2 + HEADER_LEN + len;
    out[2 + HEADER_LEN..body_end].copy_from_slice(payload);
    let xor = checksum(&out[2..body_end]);

    out[body_end..body_end + 2].copy_from_slice(&FILLER);
    out[body_end + 2] = xor;
    out[body_end + 3..total].copy_from_slice(&END_MARKER);
    Ok(total)
}

/// Encode into a fixed-capacity vector sized for the station's frames.
pub fn encode_to_vec(
    source: u8,
    destination: u8,
    command: u8,
    payload: &[u8],
) -> Result<EncodedFrame, FrameError> {
    let mut buf = [0u8; MAX_ENCODED];
    let n = encode(source, destination, command, payload, &mut buf)?;
    Vec::from_slice(&buf[..n]).map_err(|_| FrameError::TooLong)
}

/// Decode the bytes between the start and end markers.
///
/// Splits the fixed-width header by offset, parses the declared length
/// and borrows exactly that many payload bytes.  A declared length that
/// would read past `raw` is rejected as [`FrameError::Malformed`].  The
/// checksum is *not* verified here; call [`FrameView::verify`].
pub fn decode(raw: &[u8]) -> Result<FrameView<'_>, FrameError> {
    if raw.len() < HEADER_LEN + TRAILER_LEN {
        return Err(FrameError::Malformed);
    }

    let source = parse_digits(&raw[0..2], "source")? as u8;
    let destination = parse_digits(&raw[2..4], "destination")? as u8;
    let command = parse_digits(&raw[4..6], "command")? as u8;
    let len = parse_digits(&raw[6..10], "length")?;

    let body_end = HEADER_LEN + len;
    if body_end + TRAILER_LEN > raw.len() {
        return Err(FrameError::Malformed);
    }

    let mut trailer = [0u8; TRAILER_LEN];
    trailer.copy_from_slice(&raw[body_end..body_end + TRAILER_LEN]);

    Ok(FrameView {
        source,
        destination,
        command,
        payload: &raw[HEADER_LEN..body_end],
        trailer,
        covered: &raw[..body_end],
    })
}

fn write_digits(field: &mut [u8], mut value: usize) {
    for slot in field.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

fn parse_digits(field: &[u8], name: &'static str) -> Result<usize, FrameError> {
    field.iter().try_fold(0usize, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + usize::from(b - b'0'))
        } else {
            Err(FrameError::BadField(name))
        }
    })
}
