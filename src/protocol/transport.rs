//! Transport abstraction — the outbound half of the server link.
//!
//! Concrete implementations:
//! - UART driver on the station (see `adapters::uart`)
//! - in-memory recorders in the host tests
//!
//! Inbound bytes do not come through this trait: they arrive in the
//! byte-received interrupt and travel through the
//! [`receiver`](super::receiver) queue.

use log::trace;

use super::codec::Frame;
use super::receiver::PacketReceiver;
use crate::app::ports::ServerPort;
use crate::error::{FrameError, LinkError};

/// Byte-oriented outbound channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// A [`ServerPort`] built from an outbound [`Transport`] and the
/// interrupt-fed [`PacketReceiver`].
pub struct SerialLink<'q, T: Transport> {
    transport: T,
    receiver: PacketReceiver<'q>,
}

impl<'q, T: Transport> SerialLink<'q, T> {
    pub fn new(transport: T, receiver: PacketReceiver<'q>) -> Self {
        Self {
            transport,
            receiver,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: Transport> ServerPort for SerialLink<'_, T> {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let mut sent = 0;
        while sent < bytes.len() {
            match self.transport.write(&bytes[sent..]) {
                Ok(0) | Err(_) => return Err(LinkError::WriteFailed),
                Ok(n) => sent += n,
            }
        }
        self.transport.flush().map_err(|_| LinkError::WriteFailed)?;
        trace!("TX: {} bytes", bytes.len());
        Ok(())
    }

    fn poll_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        self.receiver.poll()
    }
}
