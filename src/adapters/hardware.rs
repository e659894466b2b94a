//! Hardware bundle: one value implementing every station port.
//!
//! Each port is backed by its own adapter; the bundle only forwards.  The
//! machines take a single `&mut impl StationHw`, and the bundle is what
//! `main` hands them.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{
    CardEdge, CardReader, Display, EnergyMeter, Key, Keypad, ServerPort, SystemControl,
};
use crate::error::{CardError, FrameError, LinkError};
use crate::protocol::Frame;

pub struct StationHardware<D, K, M, S, C, R, W> {
    pub display: D,
    pub keypad: K,
    pub meter: M,
    pub server: S,
    pub card: C,
    pub system: R,
    pub delay: W,
}

impl<D: Display, K, M, S, C, R, W> Display for StationHardware<D, K, M, S, C, R, W> {
    fn clear_display(&mut self) {
        self.display.clear_display();
    }

    fn display_text(&mut self, x: u8, y: u8, text: &str) {
        self.display.display_text(x, y, text);
    }
}

impl<D, K: Keypad, M, S, C, R, W> Keypad for StationHardware<D, K, M, S, C, R, W> {
    fn poll_key(&mut self) -> Option<Key> {
        self.keypad.poll_key()
    }
}

impl<D, K, M: EnergyMeter, S, C, R, W> EnergyMeter for StationHardware<D, K, M, S, C, R, W> {
    fn sample_energy(&mut self) -> f32 {
        self.meter.sample_energy()
    }
}

impl<D, K, M, S: ServerPort, C, R, W> ServerPort for StationHardware<D, K, M, S, C, R, W> {
    fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        self.server.send_bytes(bytes)
    }

    fn poll_frame(&mut self) -> Option<Result<Frame, FrameError>> {
        self.server.poll_frame()
    }
}

impl<D, K, M, S, C: CardReader, R, W> CardReader for StationHardware<D, K, M, S, C, R, W> {
    fn card_present(&self) -> bool {
        self.card.card_present()
    }

    fn poll_edge(&mut self) -> Option<CardEdge> {
        self.card.poll_edge()
    }

    fn exchange(&mut self, byte: u8) -> Result<u8, CardError> {
        self.card.exchange(byte)
    }
}

impl<D, K, M, S, C, R: SystemControl, W> SystemControl for StationHardware<D, K, M, S, C, R, W> {
    fn restart(&mut self) {
        self.system.restart();
    }
}

impl<D, K, M, S, C, R, W: DelayNs> DelayNs for StationHardware<D, K, M, S, C, R, W> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
