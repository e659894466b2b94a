//! Station ↔ server wire protocol.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Protocol Stack                         │
//! │                                                              │
//! │  UART ISR ──▶ RxQueue (SPSC) ──▶ PacketReceiver ──▶ Frame    │
//! │                                   (assembler + decode)       │
//! │                                                              │
//! │  Frame ──▶ codec::encode ──▶ Transport::write ──▶ UART TX    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Framing is ASCII-decimal headers between `*-` and `-*` markers; see
//! [`codec`] for the exact layout.

pub mod codec;
pub mod command;
pub mod link;
pub mod receiver;
pub mod transport;

pub use codec::Frame;
pub use command::Command;
