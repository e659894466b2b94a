//! Request/reply helpers on top of a [`ServerPort`].
//!
//! The station is always the initiator: it sends a request frame and then
//! spins on [`ServerPort::poll_frame`] until the server answers.  A reply
//! that is garbled or carries the wrong command is answered with a
//! repeat-last-packet request (09), up to
//! [`StationConfig::max_repeat_requests`] times.

use log::{debug, warn};

use super::codec::{Frame, encode_to_vec};
use super::command::Command;
use crate::app::ports::ServerPort;
use crate::config::StationConfig;
use crate::error::{Error, LinkError, Result};

/// Encode and send one request frame from the station to the server.
pub fn send(
    port: &mut impl ServerPort,
    config: &StationConfig,
    command: Command,
    payload: &[u8],
) -> Result<()> {
    let wire = encode_to_vec(config.station_id, config.server_id, command.code(), payload)?;
    debug!("TX: cmd={:02} payload={} bytes", command.code(), payload.len());
    port.send_bytes(&wire)?;
    Ok(())
}

/// Send a request carrying its standard payload text.
pub fn send_request(port: &mut impl ServerPort, config: &StationConfig, command: Command) -> Result<()> {
    send(port, config, command, command.request_text())
}

/// Ask the server to resend its last frame.
pub fn request_repeat(port: &mut impl ServerPort, config: &StationConfig) -> Result<()> {
    send_request(port, config, Command::RepeatLast)
}

/// Spin until a frame arrives.
///
/// With `reply_poll_limit == 0` this waits forever, like the deployed
/// firmware.  Garbled frames come back as [`Error::Frame`].
pub fn await_reply(port: &mut impl ServerPort, config: &StationConfig) -> Result<Frame> {
    let mut polls: u32 = 0;
    loop {
        if let Some(result) = port.poll_frame() {
            return result.map_err(Error::from);
        }
        polls = polls.saturating_add(1);
        if config.reply_poll_limit != 0 && polls >= config.reply_poll_limit {
            warn!("LINK: no reply after {} polls", polls);
            return Err(LinkError::Timeout.into());
        }
        core::hint::spin_loop();
    }
}

/// Send `request` and wait for a reply carrying `expected`.
///
/// Unexpected or garbled replies trigger a repeat request; the exchange
/// fails with [`LinkError::RetriesExhausted`] once the ceiling is hit.
pub fn transact(
    port: &mut impl ServerPort,
    config: &StationConfig,
    request: Command,
    expected: Command,
) -> Result<Frame> {
    send_request(port, config, request)?;
    let mut repeats = 0u8;
    loop {
        match await_reply(port, config) {
            Ok(frame) if frame.command == expected.code() => return Ok(frame),
            Ok(frame) => warn!(
                "LINK: {} to {:02} (expected {:02})",
                LinkError::UnexpectedReply(frame.command),
                request.code(),
                expected.code()
            ),
            Err(Error::Frame(e)) => warn!("LINK: garbled reply to {:02}: {}", request.code(), e),
            Err(e) => return Err(e),
        }

        if repeats >= config.max_repeat_requests {
            warn!("LINK: giving up on {:02} after {} repeats", request.code(), repeats);
            return Err(LinkError::RetriesExhausted.into());
        }
        repeats += 1;
        request_repeat(port, config)?;
    }
}
