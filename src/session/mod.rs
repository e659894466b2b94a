//! Session authentication.
//!
//! Identifies the user before the menu opens:
//!
//! ```text
//!   Welcome ─▶ StartSession (22)
//!                ├─ 23 online ─▶ read card ─▶ report id (10) ─▶ 11 ─▶ PIN (00) ─▶ 1 ─▶ done
//!                └─ 24 offline ─▶ accept ─▶ read card blocks ─▶ PIN vs card ─▶ done
//! ```
//!
//! Every action finishes by raising the event that picks the next table
//! cell; [`SessionFsm::run`] drains those events until identification
//! completes or the controller has to restart.

pub mod context;
pub mod machine;

use core::fmt::Write;

use log::{info, warn};

pub use context::{Mode, PIN_DIGITS, SessionContext};
pub use machine::{SessionAction, SessionEvent, SessionMachine, SessionState};

use crate::app::context::StationContext;
use crate::app::keys::{wait_digit, wait_for, wait_key};
use crate::app::ports::{ARROW_GLYPH, DONE_GLYPH, Key, Line, StationHw};
use crate::error::{AuthError, Error, LinkError, Result};
use crate::fsm::{Dispatcher, Machine};
use crate::protocol::{Command, link};
use crate::rfid::Sequence;

/// How a call to [`SessionFsm::run`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user is identified; the menu may open.
    Identified,
    /// The controller was told to restart.
    Restarted,
}

enum Flow {
    Continue,
    Finished(SessionOutcome),
}

pub struct SessionFsm {
    engine: Dispatcher<SessionMachine>,
}

impl Default for SessionFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionFsm {
    pub fn new() -> Self {
        Self {
            engine: Dispatcher::new(SessionState::Init),
        }
    }

    pub fn state(&self) -> SessionState {
        self.engine.state()
    }

    /// Run identification from the welcome screen.
    pub fn run<H: StationHw>(&mut self, ctx: &mut StationContext, hw: &mut H) -> Result<SessionOutcome> {
        ctx.session.reset();
        self.engine.reset(SessionState::Init);
        self.engine.raise(SessionEvent::A)?;

        while let Some(action) = self.engine.step() {
            if let Flow::Finished(outcome) = self.perform(action, ctx, hw)? {
                info!("SESSION: finished with {:?}", outcome);
                return Ok(outcome);
            }
        }
        Err(Error::Stalled(SessionMachine::NAME))
    }

    fn perform<H: StationHw>(
        &mut self,
        action: SessionAction,
        ctx: &mut StationContext,
        hw: &mut H,
    ) -> Result<Flow> {
        match action {
            SessionAction::NoAction => Ok(Flow::Continue),
            SessionAction::Welcome => self.welcome(hw),
            SessionAction::StartSession => self.start_session(ctx, hw),
            SessionAction::KeypadRead => self.keypad_read(ctx, hw),
            SessionAction::Send => self.send(ctx, hw),
            SessionAction::Receive => self.receive(ctx, hw),
            SessionAction::RepeatPacket => self.repeat_packet(ctx, hw),
            SessionAction::EndSession => self.end_session(ctx, hw),
            SessionAction::SessionDone => {
                hw.clear_display();
                ctx.session.identified = true;
                Ok(Flow::Finished(SessionOutcome::Identified))
            }
            SessionAction::RfidIdRead => self.rfid_id_read(ctx, hw),
            SessionAction::OfflineWelcome => self.offline_welcome(hw),
            SessionAction::OfflineGetCardInfo => self.offline_get_card_info(ctx, hw),
            SessionAction::OfflinePinCheck => self.offline_pin_check(ctx, hw),
            SessionAction::IdleWaiting => self.idle_waiting(hw),
        }
    }

    fn raise(&mut self, event: SessionEvent) -> Result<Flow> {
        self.engine.raise(event)?;
        Ok(Flow::Continue)
    }

    // -----------------------------------------------------------------------
    // Screens
    // -----------------------------------------------------------------------

    fn welcome(&mut self, hw: &mut impl StationHw) -> Result<Flow> {
        hw.clear_display();
        hw.display_text(0, 0, "Ultra 2000 eCharge");
        hw.display_text(0, 1, "Use your RFID card");
        self.raise(SessionEvent::B)
    }

    fn offline_welcome(&mut self, hw: &mut impl StationHw) -> Result<Flow> {
        hw.clear_display();
        hw.display_text(0, 0, "Ultra 2000 eCharge");
        hw.display_text(0, 1, "System's offline");
        hw.display_text(0, 2, "Use your RFID card");
        self.raise(SessionEvent::A)
    }

    fn idle_waiting(&mut self, hw: &mut impl StationHw) -> Result<Flow> {
        hw.clear_display();
        hw.display_text(0, 1, "Ultra 2000 eCharger");
        hw.display_text(0, 2, "Press any key");
        wait_key(hw);
        self.raise(SessionEvent::E)
    }

    fn show_message(hw: &mut impl StationHw, ctx: &StationContext, y: u8, text: &str) {
        hw.display_text(0, y, text);
        hw.delay_ms(ctx.config.message_hold_ms);
    }

    // -----------------------------------------------------------------------
    // Server exchanges
    // -----------------------------------------------------------------------

    fn start_session(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        if !core::mem::take(&mut ctx.session.repeat_requested) {
            if let Err(e) = link::send_request(hw, &ctx.config, Command::StartSession) {
                return self.link_lost(ctx, hw, e);
            }
        }

        let reply = match link::await_reply(hw, &ctx.config) {
            Ok(frame) => Command::from_code(frame.command),
            Err(Error::Frame(e)) => {
                warn!("SESSION: garbled start reply: {}", e);
                return self.raise(SessionEvent::B);
            }
            Err(e) => return self.link_lost(ctx, hw, e),
        };

        match reply {
            Some(Command::SessionOnline) => {
                ctx.session.repeats = 0;
                hw.display_text(0, 2, "Connected");
                self.raise(SessionEvent::C)
            }
            Some(Command::SessionOffline) => {
                ctx.session.repeats = 0;
                self.offer_offline(ctx, hw)
            }
            other => {
                warn!("SESSION: unexpected start reply {:?}", other);
                self.raise(SessionEvent::B)
            }
        }
    }

    fn offer_offline(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        let mut price = Line::new();
        let mut choice = Line::new();
        // Both fit: at most 2 + 7 and 20 bytes.
        let _ = write!(price, "{}dkk/kWs", ctx.config.offline_price);
        let _ = write!(choice, "{DONE_GLYPH}Accept        {ARROW_GLYPH}Back");

        hw.clear_display();
        hw.display_text(0, 0, "No connection");
        hw.display_text(0, 1, "Offline, fixed price");
        hw.display_text(0, 2, &price);
        hw.display_text(0, 3, &choice);

        match wait_for(hw, &[Key::A, Key::B]) {
            Key::A => {
                info!("SESSION: offline mode accepted");
                ctx.session.mode = Mode::Offline;
                ctx.session.price = ctx.config.offline_price;
                self.raise(SessionEvent::A)
            }
            _ => self.raise(SessionEvent::D),
        }
    }

    fn send(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        let session = &mut ctx.session;
        let (command, next) = if core::mem::take(&mut session.card_pending) {
            (Command::CardId, SessionEvent::A)
        } else if core::mem::take(&mut session.pin_pending) {
            hw.display_text(0, 2, "PIN is being checked");
            (Command::CheckPin, SessionEvent::E)
        } else {
            warn!("SESSION: nothing pending to send");
            return self.raise(SessionEvent::D);
        };

        let payload = match command {
            Command::CardId => session.card_id.as_bytes(),
            _ => session.pin.as_bytes(),
        };
        if let Err(e) = link::send(hw, &ctx.config, command, payload) {
            return self.link_lost(ctx, hw, e);
        }
        self.raise(next)
    }

    fn receive(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        ctx.session.repeat_requested = false;
        let frame = match link::await_reply(hw, &ctx.config) {
            Ok(frame) => frame,
            Err(Error::Frame(e)) => {
                warn!("SESSION: garbled reply: {}", e);
                return self.raise(SessionEvent::C);
            }
            Err(e) => return self.link_lost(ctx, hw, e),
        };

        let reply = Command::from_code(frame.command);
        if matches!(
            reply,
            Some(
                Command::PinAccepted
                    | Command::PinRejected
                    | Command::PinLockedOut
                    | Command::CardAuthorized
                    | Command::CardUnknown
            )
        ) {
            ctx.session.repeats = 0;
        }
        match reply {
            Some(Command::PinAccepted) => {
                Self::show_message(hw, ctx, 3, "PIN is OK");
                self.raise(SessionEvent::F)
            }
            Some(Command::PinRejected) => {
                warn!("SESSION: {}", AuthError::PinMismatch);
                Self::show_message(hw, ctx, 3, "Incorrect PIN");
                self.raise(SessionEvent::G)
            }
            Some(Command::PinLockedOut) => {
                warn!("SESSION: {}", AuthError::LockedOut);
                hw.clear_display();
                hw.display_text(0, 0, "Access is blocked");
                Self::show_message(hw, ctx, 2, "Wrong PIN input 3x");
                self.raise(SessionEvent::D)
            }
            Some(Command::CardAuthorized) => self.raise(SessionEvent::B),
            Some(Command::CardUnknown) => {
                warn!("SESSION: {} {}", AuthError::UnknownCard, ctx.session.card_id);
                Self::show_message(hw, ctx, 3, "Unknown card");
                self.raise(SessionEvent::D)
            }
            _ => {
                warn!("SESSION: {}", LinkError::UnexpectedReply(frame.command));
                self.raise(SessionEvent::C)
            }
        }
    }

    fn repeat_packet(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        ctx.session.repeats = ctx.session.repeats.saturating_add(1);
        if ctx.session.repeats > ctx.config.max_repeat_requests {
            return self.link_lost(ctx, hw, LinkError::RetriesExhausted.into());
        }
        if let Err(e) = link::request_repeat(hw, &ctx.config) {
            return self.link_lost(ctx, hw, e);
        }
        ctx.session.repeat_requested = true;

        // Back to whichever wait asked for the repeat.
        if self.engine.state() == SessionState::InSession {
            self.raise(SessionEvent::F)
        } else {
            self.raise(SessionEvent::A)
        }
    }

    fn end_session(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        if let Err(e) = link::send_request(hw, &ctx.config, Command::EndSession) {
            warn!("SESSION: end-of-session notice not sent: {}", e);
        }
        ctx.session.reset();
        self.raise(SessionEvent::G)
    }

    /// The server could not be reached; end the session.
    fn link_lost(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw, err: Error) -> Result<Flow> {
        match err {
            Error::Link(_) | Error::Frame(_) => {
                warn!("SESSION: {}; ending session", err);
                Self::show_message(hw, ctx, 3, "No connection");
                self.raise(SessionEvent::D)
            }
            other => Err(other),
        }
    }

    // -----------------------------------------------------------------------
    // Card and PIN
    // -----------------------------------------------------------------------

    fn rfid_id_read(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        hw.display_text(0, 3, "Wait");
        if let Err(e) = ctx.rfid.run(Sequence::OnlineFirstRead, hw, ctx.config.card_poll_limit) {
            warn!("SESSION: card read failed: {}", e);
            Self::show_message(hw, ctx, 3, "Card not read");
            return self.raise(SessionEvent::D);
        }
        ctx.session.load_card(ctx.rfid.card());
        ctx.session.card_pending = true;
        self.raise(SessionEvent::A)
    }

    fn offline_get_card_info(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        if let Err(e) = ctx.rfid.run(Sequence::OfflineBootstrap, hw, ctx.config.card_poll_limit) {
            warn!("SESSION: offline card read failed: {}", e);
            Self::show_message(hw, ctx, 3, "Card not read");
            hw.restart();
            return Ok(Flow::Finished(SessionOutcome::Restarted));
        }
        ctx.session.load_card(ctx.rfid.card());
        self.raise(SessionEvent::B)
    }

    fn keypad_read(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        hw.clear_display();
        hw.display_text(0, 0, "Enter PIN:");
        if ctx.session.incorrect_pin {
            hw.display_text(0, 3, "Incorrect PIN");
        }

        ctx.session.pin.clear();
        for column in 0..PIN_DIGITS as u8 {
            let digit = wait_digit(hw);
            let mut echo = [0u8; 4];
            hw.display_text(column, 1, char::from(digit).encode_utf8(&mut echo));
            hw.delay_ms(ctx.config.pin_echo_ms);
            hw.display_text(column, 1, "*");
            // Capacity is exactly PIN_DIGITS.
            let _ = ctx.session.pin.push(char::from(digit));
        }
        ctx.session.pin_pending = true;

        if self.engine.state() == SessionState::Offline {
            self.raise(SessionEvent::C)
        } else {
            self.raise(SessionEvent::A)
        }
    }

    fn offline_pin_check(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        ctx.session.pin_pending = false;
        if ctx.rfid.card().pin.as_slice() == ctx.session.pin.as_bytes() {
            info!("SESSION: offline PIN accepted");
            ctx.session.incorrect_pin = false;
            return self.raise(SessionEvent::G);
        }

        ctx.session.pin_failures = ctx.session.pin_failures.saturating_add(1);
        ctx.session.incorrect_pin = true;
        warn!(
            "SESSION: offline {} ({}/{})",
            AuthError::PinMismatch,
            ctx.session.pin_failures,
            ctx.config.max_pin_attempts
        );
        if ctx.session.pin_failures < ctx.config.max_pin_attempts {
            return self.raise(SessionEvent::B);
        }

        warn!("SESSION: {}", Error::from(AuthError::LockedOut));
        let mut detail = Line::new();
        let _ = write!(detail, "Wrong PIN input {}x", ctx.session.pin_failures);
        hw.clear_display();
        hw.display_text(0, 0, "Access is blocked");
        Self::show_message(hw, ctx, 2, &detail);
        hw.restart();
        Ok(Flow::Finished(SessionOutcome::Restarted))
    }
}
