//! Menu navigation.
//!
//! Owns the station's foreground loop once the controller has booted:
//!
//! ```text
//!   Idle ──any key──▶ identification ──▶ price ──▶ menu
//!                                                  ├─ Charge       ─▶ summary ─┐
//!                                                  ├─ Consumption  ─▶ history ─┤
//!                                                  ├─ Balance/Debit ─▶ account ┤
//!                                                  └─ B: end session ─▶ restart│
//!                                                  ◀───────────────────────────┘
//! ```
//!
//! The Charge entry can be used once per session; afterwards the cursor
//! starts at Consumption and never reaches Charge again.

pub mod context;
pub mod machine;

use core::fmt::Write;

use log::{info, warn};

pub use context::{BALANCE_ITEM, CHARGE_ITEM, CONSUMPTION_ITEM, MenuContext};
pub use machine::{MenuAction, MenuEvent, MenuMachine, MenuState};

use crate::app::amount::{Amount, format_amount, normalize_amount, parse_amount};
use crate::app::context::StationContext;
use crate::app::keys::{wait_for, wait_key};
use crate::app::ports::{ARROW_GLYPH, DONE_GLYPH, Key, Line, StationHw};
use crate::charging;
use crate::error::{Error, Result};
use crate::fsm::{Dispatcher, Machine};
use crate::protocol::{Command, link};
use crate::rfid::{Block, Sequence};
use crate::session::{SessionFsm, SessionOutcome};

enum Flow {
    Continue,
    Restarted,
}

pub struct MenuFsm {
    engine: Dispatcher<MenuMachine>,
    session: SessionFsm,
}

impl Default for MenuFsm {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuFsm {
    pub fn new() -> Self {
        Self {
            engine: Dispatcher::new(MenuState::Idle),
            session: SessionFsm::new(),
        }
    }

    pub fn state(&self) -> MenuState {
        self.engine.state()
    }

    pub fn session(&self) -> &SessionFsm {
        &self.session
    }

    /// Run from the idle screen until the controller is told to restart.
    pub fn run<H: StationHw>(&mut self, ctx: &mut StationContext, hw: &mut H) -> Result<()> {
        ctx.menu = MenuContext::new();
        self.engine.reset(MenuState::Idle);
        self.engine.raise(MenuEvent::A1)?;

        while let Some(action) = self.engine.step() {
            if let Flow::Restarted = self.perform(action, ctx, hw)? {
                info!("MENU: restart requested");
                return Ok(());
            }
        }
        Err(Error::Stalled(MenuMachine::NAME))
    }

    fn perform<H: StationHw>(&mut self, action: MenuAction, ctx: &mut StationContext, hw: &mut H) -> Result<Flow> {
        match action {
            MenuAction::NoAction => Ok(Flow::Continue),
            MenuAction::IdleWaiting => self.idle_waiting(hw),
            MenuAction::Identification => self.identification(ctx, hw),
            MenuAction::RetrievePrice => self.retrieve_price(ctx, hw),
            MenuAction::DrawMenu => self.draw_menu(ctx, hw),
            MenuAction::Charging => self.charging(ctx, hw),
            MenuAction::GetConsumption => self.get_consumption(ctx, hw),
            MenuAction::GetBalance => self.get_balance(ctx, hw),
            MenuAction::EndSession => self.end_session(ctx, hw),
        }
    }

    fn raise(&mut self, event: MenuEvent) -> Result<Flow> {
        self.engine.raise(event)?;
        Ok(Flow::Continue)
    }

    // -----------------------------------------------------------------------
    // Entry
    // -----------------------------------------------------------------------

    fn idle_waiting(&mut self, hw: &mut impl StationHw) -> Result<Flow> {
        hw.clear_display();
        hw.display_text(0, 1, "Ultra 2000 eCharger");
        hw.display_text(0, 2, "Press any key");
        wait_key(hw);
        self.raise(MenuEvent::B2)
    }

    fn identification<H: StationHw>(&mut self, ctx: &mut StationContext, hw: &mut H) -> Result<Flow> {
        match self.session.run(ctx, hw)? {
            SessionOutcome::Identified => {
                ctx.menu = MenuContext::new();
                self.raise(MenuEvent::A1)
            }
            SessionOutcome::Restarted => Ok(Flow::Restarted),
        }
    }

    fn retrieve_price(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        if ctx.session.is_offline() {
            ctx.session.price = ctx.config.offline_price;
            ctx.menu.price_text.clear();
            let _ = write!(ctx.menu.price_text, "{}", ctx.config.offline_price);
            return self.raise(MenuEvent::B2);
        }

        match link::transact(hw, &ctx.config, Command::PriceRequest, Command::PriceReply) {
            Ok(frame) => {
                let text = frame.payload_str();
                let shown = text.get(..2).unwrap_or(text);
                ctx.menu.price_text.clear();
                // Capacity matches the two-character cut above.
                let _ = ctx.menu.price_text.push_str(shown);
                ctx.session.price = parse_amount(shown) as u16;
                info!("MENU: price {} dkk/kWs", ctx.session.price);
                self.raise(MenuEvent::B2)
            }
            Err(e) => {
                warn!("MENU: price unavailable: {}", e);
                Self::link_lost(ctx, hw, e)?;
                self.raise(MenuEvent::None)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Menu screen
    // -----------------------------------------------------------------------

    fn draw_menu(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        hw.clear_display();
        hw.display_text(5, 0, "Price ");
        hw.display_text(11, 0, &ctx.menu.price_text);
        hw.display_text(13, 0, "dkk/kWs");
        hw.display_text(1, CHARGE_ITEM, "Charge");
        hw.display_text(1, CONSUMPTION_ITEM, "Consumption");
        let account = if ctx.session.is_offline() { "Debit" } else { "Balance" };
        hw.display_text(1, BALANCE_ITEM, account);

        let menu = &mut ctx.menu;
        if menu.position < menu.first_item || menu.position > menu.last_item {
            menu.home();
        }
        Self::draw_marker(hw, menu, CHARGE_ITEM);
        hw.display_text(0, menu.position, ARROW_GLYPH);

        loop {
            let previous = menu.position;
            match wait_key(hw) {
                Key::F => menu.move_up(),
                Key::C => menu.move_down(),
                Key::A => {
                    let event = match menu.position {
                        CHARGE_ITEM => MenuEvent::C3,
                        CONSUMPTION_ITEM => MenuEvent::D4,
                        _ => MenuEvent::E5,
                    };
                    info!("MENU: selected item {}", menu.position);
                    return self.raise(event);
                }
                Key::B => return self.raise(MenuEvent::None),
                _ => menu.home(),
            }
            if previous != menu.position {
                Self::draw_marker(hw, menu, previous);
                hw.display_text(0, menu.position, ARROW_GLYPH);
            }
        }
    }

    /// Restore the left margin of `row` once the arrow leaves it.
    fn draw_marker(hw: &mut impl StationHw, menu: &MenuContext, row: u8) {
        if row == CHARGE_ITEM && menu.charged {
            hw.display_text(0, row, DONE_GLYPH);
        } else {
            hw.display_text(0, row, " ");
        }
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    fn charging(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        let result = charging::run(hw, &ctx.config);
        let cost_value = f32::from(ctx.session.price) * result.energy;
        let energy = format_amount(result.energy);
        let cost = format_amount(cost_value);
        info!(
            "MENU: charged {} kWs for {} dkk{}",
            energy,
            cost,
            if result.cancelled { " (cancelled)" } else { "" }
        );

        if !ctx.session.is_offline() {
            let reported = link::send(hw, &ctx.config, Command::ReportEnergy, energy.as_bytes()).and_then(|()| {
                hw.delay_ms(ctx.config.report_gap_ms);
                link::send(hw, &ctx.config, Command::ReportCost, cost.as_bytes())
            });
            if let Err(e) = reported {
                warn!("MENU: charge report not sent: {}", e);
            }
        }

        hw.clear_display();
        let mut line = Line::new();
        let _ = write!(line, "Charging's complete{DONE_GLYPH}");
        hw.display_text(0, 0, &line);
        Self::show_amount(hw, 1, "Energy:  ", &energy, " kWs");
        Self::show_amount(hw, 2, "Charged: ", &cost, " dkk");
        line.clear();
        let _ = write!(line, "{ARROW_GLYPH} Accept");
        hw.display_text(0, 3, &line);

        ctx.menu.complete_charge(energy, cost);
        wait_for(hw, &[Key::A]);
        hw.clear_display();
        self.raise(MenuEvent::A1)
    }

    fn get_consumption(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        let (energy, total) = if ctx.session.is_offline() {
            (ctx.session.past_energy.clone(), ctx.session.past_expense.clone())
        } else {
            (
                Self::fetch_amount(ctx, hw, Command::PastEnergyRequest, Command::PastEnergyReply),
                Self::fetch_amount(ctx, hw, Command::PastTotalRequest, Command::PastTotalReply),
            )
        };

        hw.clear_display();
        hw.display_text(0, 0, "The last consumption");
        Self::show_amount(hw, 1, "Energy:  ", &energy, " kWs");
        Self::show_amount(hw, 2, "Charged: ", &total, " dkk");
        self.back_to_menu(ctx, hw)
    }

    fn get_balance(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        let (title, amount) = if ctx.session.is_offline() {
            ("Account debit", ctx.session.credit.clone())
        } else {
            (
                "Account balance",
                Self::fetch_amount(ctx, hw, Command::BalanceRequest, Command::BalanceReply),
            )
        };

        hw.clear_display();
        hw.display_text(0, 0, title);
        Self::show_amount(hw, 1, "", &amount, " Dkk");
        self.back_to_menu(ctx, hw)
    }

    /// Wait for `B` on a result screen, then redraw the menu.
    fn back_to_menu(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        let mut back = Line::new();
        let _ = write!(back, "{ARROW_GLYPH} Back");
        hw.display_text(14, 3, &back);
        wait_for(hw, &[Key::B]);
        hw.clear_display();
        ctx.menu.home();
        self.raise(MenuEvent::A1)
    }

    /// One request/reply exchange whose payload is an amount.
    fn fetch_amount(ctx: &StationContext, hw: &mut impl StationHw, request: Command, reply: Command) -> Amount {
        match link::transact(hw, &ctx.config, request, reply) {
            Ok(frame) => normalize_amount(frame.payload_str()),
            Err(e) => {
                warn!("MENU: {:?} failed: {}", request, e);
                let mut missing = Amount::new();
                let _ = missing.push_str("n/a");
                missing
            }
        }
    }

    fn show_amount(hw: &mut impl StationHw, row: u8, label: &str, value: &str, unit: &str) {
        let mut line = Line::new();
        let _ = write!(line, "{label}{value}{unit}");
        hw.display_text(0, row, &line);
    }

    // -----------------------------------------------------------------------
    // Exit
    // -----------------------------------------------------------------------

    fn end_session(&mut self, ctx: &mut StationContext, hw: &mut impl StationHw) -> Result<Flow> {
        hw.clear_display();
        if ctx.session.is_offline() && ctx.menu.charged {
            Self::settle_offline(ctx, hw);
        } else if let Err(e) = link::send_request(hw, &ctx.config, Command::EndSession) {
            warn!("MENU: end-of-session notice not sent: {}", e);
        }
        info!("MENU: session over");
        ctx.session.reset();
        hw.restart();
        Ok(Flow::Restarted)
    }

    /// Write this session's charge onto the card.
    fn settle_offline(ctx: &mut StationContext, hw: &mut impl StationHw) {
        hw.display_text(0, 0, "You've been debited");
        hw.display_text(0, 2, "Please use RFID card");
        hw.display_text(0, 3, "to recalculate");

        let debt = format_amount(parse_amount(&ctx.session.credit) + parse_amount(&ctx.menu.cost));
        let card = ctx.rfid.card_mut();
        card.stage(Block::Debt, &debt);
        card.stage(Block::PastEnergy, &ctx.menu.energy);
        card.stage(Block::PastExpense, &ctx.menu.cost);
        info!("MENU: writing debt {} to card", debt);

        match ctx.rfid.run(Sequence::OfflineSettlement, hw, ctx.config.card_poll_limit) {
            Ok(()) => {
                hw.clear_display();
                hw.display_text(0, 0, "Logged out");
                hw.delay_ms(ctx.config.pin_echo_ms);
            }
            Err(e) => {
                warn!("MENU: card not updated: {}", e);
                hw.clear_display();
                hw.display_text(0, 0, "Card not written");
                hw.delay_ms(ctx.config.message_hold_ms);
            }
        }
    }

    /// Report a lost server link before leaving the menu.
    fn link_lost(ctx: &StationContext, hw: &mut impl StationHw, err: Error) -> Result<()> {
        match err {
            Error::Link(_) | Error::Frame(_) => {
                hw.display_text(0, 3, "No connection");
                hw.delay_ms(ctx.config.message_hold_ms);
                Ok(())
            }
            other => Err(other),
        }
    }
}
