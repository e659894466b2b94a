//! Full boot cycles: idle screen, identification, menu items, session end.

use echarger::app::ports::{ARROW_GLYPH, DONE_GLYPH, Key};
use echarger::app::station::Station;
use echarger::menu::MenuState;

use crate::mock_hw::{MockStation, test_config};

const START: u8 = 22;
const CARD_ID: u8 = 10;
const PIN: u8 = 0;
const PRICE: u8 = 50;
const PAST_ENERGY: u8 = 61;
const PAST_TOTAL: u8 = 63;
const BALANCE: u8 = 66;
const REPORT_ENERGY: u8 = 86;
const REPORT_COST: u8 = 87;
const END: u8 = 99;

fn station() -> Station {
    Station::new(test_config()).expect("test config is valid")
}

/// Wake the station and identify online; the price reply is left to the test.
fn online_login(hw: &mut MockStation) {
    hw.press_on("Press any key", Key::Digit(1))
        .reply(START, 23, b"")
        .reply(CARD_ID, 11, b"")
        .reply(PIN, 1, b"")
        .type_pin("1234");
}

fn offline_login(hw: &mut MockStation) {
    hw.press_on("Press any key", Key::Digit(1))
        .reply(START, 24, b"")
        .press_on("Offline, fixed price", Key::A)
        .type_pin("4321");
}

/// Index of the first write containing `text`.
fn write_index(hw: &MockStation, text: &str) -> usize {
    hw.writes
        .iter()
        .position(|(_, _, t)| t.contains(text))
        .unwrap_or_else(|| panic!("{text:?} never shown"))
}

// ── Online ────────────────────────────────────────────────────

#[test]
fn online_charge_reports_and_locks_charge_item() {
    let mut hw = MockStation::new();
    online_login(&mut hw);
    hw.reply(PRICE, 51, b"20")
        .samples(&[30.0, 30.0, 30.0, 30.0])
        .press_on("Price ", Key::A)
        .press_on("Charging's complete", Key::A)
        .press_on("Price ", Key::F)
        .press_on("Price ", Key::F)
        .press_on("Price ", Key::C)
        .press_on("Price ", Key::C)
        .press_on("Price ", Key::Digit(8))
        .press_on("Price ", Key::B);

    let mut station = station();
    station.run(&mut hw).expect("cycle completes");

    assert_eq!(
        hw.sent_commands(),
        [START, CARD_ID, PIN, PRICE, REPORT_ENERGY, REPORT_COST, END]
    );
    assert_eq!(hw.sent_payload(PRICE).as_deref(), Some("SendCurrentPrice"));
    assert_eq!(hw.sent_payload(REPORT_ENERGY).as_deref(), Some("120.00"));
    assert_eq!(hw.sent_payload(REPORT_COST).as_deref(), Some("2400.00"));
    assert!(hw.shown("Energy:  120.00 kWs"));
    assert!(hw.shown("Charged: 2400.00 dkk"));
    assert!(hw.shown("Balance"));
    assert_eq!(hw.restarts, 1);
    assert_eq!(hw.keys_left(), 0);

    let after = write_index(&hw, "Charging's complete");
    let later = &hw.writes[after..];
    assert!(
        !later.iter().any(|(x, y, t)| (*x, *y) == (0, 1) && t == ARROW_GLYPH),
        "cursor reached the used Charge entry"
    );
    assert!(later.iter().any(|(x, y, t)| (*x, *y) == (0, 1) && t == DONE_GLYPH));
    assert_eq!(station.menu_state(), MenuState::Idle);
}

#[test]
fn menu_shows_two_digit_price() {
    let mut hw = MockStation::new();
    online_login(&mut hw);
    hw.reply(PRICE, 51, b"175").press_on("Price ", Key::B);

    station().run(&mut hw).expect("cycle completes");

    assert!(hw.writes.iter().any(|(x, y, t)| (*x, *y) == (11, 0) && t == "17"));
    assert!(hw.writes.iter().any(|(x, y, t)| (*x, *y) == (0, 1) && t == ARROW_GLYPH));
    assert_eq!(hw.sent_commands(), [START, CARD_ID, PIN, PRICE, END]);
}

#[test]
fn consumption_and_balance_come_from_server() {
    let mut hw = MockStation::new();
    online_login(&mut hw);
    hw.reply(PRICE, 51, b"20")
        .reply(PAST_ENERGY, 62, b"3.5")
        .reply(PAST_TOTAL, 64, b"70")
        .reply(BALANCE, 67, b"250.5")
        .press_on("Price ", Key::C)
        .press_on("Price ", Key::A)
        .press_on("The last consumption", Key::B)
        .press_on("Price ", Key::C)
        .press_on("Price ", Key::C)
        .press_on("Price ", Key::A)
        .press_on("Account balance", Key::B)
        .press_on("Price ", Key::B);

    station().run(&mut hw).expect("cycle completes");

    assert_eq!(
        hw.sent_commands(),
        [START, CARD_ID, PIN, PRICE, PAST_ENERGY, PAST_TOTAL, BALANCE, END]
    );
    assert!(hw.shown("Energy:  3.50 kWs"));
    assert!(hw.shown("Charged: 70.00 dkk"));
    assert!(hw.shown("250.50 Dkk"));
    assert!(hw.shown("Back"));
    assert_eq!(hw.keys_left(), 0);
}

#[test]
fn missing_history_shows_placeholder() {
    let mut hw = MockStation::new();
    online_login(&mut hw);
    hw.reply(PRICE, 51, b"20")
        .reply_raw(PAST_ENERGY, b"")
        .reply(PAST_TOTAL, 64, b"70")
        .press_on("Price ", Key::C)
        .press_on("Price ", Key::A)
        .press_on("The last consumption", Key::B)
        .press_on("Price ", Key::B);

    station().run(&mut hw).expect("cycle completes");

    assert!(hw.shown("Energy:  n/a kWs"));
    assert!(hw.shown("Charged: 70.00 dkk"));
}

#[test]
fn price_timeout_ends_session() {
    let mut hw = MockStation::new();
    online_login(&mut hw);
    hw.reply_raw(PRICE, b"");

    let mut station = station();
    station.run(&mut hw).expect("cycle completes");

    assert!(hw.shown("No connection"));
    assert_eq!(hw.sent_commands(), [START, CARD_ID, PIN, PRICE, END]);
    assert_eq!(hw.restarts, 1);
    assert_eq!(station.menu_state(), MenuState::Idle);
}

#[test]
fn cancelled_charge_still_reports() {
    let mut hw = MockStation::new();
    online_login(&mut hw);
    hw.reply(PRICE, 51, b"10")
        .samples(&[5.0, 5.0, 5.0])
        .press_on("Price ", Key::A)
        .press_on("5.000", Key::B)
        .press_on("Charging's complete", Key::A)
        .press_on("Price ", Key::B);

    station().run(&mut hw).expect("cycle completes");

    assert!(!hw.shown("Charging is complete"));
    assert_eq!(hw.sent_payload(REPORT_ENERGY).as_deref(), Some("5.00"));
    assert_eq!(hw.sent_payload(REPORT_COST).as_deref(), Some("50.00"));
    assert_eq!(hw.sent_commands().last(), Some(&END));
}

// ── Offline ───────────────────────────────────────────────────

#[test]
fn offline_charge_is_written_to_card() {
    let mut hw = MockStation::new();
    offline_login(&mut hw);
    hw.samples(&[60.0, 60.0])
        .press_on("Price ", Key::A)
        .press_on("Charging's complete", Key::A)
        .press_on("Price ", Key::B);

    station().run(&mut hw).expect("cycle completes");

    assert!(hw.shown("Debit"));
    assert!(hw.writes.iter().any(|(x, y, t)| (*x, *y) == (11, 0) && t == "15"));
    assert!(hw.shown("Charged: 1800.00 dkk"));
    assert!(hw.shown("You've been debited"));
    assert!(hw.shown("Logged out"));
    assert_eq!(hw.card.block_text(2), "1812.50");
    assert_eq!(hw.card.block_text(5), "120.00");
    assert_eq!(hw.card.block_text(4), "1800.00");
    assert_eq!(hw.card.block_text(1), "4321");
    assert_eq!(hw.sent_commands(), [START]);
    assert_eq!(hw.restarts, 1);
}

#[test]
fn offline_history_comes_from_card() {
    let mut hw = MockStation::new();
    offline_login(&mut hw);
    hw.press_on("Price ", Key::C)
        .press_on("Price ", Key::A)
        .press_on("The last consumption", Key::B)
        .press_on("Price ", Key::F)
        .press_on("Price ", Key::A)
        .press_on("Account debit", Key::B)
        .press_on("Price ", Key::B);

    station().run(&mut hw).expect("cycle completes");

    assert!(hw.shown("Energy:  2.00 kWs"));
    assert!(hw.shown("Charged: 30.00 dkk"));
    assert!(hw.shown("12.50 Dkk"));
    assert_eq!(hw.sent_commands(), [START, END]);
    assert_eq!(hw.card.block_text(2), "12.50");
}

#[test]
fn offline_without_card_restarts() {
    let mut hw = MockStation::new();
    hw.card.present = false;
    hw.press_on("Press any key", Key::Digit(1))
        .reply(START, 24, b"")
        .press_on("Offline, fixed price", Key::A);

    station().run(&mut hw).expect("cycle completes");

    assert_eq!(hw.sent_commands(), [START]);
    assert_eq!(hw.restarts, 1);
    assert!(!hw.shown("Price "));
}
