//! Session authentication against a scripted server and simulated card.

use echarger::app::context::StationContext;
use echarger::app::ports::Key;
use echarger::config::StationConfig;
use echarger::session::{Mode, SessionFsm, SessionOutcome, SessionState};

use crate::mock_hw::{MockStation, SimCard, test_config};

const START: u8 = 22;
const CARD_ID: u8 = 10;
const PIN: u8 = 0;
const REPEAT: u8 = 9;
const END: u8 = 99;

fn run(hw: &mut MockStation, config: StationConfig) -> (SessionFsm, StationContext, SessionOutcome) {
    let mut ctx = StationContext::new(config);
    let mut fsm = SessionFsm::new();
    let outcome = fsm.run(&mut ctx, hw).expect("session runs to an outcome");
    (fsm, ctx, outcome)
}

/// Server side of a successful online identification.
fn script_online(hw: &mut MockStation, pin: &str) {
    hw.reply(START, 23, b"")
        .reply(CARD_ID, 11, b"")
        .reply(PIN, 1, b"")
        .type_pin(pin);
}

// ── Online ────────────────────────────────────────────────────

#[test]
fn online_identification_completes() {
    let mut hw = MockStation::new();
    script_online(&mut hw, "1234");

    let (fsm, ctx, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(fsm.state(), SessionState::InSession);
    assert_eq!(ctx.session.mode, Mode::Online);
    assert!(ctx.session.identified);
    assert_eq!(hw.sent_commands(), [START, CARD_ID, PIN]);
    assert_eq!(hw.sent_payload(START).as_deref(), Some("StartSession"));
    assert_eq!(hw.sent_payload(CARD_ID).as_deref(), Some(SimCard::UID_TEXT));
    assert_eq!(hw.sent_payload(PIN).as_deref(), Some("1234"));
    assert!(hw.shown("Connected"));
    assert!(hw.shown("PIN is OK"));
}

#[test]
fn every_frame_is_addressed_station_to_server() {
    let mut hw = MockStation::new();
    script_online(&mut hw, "1234");
    run(&mut hw, test_config());

    for frame in &hw.sent {
        assert_eq!((frame.source, frame.destination), (2, 1), "{frame:?}");
    }
}

#[test]
fn pin_is_echoed_masked() {
    let mut hw = MockStation::new();
    script_online(&mut hw, "9876");
    run(&mut hw, test_config());

    let row1: Vec<&str> = hw
        .writes
        .iter()
        .filter(|(_, y, t)| *y == 1 && t.chars().count() == 1)
        .map(|(_, _, t)| t.as_str())
        .collect();
    assert_eq!(row1, ["9", "*", "8", "*", "7", "*", "6", "*"]);
}

#[test]
fn non_digit_keys_ignored_during_pin_entry() {
    let mut hw = MockStation::new();
    hw.reply(START, 23, b"").reply(CARD_ID, 11, b"").reply(PIN, 1, b"");
    hw.press_on("Enter PIN:", Key::Digit(1))
        .press_on("Enter PIN:", Key::C)
        .press_on("Enter PIN:", Key::Digit(2))
        .press_on("Enter PIN:", Key::Digit(3))
        .press_on("Enter PIN:", Key::A)
        .press_on("Enter PIN:", Key::Digit(4));

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(hw.sent_payload(PIN).as_deref(), Some("1234"));
}

#[test]
fn rejected_pin_is_asked_again() {
    let mut hw = MockStation::new();
    hw.reply(START, 23, b"")
        .reply(CARD_ID, 11, b"")
        .reply(PIN, 2, b"")
        .reply(PIN, 1, b"")
        .type_pin("0000")
        .type_pin("1234");

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(hw.sent_commands(), [START, CARD_ID, PIN, PIN]);
    assert!(hw.shown("Incorrect PIN"));
}

#[test]
fn lock_out_ends_session_then_next_user_identifies() {
    let mut hw = MockStation::new();
    hw.reply(START, 23, b"")
        .reply(CARD_ID, 11, b"")
        .reply(PIN, 2, b"")
        .reply(PIN, 3, b"")
        .type_pin("1111")
        .type_pin("2222")
        .press_on("Press any key", Key::Digit(5));
    script_online(&mut hw, "1234");

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert!(hw.shown("Access is blocked"));
    assert!(hw.shown("Wrong PIN input 3x"));
    assert_eq!(
        hw.sent_commands(),
        [START, CARD_ID, PIN, PIN, END, START, CARD_ID, PIN]
    );
    assert_eq!(hw.sent_payload(END).as_deref(), Some("EndofSession"));
}

#[test]
fn unknown_card_ends_session() {
    let mut hw = MockStation::new();
    hw.reply(START, 23, b"")
        .reply(CARD_ID, 12, b"")
        .press_on("Press any key", Key::A);
    script_online(&mut hw, "1234");

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert!(hw.shown("Unknown card"));
    assert_eq!(
        hw.sent_commands(),
        [START, CARD_ID, END, START, CARD_ID, PIN]
    );
}

// ── Retransmission ────────────────────────────────────────────

#[test]
fn unexpected_start_reply_requests_repeat_without_resending() {
    let mut hw = MockStation::new();
    hw.reply(START, 51, b"20").reply(REPEAT, 23, b"");
    hw.reply(CARD_ID, 11, b"").reply(PIN, 1, b"").type_pin("1234");

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(hw.sent_commands(), [START, REPEAT, CARD_ID, PIN]);
    assert_eq!(hw.sent_payload(REPEAT).as_deref(), Some("RepeatLastPacket"));
}

#[test]
fn corrupted_reply_requests_repeat() {
    let mut hw = MockStation::new();
    let mut wire = echarger::protocol::codec::encode_to_vec(1, 2, 23, b"").unwrap().to_vec();
    let check = wire.len() - 3;
    wire[check] = wire[check].wrapping_add(1);
    if matches!(wire[check], b'-' | b'*') {
        wire[check] = wire[check].wrapping_add(1);
    }
    hw.reply_raw(START, &wire).reply(REPEAT, 23, b"");
    hw.reply(CARD_ID, 11, b"").reply(PIN, 1, b"").type_pin("1234");

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(hw.sent_commands(), [START, REPEAT, CARD_ID, PIN]);
}

#[test]
fn unexpected_pin_reply_waits_for_the_repeat() {
    let mut hw = MockStation::new();
    hw.reply(START, 23, b"")
        .reply(CARD_ID, 11, b"")
        .reply(PIN, 64, b"7")
        .reply(REPEAT, 1, b"")
        .type_pin("1234");

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(hw.sent_commands(), [START, CARD_ID, PIN, REPEAT]);
}

#[test]
fn repeat_requests_are_bounded() {
    let config = StationConfig {
        max_repeat_requests: 2,
        ..test_config()
    };
    let mut hw = MockStation::new();
    hw.reply(START, 51, b"")
        .reply(REPEAT, 51, b"")
        .reply(REPEAT, 51, b"")
        .press_on("Press any key", Key::B);
    script_online(&mut hw, "1234");

    let (_, _, outcome) = run(&mut hw, config);

    assert_eq!(outcome, SessionOutcome::Identified);
    assert!(hw.shown("No connection"));
    assert_eq!(
        hw.sent_commands(),
        [START, REPEAT, REPEAT, END, START, CARD_ID, PIN]
    );
}

#[test]
fn silent_server_times_out() {
    let mut hw = MockStation::new();
    hw.reply_raw(START, b"").press_on("Press any key", Key::D);
    script_online(&mut hw, "1234");

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert!(hw.shown("No connection"));
    assert_eq!(hw.sent_commands(), [START, END, START, CARD_ID, PIN]);
}

// ── Offline ───────────────────────────────────────────────────

#[test]
fn offline_accept_sets_fixed_price() {
    let mut hw = MockStation::new();
    hw.reply(START, 24, b"")
        .press_on("Offline, fixed price", Key::A)
        .type_pin("4321");

    let (fsm, ctx, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(fsm.state(), SessionState::Offline);
    assert_eq!(ctx.session.mode, Mode::Offline);
    assert_eq!(ctx.session.price, 15);
    assert_eq!(ctx.session.card_id.as_str(), SimCard::UID_TEXT);
    assert_eq!(ctx.session.credit.as_str(), "12.50");
    assert_eq!(ctx.session.past_energy.as_str(), "2.00");
    assert_eq!(ctx.session.past_expense.as_str(), "30.00");
    assert!(hw.shown("15dkk/kWs"));
    assert!(hw.shown("System's offline"));
    assert_eq!(hw.sent_commands(), [START]);
}

#[test]
fn offline_declined_ends_session() {
    let mut hw = MockStation::new();
    hw.reply(START, 24, b"")
        .press_on("Offline, fixed price", Key::B)
        .press_on("Press any key", Key::Digit(0));
    script_online(&mut hw, "1234");

    let (_, ctx, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Identified);
    assert_eq!(ctx.session.mode, Mode::Online);
    assert_eq!(hw.sent_commands(), [START, END, START, CARD_ID, PIN]);
}

#[test]
fn offline_wrong_pin_retries_then_restarts() {
    let mut hw = MockStation::new();
    hw.reply(START, 24, b"")
        .press_on("Offline, fixed price", Key::A)
        .type_pin("0000")
        .type_pin("1111")
        .type_pin("2222");

    let (_, ctx, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Restarted);
    assert_eq!(hw.restarts, 1);
    assert_eq!(ctx.session.pin_failures, 3);
    assert!(hw.shown("Incorrect PIN"));
    assert!(hw.shown("Access is blocked"));
    assert_eq!(hw.keys_left(), 0);
}

#[test]
fn offline_missing_card_restarts() {
    let mut hw = MockStation::new();
    hw.card.present = false;
    hw.reply(START, 24, b"").press_on("Offline, fixed price", Key::A);

    let (_, _, outcome) = run(&mut hw, test_config());

    assert_eq!(outcome, SessionOutcome::Restarted);
    assert_eq!(hw.restarts, 1);
    assert!(hw.shown("Card not read"));
}
