//! Station lifecycle across restarts.

use echarger::app::ports::Key;
use echarger::app::station::Station;
use echarger::config::StationConfig;
use echarger::menu::MenuState;
use echarger::session::SessionState;

use crate::mock_hw::{MockStation, test_config};

#[test]
fn invalid_config_is_rejected() {
    let config = StationConfig {
        max_pin_attempts: 0,
        ..test_config()
    };
    assert!(Station::new(config).is_err());
}

#[test]
fn consecutive_cycles_start_from_idle() {
    let mut hw = MockStation::new();
    for _ in 0..2 {
        hw.press_on("Press any key", Key::Digit(1))
            .reply(22, 23, b"")
            .reply(10, 11, b"")
            .reply(0, 1, b"")
            .type_pin("1234")
            .reply(50, 51, b"20")
            .press_on("Price ", Key::B);
    }

    let mut station = Station::new(test_config()).expect("valid config");
    assert_eq!(station.menu_state(), MenuState::Idle);
    assert_eq!(station.session_state(), SessionState::Init);

    station.run(&mut hw).expect("first cycle");
    station.run(&mut hw).expect("second cycle");

    assert_eq!(station.cycles(), 2);
    assert_eq!(hw.restarts, 2);
    assert_eq!(hw.sent_commands(), [22, 10, 0, 50, 99, 22, 10, 0, 50, 99]);
    assert_eq!(station.menu_state(), MenuState::Idle);
    assert!(!station.context().session.identified);
    assert_eq!(station.config().offline_price, 15);
}

#[test]
fn offline_session_does_not_leak_into_next_cycle() {
    let mut hw = MockStation::new();
    hw.press_on("Press any key", Key::Digit(1))
        .reply(22, 24, b"")
        .press_on("Offline, fixed price", Key::A)
        .type_pin("4321")
        .press_on("Price ", Key::B);
    hw.press_on("Press any key", Key::Digit(2))
        .reply(22, 23, b"")
        .reply(10, 11, b"")
        .reply(0, 1, b"")
        .type_pin("1234")
        .reply(50, 51, b"30")
        .press_on("Price ", Key::B);

    let mut station = Station::new(test_config()).expect("valid config");
    station.run(&mut hw).expect("offline cycle");
    station.run(&mut hw).expect("online cycle");

    assert!(hw.shown("Debit"));
    assert!(hw.writes.iter().any(|(x, y, t)| (*x, *y) == (11, 0) && t == "30"));
    assert_eq!(hw.sent_commands(), [22, 99, 22, 10, 0, 50, 99]);
}
