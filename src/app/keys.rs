//! Blocking keypad waits.
//!
//! The controller has no scheduler: every prompt spins on
//! [`Keypad::poll_key`] until the user answers.

use super::ports::{Key, Keypad};

/// Spin until any key is pressed.
pub fn wait_key(keypad: &mut impl Keypad) -> Key {
    loop {
        if let Some(key) = keypad.poll_key() {
            return key;
        }
        core::hint::spin_loop();
    }
}

/// Spin until one of `accepted` is pressed; other keys are ignored.
pub fn wait_for(keypad: &mut impl Keypad, accepted: &[Key]) -> Key {
    loop {
        let key = wait_key(keypad);
        if accepted.contains(&key) {
            return key;
        }
    }
}

/// Spin until a digit key is pressed.  Returns its ASCII character.
pub fn wait_digit(keypad: &mut impl Keypad) -> u8 {
    loop {
        if let Key::Digit(d) = wait_key(keypad) {
            return b'0' + d;
        }
    }
}
