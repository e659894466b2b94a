//! Adapters: concrete implementations of the station port traits.
//!
//! | Adapter    | Implements      | Connects to                    |
//! |------------|-----------------|--------------------------------|
//! | `display`  | Display         | Serial log (LCD mirror)        |
//! | `keypad`   | Keypad          | Key scanner / console queue    |
//! | `meter`    | EnergyMeter     | ESP32 ADC1 oneshot             |
//! | `uart`     | Transport       | Server UART driver             |
//! | `card_irq` |                 | RFID presence / data GPIO IRQs |
//! | `system`   | SystemControl   | `esp_restart`                  |
//! | `hardware` | all of the above| bundle handed to the machines  |
//!
//! `uart` and `card_irq` only exist on target; the rest fall back to
//! simulations on the host.

pub mod display;
pub mod hardware;
pub mod keypad;
pub mod meter;
pub mod system;

#[cfg(target_os = "espidf")]
pub mod card_irq;
#[cfg(target_os = "espidf")]
pub mod uart;
