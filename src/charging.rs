//! Charging simulation.
//!
//! Samples the energy meter once per sample period and accumulates the
//! deltas until the charge target is passed or the user presses `B`.
//! A zero sample means the car drew nothing and restarts the count.
//!
//! ```text
//!   Energy:    42.0  mWs
//!   Power:     8.400 mW
//!   Charging progress:
//!   ████████
//! ```

use core::fmt::Write;

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::app::ports::{DISPLAY_COLUMNS, Display, EnergyMeter, FULL_CELL_GLYPH, Key, Keypad, Line};
use crate::config::StationConfig;

/// Energy represented by one progress bar cell.
const ENERGY_PER_CELL: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChargeResult {
    /// Accumulated energy (kWs).
    pub energy: f32,
    /// The user stopped the charge with `B`.
    pub cancelled: bool,
}

/// Run one charge to completion.
pub fn run(
    hw: &mut (impl Display + Keypad + EnergyMeter + DelayNs),
    config: &StationConfig,
) -> ChargeResult {
    hw.clear_display();
    hw.display_text(0, 0, "Energy:          mWs");
    hw.display_text(0, 1, "Power:           mW");
    hw.display_text(0, 2, "Charging progress:");

    let mut energy = 0.0f32;
    let mut last_power = f32::NAN;
    loop {
        hw.delay_ms(config.sample_period_ms);
        if cancel_requested(hw) {
            info!("CHARGE: cancelled at {:.1}", energy);
            return ChargeResult {
                energy,
                cancelled: true,
            };
        }

        let power = hw.sample_energy();
        energy = if power == 0.0 { 0.0 } else { energy + power };
        debug!("CHARGE: sample {:.3}, total {:.1}", power, energy);

        if power != last_power {
            show_value(hw, 1, format_args!("{:.3}", power));
            last_power = power;
        }
        show_value(hw, 0, format_args!("{:.1}", energy));

        if energy > config.charge_target_energy {
            hw.display_text(0, 3, "Charging is complete");
            info!("CHARGE: complete at {:.1}", energy);
            return ChargeResult {
                energy,
                cancelled: false,
            };
        }
        hw.display_text(progress_column(energy), 3, FULL_CELL_GLYPH);
    }
}

/// Column of the progress cell for `energy`.
pub fn progress_column(energy: f32) -> u8 {
    let cell = (energy / ENERGY_PER_CELL).floor();
    if cell <= 0.0 {
        0
    } else {
        (cell as u8).min(DISPLAY_COLUMNS - 1)
    }
}

/// Drain key presses gathered during the sample period.
fn cancel_requested(keypad: &mut impl Keypad) -> bool {
    let mut cancel = false;
    while let Some(key) = keypad.poll_key() {
        cancel |= key == Key::B;
    }
    cancel
}

fn show_value(hw: &mut impl Display, row: u8, value: core::fmt::Arguments<'_>) {
    let mut text = Line::new();
    // Overlong values are cut at the line capacity.
    let _ = text.write_fmt(value);
    hw.display_text(10, row, "      ");
    hw.display_text(10, row, &text);
}
