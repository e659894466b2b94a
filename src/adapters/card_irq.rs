//! GPIO interrupts for the card reader's presence and data lines.
//!
//! Each line has its own handler; the handler reads its line's level and
//! pushes the tagged edge into [`CARD_EDGES`].

use esp_idf_svc::sys::*;
use log::info;

use crate::pins;
use crate::rfid::edges::EdgeSignals;

/// Edge queue shared by the two handlers and the SPI card reader.
pub static CARD_EDGES: EdgeSignals = EdgeSignals::new();

unsafe extern "C" fn presence_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: gpio_get_level is a register read; safe in ISR context.
    let high = unsafe { gpio_get_level(pins::RFID_PRESENCE_GPIO) } != 0;
    CARD_EDGES.on_presence_edge(high);
}

unsafe extern "C" fn data_isr(_arg: *mut core::ffi::c_void) {
    // SAFETY: as above.
    let high = unsafe { gpio_get_level(pins::RFID_DATA_GPIO) } != 0;
    CARD_EDGES.on_data_edge(high);
}

/// Configure both lines as inputs and register their any-edge handlers.
pub fn install() -> Result<(), i32> {
    let cfg = gpio_config_t {
        pin_bit_mask: (1u64 << pins::RFID_PRESENCE_GPIO) | (1u64 << pins::RFID_DATA_GPIO),
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_ENABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_ANYEDGE,
        ..Default::default()
    };

    // SAFETY: gpio_install_isr_service is idempotent (ESP_ERR_INVALID_STATE
    // when already installed).  The handlers only touch the lock-free queue.
    unsafe {
        let ret = gpio_config(&cfg);
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(ret);
        }
        gpio_isr_handler_add(pins::RFID_PRESENCE_GPIO, Some(presence_isr), core::ptr::null_mut());
        gpio_isr_handler_add(pins::RFID_DATA_GPIO, Some(data_isr), core::ptr::null_mut());

        // A card already in the field raised its edge before we listened.
        if gpio_get_level(pins::RFID_PRESENCE_GPIO) != 0 {
            CARD_EDGES.on_presence_edge(true);
        }
    }
    info!(
        "RFID: interrupts on presence={} data={}",
        pins::RFID_PRESENCE_GPIO,
        pins::RFID_DATA_GPIO
    );
    Ok(())
}
