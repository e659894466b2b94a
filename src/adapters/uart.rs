//! UART link to the billing server.
//!
//! Outbound frames go straight to the UART driver through [`Transport`].
//! Inbound bytes are moved from the driver's RX ring into the
//! [`ByteSink`] by [`pump_rx`], which runs on its own task and plays the
//! role of the byte-received interrupt.

use esp_idf_svc::sys::*;
use log::info;

use crate::protocol::receiver::ByteSink;
use crate::protocol::transport::Transport;

/// Ticks `flush` waits for the TX FIFO to drain.
const TX_DONE_TICKS: u32 = 100;

pub struct UartTransport {
    port: uart_port_t,
}

impl UartTransport {
    /// Install the UART driver (8N1, no flow control).
    pub fn new(port: i32, tx_gpio: i32, rx_gpio: i32, baud: i32, rx_buffer: i32) -> Result<Self, i32> {
        let port = port as uart_port_t;
        let cfg = uart_config_t {
            baud_rate: baud,
            data_bits: uart_word_length_t_UART_DATA_8_BITS,
            parity: uart_parity_t_UART_PARITY_DISABLE,
            stop_bits: uart_stop_bits_t_UART_STOP_BITS_1,
            flow_ctrl: uart_hw_flowcontrol_t_UART_HW_FLOWCTRL_DISABLE,
            ..Default::default()
        };

        // SAFETY: one-time driver setup before any other task uses the port.
        unsafe {
            let ret = uart_driver_install(port, rx_buffer, 0, 0, core::ptr::null_mut(), 0);
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = uart_param_config(port, &cfg);
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
            let ret = uart_set_pin(port, tx_gpio, rx_gpio, -1, -1);
            if ret != ESP_OK as i32 {
                return Err(ret);
            }
        }
        info!("UART{}: {} baud, tx={} rx={}", port, baud, tx_gpio, rx_gpio);
        Ok(Self { port })
    }

    pub fn port(&self) -> uart_port_t {
        self.port
    }
}

impl Transport for UartTransport {
    type Error = i32;

    fn write(&mut self, data: &[u8]) -> Result<usize, i32> {
        // SAFETY: `data` outlives the call; the driver copies into its TX ring.
        let written = unsafe { uart_write_bytes(self.port, data.as_ptr().cast(), data.len()) };
        usize::try_from(written).map_err(|_| written)
    }

    fn flush(&mut self) -> Result<(), i32> {
        // SAFETY: the driver was installed in `new`.
        let ret = unsafe { uart_wait_tx_done(self.port, TX_DONE_TICKS) };
        if ret == ESP_OK as i32 { Ok(()) } else { Err(ret) }
    }
}

/// Move whatever the driver has buffered into `sink`.  Returns the
/// number of bytes moved; never blocks.
pub fn pump_rx(port: uart_port_t, sink: &mut ByteSink<'_>) -> usize {
    let mut buf = [0u8; 32];
    // SAFETY: `buf` is valid for `buf.len()` bytes; zero ticks means no wait.
    let read = unsafe { uart_read_bytes(port, buf.as_mut_ptr().cast(), buf.len() as u32, 0) };
    let Ok(read) = usize::try_from(read) else {
        return 0;
    };
    for &byte in &buf[..read] {
        sink.on_byte_received(byte);
    }
    read
}
