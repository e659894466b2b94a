//! GPIO / peripheral pin assignments for the eCharger controller board.
//!
//! Single source of truth: every adapter references this module rather
//! than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Billing server link (UART)
// ---------------------------------------------------------------------------

/// UART port wired to the server modem.
pub const SERVER_UART_PORT: i32 = 1;
pub const SERVER_UART_TX_GPIO: i32 = 17;
pub const SERVER_UART_RX_GPIO: i32 = 18;
pub const SERVER_UART_BAUD: i32 = 9600;
/// Driver-side RX ring buffer (bytes).
pub const SERVER_UART_RX_BUFFER: i32 = 256;

// ---------------------------------------------------------------------------
// RFID reader (SPI + two interrupt lines)
// ---------------------------------------------------------------------------

pub const RFID_SCK_GPIO: i32 = 12;
pub const RFID_MOSI_GPIO: i32 = 11;
pub const RFID_MISO_GPIO: i32 = 13;
pub const RFID_CS_GPIO: i32 = 10;
/// Card-presence line: HIGH while a card is in the field.
pub const RFID_PRESENCE_GPIO: i32 = 4;
/// Data line: HIGH while a reply is ready to be clocked out.
pub const RFID_DATA_GPIO: i32 = 5;
/// SPI clock for the reader (Hz).
pub const RFID_SPI_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Energy meter (ADC1)
// ---------------------------------------------------------------------------

/// ADC1 channel sampling the charger's power monitor output.
pub const METER_ADC_CHANNEL: u32 = 6;
