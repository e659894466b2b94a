//! eCharger Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  LogDisplay   KeyQueue   AdcMeter   SerialLink(UART)           │
//! │  SpiCardReader(+ card IRQs)   WatchdogRestart                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Station (pure logic)                      │    │
//! │  │  Menu FSM · Session FSM · RFID FSM · Packet codec      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::Read;

use anyhow::{Result, anyhow};
use esp_idf_svc::hal::delay::{Delay, FreeRtos};
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::spi::{SpiBusDriver, SpiDriver, SpiDriverConfig, config::Config as SpiConfig};
use esp_idf_svc::hal::units::Hertz;
use log::{error, info, warn};

use echarger::adapters::card_irq::{self, CARD_EDGES};
use echarger::adapters::display::LogDisplay;
use echarger::adapters::hardware::StationHardware;
use echarger::adapters::keypad::KeyQueue;
use echarger::adapters::meter::AdcMeter;
use echarger::adapters::system::WatchdogRestart;
use echarger::adapters::uart::{self, UartTransport};
use echarger::app::ports::SystemControl;
use echarger::app::station::Station;
use echarger::config::StationConfig;
use echarger::pins;
use echarger::protocol::receiver::{self, RxQueue};
use echarger::protocol::transport::SerialLink;
use echarger::rfid::spi::SpiCardReader;

/// Keys typed on the console, standing in for the matrix scanner.
static KEYS: KeyQueue = KeyQueue::new();

/// Energy per sample at full-scale meter input.
const METER_FULL_SCALE: f32 = 20.0;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  eCharger v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = StationConfig::default();
    let mut station = Station::new(config.clone()).map_err(|e| anyhow!("config rejected: {e}"))?;

    // ── 2. Server link: UART driver → byte queue → receiver ───
    let uart = UartTransport::new(
        pins::SERVER_UART_PORT,
        pins::SERVER_UART_TX_GPIO,
        pins::SERVER_UART_RX_GPIO,
        pins::SERVER_UART_BAUD,
        pins::SERVER_UART_RX_BUFFER,
    )
    .map_err(|rc| anyhow!("UART init failed (rc={rc})"))?;
    let queue: &'static mut RxQueue = Box::leak(Box::new(RxQueue::new()));
    let (mut sink, rx) = receiver::split(queue, config.verify_checksum);
    let port = uart.port();
    std::thread::Builder::new()
        .name("uart-rx".into())
        .stack_size(4096)
        .spawn(move || {
            loop {
                if uart::pump_rx(port, &mut sink) == 0 {
                    FreeRtos::delay_ms(1);
                }
            }
        })?;

    // ── 3. Keypad: console characters → key queue ─────────────
    std::thread::Builder::new()
        .name("keys".into())
        .stack_size(4096)
        .spawn(|| {
            for byte in std::io::stdin().bytes().flatten() {
                KEYS.on_char(char::from(byte));
            }
        })?;

    // ── 4. Card reader: SPI bus + presence/data interrupts ────
    let peripherals = Peripherals::take()?;
    // SAFETY: each GPIO below is claimed exactly once, from pins.rs.
    let (sck, mosi, miso, cs) = unsafe {
        (
            AnyOutputPin::new(pins::RFID_SCK_GPIO),
            AnyOutputPin::new(pins::RFID_MOSI_GPIO),
            AnyInputPin::new(pins::RFID_MISO_GPIO),
            AnyIOPin::new(pins::RFID_CS_GPIO),
        )
    };
    let spi = SpiDriver::new(peripherals.spi2, sck, mosi, Some(miso), &SpiDriverConfig::new())?;
    let bus = SpiBusDriver::new(spi, &SpiConfig::new().baudrate(Hertz(pins::RFID_SPI_HZ)))?;
    let mut select = PinDriver::output(cs)?;
    select.set_low()?;
    card_irq::install().map_err(|rc| anyhow!("card IRQ setup failed (rc={rc})"))?;

    // ── 5. Energy meter ───────────────────────────────────────
    let meter = AdcMeter::new(pins::METER_ADC_CHANNEL, METER_FULL_SCALE)
        .map_err(|rc| anyhow!("ADC init failed (rc={rc})"))?;

    let mut hw = StationHardware {
        display: LogDisplay::new(),
        keypad: &KEYS,
        meter,
        server: SerialLink::new(uart, rx),
        card: SpiCardReader::new(bus, &CARD_EDGES),
        system: WatchdogRestart::new(),
        delay: Delay::new_default(),
    };

    // ── 6. Foreground loop ────────────────────────────────────
    // Each cycle ends in a restart; the loop only turns over if the
    // restart itself failed to take.
    loop {
        if let Err(e) = station.run(&mut hw) {
            error!("STATION: {}", e);
        }
        warn!("STATION: cycle {} ended, forcing restart", station.cycles());
        hw.restart();
    }
}
