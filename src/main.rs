//! Vapor Firmware: Main Entry Point
//!
//! Hexagonal architecture around a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        Sim800Modem        SdJournal           │
//! │  (Sensor+Distance+      (Messaging+        (LogPort)           │
//! │   Relay+Display)         TimeSource)                           │
//! │  ConfigFileAdapter      LogEventSink       Esp32TimeAdapter    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  Clock · IrrigationPolicy · CooldownGate               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::spi::{Dma, SpiDriver, SpiDriverConfig};
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::fs::fatfs::Fatfs;
use esp_idf_svc::io::vfs::MountedFatfs;
use esp_idf_svc::sd::spi::SdSpiHostDriver;
use esp_idf_svc::sd::{SdCardConfiguration, SdCardDriver};
use lcd1602_driver::sender::I2cSender;
use log::{info, warn};

use vapor::adapters::config_file::ConfigFileAdapter;
use vapor::adapters::hardware::HardwareAdapter;
use vapor::adapters::log_sink::LogEventSink;
use vapor::adapters::modem::{Sim800Modem, UartLink};
use vapor::adapters::sd_journal::SdJournal;
use vapor::adapters::time::Esp32TimeAdapter;
use vapor::app::ports::ConfigPort;
use vapor::app::service::ControlLoop;
use vapor::config::SystemConfig;
use vapor::drivers::lcd::Lcd1602;
use vapor::drivers::relay::RelayDriver;
use vapor::drivers::watchdog::Watchdog;
use vapor::error::Error;
use vapor::pins;
use vapor::sensors::SensorHub;
use vapor::sensors::dht::{DhtSensor, Site};
use vapor::sensors::ultrasonic::Ultrasonic;

/// Pause between control ticks.  All real intervals are timer-driven
/// inside the loop; this only bounds CPU use.
const LOOP_PERIOD_MS: u32 = 50;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Vapor v{}                           ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    if let Err(e) = vapor::drivers::hw_init::init_peripherals().map_err(Error::from) {
        // Without the sensor lines the loop still runs on last-known values.
        warn!("{}", e);
    }
    let watchdog = Watchdog::default();

    // ── 2. Relay first, so the valve is closed before anything else ──
    // GPIO25, see pins::RELAY_GPIO
    let relay = RelayDriver::new(PinDriver::output(peripherals.pins.gpio25)?);

    // ── 3. LCD (I2C0 on GPIO21/22) ────────────────────────────
    let mut i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ)),
    )?;
    let mut lcd_sender = I2cSender::new(&mut i2c, pins::LCD_I2C_ADDR);
    let mut lcd_delay = Ets;
    let lcd = Lcd1602::new(&mut lcd_sender, &mut lcd_delay);

    let sensor_hub = SensorHub::new(
        DhtSensor::new(Site::Roof, pins::DHT_ROOF_GPIO),
        DhtSensor::new(Site::Indoor, pins::DHT_INDOOR_GPIO),
        Ultrasonic::new(pins::ULTRASONIC_TRIG_GPIO, pins::ULTRASONIC_ECHO_GPIO),
    );
    let mut hw = HardwareAdapter::new(sensor_hub, relay, lcd);
    hw.splash("Initializing GSM", "");

    // ── 4. SD card (VSPI): journal and config live here ──────
    let spi = SpiDriver::new(
        peripherals.spi3,
        peripherals.pins.gpio18,
        peripherals.pins.gpio23,
        Some(peripherals.pins.gpio19),
        &SpiDriverConfig::default().dma(Dma::Auto(4096)),
    )?;
    let sd_mount = SdSpiHostDriver::new(
        spi,
        Some(peripherals.pins.gpio5),
        AnyIOPin::none(),
        AnyIOPin::none(),
        AnyIOPin::none(),
        None,
    )
    .and_then(|host| SdCardDriver::new_spi(host, &SdCardConfiguration::new()))
    .and_then(|card| Fatfs::new_sdcard(0, card))
    .and_then(|fs| MountedFatfs::mount(fs, pins::SD_MOUNT_POINT, 4));
    // Keep the mount alive for the lifetime of the loop.
    let _sd_mount = match sd_mount {
        Ok(m) => {
            info!("SD card mounted at {}", pins::SD_MOUNT_POINT);
            Some(m)
        }
        Err(e) => {
            warn!("SD card mount failed ({}), journal disabled", e);
            None
        }
    };

    // ── 5. Configuration ──────────────────────────────────────
    let config = match ConfigFileAdapter::new(pins::SD_MOUNT_POINT).load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 6. GSM modem (UART2 on GPIO33 TX / GPIO32 RX) ─────────
    let uart = UartDriver::new(
        peripherals.uart2,
        peripherals.pins.gpio33,
        peripherals.pins.gpio32,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::new().baudrate(Hertz(pins::GSM_BAUD)),
    )?;
    let mut modem = Sim800Modem::new(UartLink::new(uart));
    if let Err(e) = modem.init().map_err(Error::from) {
        warn!("Modem not answering ({}), SMS disabled until it recovers", e);
    }

    // ── 7. Control loop ───────────────────────────────────────
    let time = Esp32TimeAdapter::new();
    let mut journal = SdJournal::new(pins::SD_MOUNT_POINT);
    let mut log_sink = LogEventSink::new();
    let mut app = ControlLoop::new(config);
    app.start(time.uptime_ms(), &mut modem, &mut log_sink);

    info!("System ready. Entering control loop.");

    loop {
        app.tick(
            time.uptime_ms(),
            &mut hw,
            &mut modem,
            &mut journal,
            &mut log_sink,
        );
        watchdog.feed();
        FreeRtos::delay_ms(LOOP_PERIOD_MS);
    }
}
