//! GPIO / peripheral pin assignments for the Vapor controller board
//! (ESP32-WROOM-32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sprinkler relay (active-low module)
// ---------------------------------------------------------------------------

/// Digital output: LOW energises the relay coil (valve open).
pub const RELAY_GPIO: i32 = 25;

// ---------------------------------------------------------------------------
// Sensors: DHT11 single-wire
// ---------------------------------------------------------------------------

/// Roof-mounted DHT11 data line.
pub const DHT_ROOF_GPIO: i32 = 17;
/// Indoor (greenhouse) DHT11 data line.
pub const DHT_INDOOR_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Sensors: HC-SR04 ultrasonic rangefinder above the tank
// ---------------------------------------------------------------------------

pub const ULTRASONIC_TRIG_GPIO: i32 = 14;
pub const ULTRASONIC_ECHO_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// SIM800L GSM modem (UART2)
// ---------------------------------------------------------------------------

/// ESP32 RX, wired to modem TX.
pub const GSM_RX_GPIO: i32 = 32;
/// ESP32 TX, wired to modem RX.
pub const GSM_TX_GPIO: i32 = 33;
pub const GSM_BAUD: u32 = 9_600;

// ---------------------------------------------------------------------------
// I²C bus: 16×2 LCD behind a PCF8574 backpack
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 100_000;
pub const LCD_I2C_ADDR: u8 = 0x27;

// ---------------------------------------------------------------------------
// SD card (SPI, VSPI default pins)
// ---------------------------------------------------------------------------

pub const SD_CS_GPIO: i32 = 5;
pub const SD_SCLK_GPIO: i32 = 18;
pub const SD_MISO_GPIO: i32 = 19;
pub const SD_MOSI_GPIO: i32 = 23;

/// Mount point of the FAT volume.
pub const SD_MOUNT_POINT: &str = "/sdcard";
