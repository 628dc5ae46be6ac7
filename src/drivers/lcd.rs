//! 16×2 character LCD (HD44780 behind a PCF8574 I²C backpack).
//!
//! Two layers:
//!
//! - rendering: [`page_lines`] builds the text of each rotation page and
//!   [`encode_line`] maps it onto the controller's character ROM;
//! - output: anything implementing [`TextPanel`].  On the board that is
//!   [`Lcd1602`], a thin wrapper over the `lcd1602-driver` crate and its
//!   I²C sender.  Host tests record rows instead.

use core::fmt::Write;

use crate::app::reading::{DisplayMode, SensorReading};
use crate::control::irrigation::SprinklerState;

pub const COLS: usize = 16;

/// Character ROM code for the degree sign.
const DEGREE: u8 = 0xDF;

/// Map text onto one display row: pad with blanks, truncate at 16 columns,
/// substitute `°` and anything outside printable ASCII.
pub fn encode_line(text: &str) -> [u8; COLS] {
    let mut row = [b' '; COLS];
    for (slot, ch) in row.iter_mut().zip(text.chars()) {
        *slot = match ch {
            '°' => DEGREE,
            ' '..='~' => ch as u8,
            _ => b'?',
        };
    }
    row
}

/// The two rows of a rotation page.
pub fn page_lines(
    mode: DisplayMode,
    reading: &SensorReading,
    sprinkler: SprinklerState,
) -> (String, String) {
    let spr = if sprinkler.active { "ON" } else { "OFF" };
    let climate = |label: &str, temp: f32, hum: f32| {
        let top = if reading.valid {
            format!("{:<10}SPR:{}", label, spr)
        } else {
            String::from("DHT Error")
        };
        let mut bottom = String::new();
        let _ = write!(bottom, "{:.1}°C {:.1}%RH", temp, hum);
        (top, bottom)
    };
    match mode {
        DisplayMode::RoofReading => {
            climate("Roof:", reading.roof_temp_c, reading.roof_humidity_pct)
        }
        DisplayMode::IndoorReading => {
            climate("Indoor:", reading.indoor_temp_c, reading.indoor_humidity_pct)
        }
        DisplayMode::WaterLevel => (
            String::from("Water Level:"),
            format!("{}%", reading.water_level_whole()),
        ),
    }
}

/// A character display written one full row at a time.
pub trait TextPanel {
    /// Overwrite row `row` (0 or 1) with pre-encoded character codes.
    fn write_row(&mut self, row: u8, cells: &[u8; COLS]);

    fn show_lines(&mut self, top: &str, bottom: &str) {
        self.write_row(0, &encode_line(top));
        self.write_row(1, &encode_line(bottom));
    }
}

#[cfg(target_os = "espidf")]
pub use board::Lcd1602;

#[cfg(target_os = "espidf")]
mod board {
    use esp_idf_hal::delay::Ets;
    use esp_idf_hal::i2c::I2cDriver;
    use lcd1602_driver::command::DataWidth;
    use lcd1602_driver::lcd::{self, Basic, Lcd};
    use lcd1602_driver::sender::I2cSender;

    use super::{COLS, TextPanel};

    /// Busy-flag poll interval handed to the driver (µs).
    const POLL_INTERVAL_US: u32 = 10;

    pub type BackpackSender<'b> = I2cSender<'b, I2cDriver<'static>>;

    pub struct Lcd1602<'a, 'b> {
        lcd: Lcd<'a, 'a, BackpackSender<'b>, Ets>,
    }

    impl<'a, 'b> Lcd1602<'a, 'b> {
        /// Run the driver's 4-bit init sequence and blank the screen.
        pub fn new(sender: &'a mut BackpackSender<'b>, delay: &'a mut Ets) -> Self {
            let config = lcd::Config::default().set_data_width(DataWidth::Bit4);
            let mut lcd = Lcd::new(sender, delay, config, POLL_INTERVAL_US);
            lcd.clean_display();
            Self { lcd }
        }
    }

    impl TextPanel for Lcd1602<'_, '_> {
        fn write_row(&mut self, row: u8, cells: &[u8; COLS]) {
            self.lcd.set_cursor_pos((0, row));
            for &cell in cells {
                self.lcd.write_byte_to_cur(cell);
            }
        }
    }
}
