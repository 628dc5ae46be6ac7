//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the relay and the LCD, exposing them through
//! [`SensorPort`], [`DistancePort`], [`RelayPort`] and [`DisplayPort`].
//! On non-espidf targets the sensor drivers use cfg-gated simulation
//! stubs; the relay pin is any embedded-hal output and the display any
//! [`TextPanel`].

use embedded_hal::digital::OutputPin;

use crate::app::ports::{DisplayPort, DistancePort, RelayPort, SensorPort};
use crate::app::reading::{DisplayMode, SensorReading};
use crate::control::irrigation::SprinklerState;
use crate::drivers::lcd::{TextPanel, page_lines};
use crate::drivers::relay::RelayDriver;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all board-side hardware behind port traits.
pub struct HardwareAdapter<P: OutputPin, T: TextPanel> {
    sensor_hub: SensorHub,
    relay: RelayDriver<P>,
    lcd: T,
}

impl<P: OutputPin, T: TextPanel> HardwareAdapter<P, T> {
    pub fn new(sensor_hub: SensorHub, relay: RelayDriver<P>, lcd: T) -> Self {
        Self {
            sensor_hub,
            relay,
            lcd,
        }
    }

    /// Two-line notice outside the page rotation (boot progress etc).
    pub fn splash(&mut self, top: &str, bottom: &str) {
        self.lcd.show_lines(top, bottom);
    }
}

// ── Sensor ports ──────────────────────────────────────────────

impl<P: OutputPin, T: TextPanel> SensorPort for HardwareAdapter<P, T> {
    fn read(&mut self) -> SensorReading {
        self.sensor_hub.read_climate()
    }
}

impl<P: OutputPin, T: TextPanel> DistancePort for HardwareAdapter<P, T> {
    fn measure(&mut self) -> Option<f32> {
        self.sensor_hub.measure_distance()
    }
}

// ── Actuator / display ports ──────────────────────────────────

impl<P: OutputPin, T: TextPanel> RelayPort for HardwareAdapter<P, T> {
    fn set(&mut self, active: bool) {
        self.relay.set(active);
    }
}

impl<P: OutputPin, T: TextPanel> DisplayPort for HardwareAdapter<P, T> {
    fn show(&mut self, mode: DisplayMode, reading: &SensorReading, sprinkler: SprinklerState) {
        let (top, bottom) = page_lines(mode, reading, sprinkler);
        self.lcd.show_lines(&top, &bottom);
    }

    fn banner(&mut self, text: &str) {
        self.lcd.show_lines(text, "");
    }
}
