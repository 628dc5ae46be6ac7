//! Sprinkler relay driver.
//!
//! The relay module is active-low: driving the input LOW energises the
//! coil and opens the valve.  Everything above this driver speaks in
//! logical on/off; the inversion lives here and nowhere else.
//!
//! Generic over [`embedded_hal::digital::OutputPin`], so the firmware
//! hands in an `esp_idf_hal` `PinDriver` and tests a recording pin.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct RelayDriver<P: OutputPin> {
    pin: P,
    active: bool,
}

impl<P: OutputPin> RelayDriver<P> {
    /// Take the pin and park the relay in the off state.
    pub fn new(pin: P) -> Self {
        let mut relay = Self { pin, active: true };
        relay.set(false);
        relay
    }

    pub fn set(&mut self, active: bool) {
        let result = if active {
            self.pin.set_low()
        } else {
            self.pin.set_high()
        };
        if result.is_err() {
            warn!("Relay pin write failed (active={})", active);
            return;
        }
        self.active = active;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}
