//! HC-SR04 ultrasonic rangefinder mounted above the water tank.
//!
//! A 10 µs trigger pulse starts a measurement; the echo line stays high for
//! the round-trip time.  Sound covers 1 cm out and back in ~58 µs.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: pulses trig and times echo via hw_init helpers.
//! On host/test: reads a distance from a static atomic for injection.

use core::sync::atomic::{AtomicU32, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;

/// Longest echo we wait for, about 4.5 m.
pub const ECHO_TIMEOUT_US: u32 = 26_000;

/// Round-trip microseconds per centimetre of distance.
pub const US_PER_CM: f32 = 58.0;

const SIM_TIMEOUT: u32 = u32::MAX;
/// Simulated distance in hundredths of a cm; `SIM_TIMEOUT` = no echo.
static SIM_DISTANCE_CENTI_CM: AtomicU32 = AtomicU32::new(3000);

/// Inject a distance (`None` simulates an echo timeout).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_distance_cm(cm: Option<f32>) {
    let raw = cm.map_or(SIM_TIMEOUT, |cm| (cm.max(0.0) * 100.0) as u32);
    SIM_DISTANCE_CENTI_CM.store(raw, Ordering::Relaxed);
}

/// Convert an echo pulse width to centimetres.
pub fn echo_to_cm(echo_us: u32) -> f32 {
    echo_us as f32 / US_PER_CM
}

pub struct Ultrasonic {
    _trig_gpio: i32,
    _echo_gpio: i32,
}

impl Ultrasonic {
    pub fn new(trig_gpio: i32, echo_gpio: i32) -> Self {
        Self {
            _trig_gpio: trig_gpio,
            _echo_gpio: echo_gpio,
        }
    }

    /// Distance to the water surface, `None` if no echo came back.
    pub fn measure_cm(&mut self) -> Option<f32> {
        self.echo_us().map(echo_to_cm)
    }

    #[cfg(target_os = "espidf")]
    fn echo_us(&self) -> Option<u32> {
        hw_init::gpio_write(self._trig_gpio, false);
        hw_init::delay_us(2);
        hw_init::gpio_write(self._trig_gpio, true);
        hw_init::delay_us(10);
        hw_init::gpio_write(self._trig_gpio, false);

        hw_init::wait_for_level(self._echo_gpio, true, ECHO_TIMEOUT_US)?;
        let width = hw_init::wait_for_level(self._echo_gpio, false, ECHO_TIMEOUT_US)?;
        (width > 0).then_some(width)
    }

    #[cfg(not(target_os = "espidf"))]
    fn echo_us(&self) -> Option<u32> {
        let raw = SIM_DISTANCE_CENTI_CM.load(Ordering::Relaxed);
        if raw == SIM_TIMEOUT {
            return None;
        }
        Some((raw as f32 / 100.0 * US_PER_CM).round() as u32)
    }
}
