//! One-shot hardware peripheral initialization and raw GPIO helpers.
//!
//! The DHT11 and HC-SR04 are bit-banged, so they need direct register
//! access and microsecond timing rather than a HAL driver.  Pins are
//! configured here once from `main()`; the sensor drivers then use the
//! helpers below.  On host builds every helper is an inert stub.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        configure(
            1u64 << pins::ULTRASONIC_TRIG_GPIO,
            gpio_mode_t_GPIO_MODE_OUTPUT,
            false,
        )?;
        configure(
            1u64 << pins::ULTRASONIC_ECHO_GPIO,
            gpio_mode_t_GPIO_MODE_INPUT,
            false,
        )?;
        // DHT11 data lines idle high through the pull-up; writing 1 releases.
        configure(
            (1u64 << pins::DHT_ROOF_GPIO) | (1u64 << pins::DHT_INDOOR_GPIO),
            gpio_mode_t_GPIO_MODE_INPUT_OUTPUT_OD,
            true,
        )?;
        gpio_set_level(pins::ULTRASONIC_TRIG_GPIO, 0);
        gpio_set_level(pins::DHT_ROOF_GPIO, 1);
        gpio_set_level(pins::DHT_INDOOR_GPIO, 1);
    }
    info!("hw_init: rangefinder and DHT lines configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

#[cfg(target_os = "espidf")]
unsafe fn configure(mask: u64, mode: gpio_mode_t, pull_up: bool) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: mask,
        mode,
        pull_up_en: if pull_up {
            gpio_pullup_t_GPIO_PULLUP_ENABLE
        } else {
            gpio_pullup_t_GPIO_PULLUP_DISABLE
        },
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

// ── GPIO ──────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: register read on a pin configured in init_peripherals().
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: register write on a pin configured in init_peripherals().
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Timing ────────────────────────────────────────────────────

/// Busy-wait for `us` microseconds.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: ROM busy loop, no shared state.
    unsafe { esp_rom_delay_us(us) }
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

/// Microseconds since boot.
#[cfg(target_os = "espidf")]
pub fn micros() -> u64 {
    // SAFETY: esp_timer_get_time is a monotonic counter read.
    (unsafe { esp_timer_get_time() }) as u64
}

#[cfg(not(target_os = "espidf"))]
pub fn micros() -> u64 {
    0
}

/// Spin until `pin` reads `level` or `timeout_us` passes.
/// Returns the microseconds waited, `None` on timeout.
#[cfg(target_os = "espidf")]
pub fn wait_for_level(pin: i32, level: bool, timeout_us: u32) -> Option<u32> {
    let start = micros();
    loop {
        let waited = (micros() - start) as u32;
        if gpio_read(pin) == level {
            return Some(waited);
        }
        if waited >= timeout_us {
            return None;
        }
    }
}
