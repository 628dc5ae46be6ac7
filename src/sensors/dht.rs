//! DHT11 temperature / humidity sensor (single-wire, bit-banged).
//!
//! One frame is 40 bits: humidity integer and tenths, temperature integer
//! and tenths (bit 7 of the tenths byte is the sign), then an 8-bit sum of
//! the first four bytes.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the open-drain data line via hw_init helpers inside
//! an interrupt-free section.
//! On host/test: reads per-site values from static atomics for injection.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorFault;

/// Where a probe is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    Roof,
    Indoor,
}

// Simulated (temperature, humidity) as f32 bits, one pair per site.
static SIM_ROOF: [AtomicU32; 2] = [AtomicU32::new(0x41C8_0000), AtomicU32::new(0x4248_0000)];
static SIM_INDOOR: [AtomicU32; 2] = [AtomicU32::new(0x41C8_0000), AtomicU32::new(0x4248_0000)];
static SIM_FAULT: AtomicBool = AtomicBool::new(false);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_climate(site: Site, temp_c: f32, humidity_pct: f32) {
    let slot = match site {
        Site::Roof => &SIM_ROOF,
        Site::Indoor => &SIM_INDOOR,
    };
    slot[0].store(temp_c.to_bits(), Ordering::Relaxed);
    slot[1].store(humidity_pct.to_bits(), Ordering::Relaxed);
}

/// Make every simulated probe fail (`true`) or recover (`false`).
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_fault(fault: bool) {
    SIM_FAULT.store(fault, Ordering::Relaxed);
}

/// Decode a raw frame into `(temperature °C, humidity %)`.
/// `None` if the checksum does not match.
pub fn decode_dht11(frame: [u8; 5]) -> Option<(f32, f32)> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return None;
    }
    let humidity = f32::from(frame[0]) + f32::from(frame[1]) * 0.1;
    let mut temp = f32::from(frame[2]) + f32::from(frame[3] & 0x7F) * 0.1;
    if frame[3] & 0x80 != 0 {
        temp = -temp;
    }
    Some((temp, humidity))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DhtReading {
    pub temp_c: f32,
    pub humidity_pct: f32,
}

pub struct DhtSensor {
    site: Site,
    _gpio: i32,
}

impl DhtSensor {
    pub fn new(site: Site, gpio: i32) -> Self {
        Self { site, _gpio: gpio }
    }

    /// One measurement.  Fails on timeout or checksum mismatch.
    pub fn read(&mut self) -> Result<DhtReading, SensorFault> {
        let (temp_c, humidity_pct) = self.read_frame().ok_or(SensorFault)?;
        Ok(DhtReading { temp_c, humidity_pct })
    }

    #[cfg(target_os = "espidf")]
    fn read_frame(&self) -> Option<(f32, f32)> {
        let pin = self._gpio;

        // Start signal: hold low ≥18 ms, then release.
        hw_init::gpio_write(pin, false);
        hw_init::delay_us(18_000);
        hw_init::gpio_write(pin, true);

        let frame = esp_idf_hal::interrupt::free(|| {
            hw_init::delay_us(30);
            // Response: 80 µs low, 80 µs high.
            hw_init::wait_for_level(pin, false, 100)?;
            hw_init::wait_for_level(pin, true, 100)?;
            hw_init::wait_for_level(pin, false, 100)?;

            let mut frame = [0u8; 5];
            for bit in 0..40 {
                hw_init::wait_for_level(pin, true, 80)?;
                // 26-28 µs high = 0, 70 µs high = 1.
                let high = hw_init::wait_for_level(pin, false, 100)?;
                if high > 40 {
                    frame[bit / 8] |= 0x80 >> (bit % 8);
                }
            }
            Some(frame)
        })?;

        decode_dht11(frame)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_frame(&self) -> Option<(f32, f32)> {
        if SIM_FAULT.load(Ordering::Relaxed) {
            return None;
        }
        let slot = match self.site {
            Site::Roof => &SIM_ROOF,
            Site::Indoor => &SIM_INDOOR,
        };
        Some((
            f32::from_bits(slot[0].load(Ordering::Relaxed)),
            f32::from_bits(slot[1].load(Ordering::Relaxed)),
        ))
    }
}
