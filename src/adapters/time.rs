//! ESP32 time adapter.
//!
//! Monotonic milliseconds since boot, the timebase of the control loop.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()`.
//! - **`not(target_os = "espidf")`**: uses `std::time::Instant` for
//!   host-side simulation.

use crate::clock::Timestamp;

pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> Timestamp {
        // SAFETY: esp_timer_get_time is a monotonic counter read.
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> Timestamp {
        self.start.elapsed().as_millis() as u64
    }
}
