//! Task Watchdog Timer (TWDT) driver.
//!
//! Resets the board if the control loop stops feeding it.  The timeout
//! must cover the slowest blocking modem exchange (an SMS send can hold
//! the loop for several seconds).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::{info, warn};

/// Default TWDT timeout.
pub const WATCHDOG_TIMEOUT_MS: u32 = 30_000;

pub struct Watchdog {
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(WATCHDOG_TIMEOUT_MS)
    }
}

impl Watchdog {
    /// Configure the TWDT and subscribe the current task.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: TWDT API calls from the main task during startup.
            unsafe {
                let cfg = esp_task_wdt_config_t {
                    timeout_ms,
                    idle_core_mask: 0,
                    trigger_panic: true,
                };
                let ret = esp_task_wdt_reconfigure(&cfg);
                if ret != ESP_OK {
                    warn!("TWDT reconfigure returned {} (may already be configured)", ret);
                }

                let ret = esp_task_wdt_add(core::ptr::null_mut());
                let subscribed = ret == ESP_OK;
                if subscribed {
                    info!("Watchdog: subscribed ({}ms timeout)", timeout_ms);
                } else {
                    warn!("Watchdog: failed to subscribe ({})", ret);
                }
                Self { subscribed }
            }
        }

        #[cfg(not(target_os = "espidf"))]
        {
            log::info!("Watchdog(sim): no-op ({}ms)", timeout_ms);
            Self {}
        }
    }

    /// Feed the watchdog once per loop iteration.
    pub fn feed(&self) {
        #[cfg(target_os = "espidf")]
        {
            if self.subscribed {
                // SAFETY: resets the current task's TWDT entry.
                unsafe {
                    esp_task_wdt_reset();
                }
            }
        }
    }
}
