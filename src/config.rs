//! System configuration parameters
//!
//! All tunable parameters for the Vapor controller.
//! Values can be overridden by a JSON file on the SD card.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Capacity of the SMS recipient field (E.164 plus headroom).
pub const PHONE_NUMBER_CAP: usize = 24;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Messaging ---
    /// Recipient of alerts and status replies.  Empty disables sending.
    pub sms_number: heapless::String<PHONE_NUMBER_CAP>,
    /// Minimum time between two alerts of the same category (seconds)
    pub sms_cooldown_secs: u32,

    // --- Sprinkler policy ---
    /// Roof temperature (°C) at or above which the sprinkler may turn on
    pub on_roof_temp_c: f32,
    /// Roof humidity (%) at or below which the sprinkler may turn on
    pub on_roof_humidity_pct: f32,
    /// Indoor temperature (°C) at or below which the sprinkler turns off
    pub off_indoor_temp_c: f32,
    /// Indoor humidity (%) at or above which the sprinkler turns off
    pub off_indoor_humidity_pct: f32,

    // --- Water tank ---
    /// Level (0-100%) at or below which a refill alert is sent
    pub low_water_percent: f32,
    /// Rangefinder distance (cm) when the tank is empty
    pub tank_empty_distance_cm: f32,
    /// Rangefinder distance (cm) when the tank is full
    pub tank_full_distance_cm: f32,

    // --- Timing ---
    /// Sensor sampling interval (milliseconds)
    pub sensor_read_interval_ms: u32,
    /// Display page rotation and journal interval (milliseconds)
    pub display_interval_ms: u32,
    /// How long a command banner stays on the LCD (milliseconds, shorter
    /// than `display_interval_ms`)
    pub banner_hold_ms: u32,
    /// Modem clock re-sync interval (seconds, 0 = boot only)
    pub clock_resync_interval_secs: u32,
    /// Retry interval while the clock has never synced (seconds, must be > 0)
    pub clock_retry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Messaging
            sms_number: heapless::String::new(),
            sms_cooldown_secs: 300, // 5 min

            // Policy
            on_roof_temp_c: 30.0,
            on_roof_humidity_pct: 60.0,
            off_indoor_temp_c: 30.0,
            off_indoor_humidity_pct: 70.0,

            // Tank (HC-SR04 mounted above the water line)
            low_water_percent: 20.0,
            tank_empty_distance_cm: 45.0,
            tank_full_distance_cm: 20.0,

            // Timing
            sensor_read_interval_ms: 1000, // 1 Hz
            display_interval_ms: 5000,
            banner_hold_ms: 3000,
            clock_resync_interval_secs: 6 * 3600,
            clock_retry_interval_secs: 60,
        }
    }
}

impl SystemConfig {
    /// Reject values that would make the controller misbehave.
    ///
    /// Values are never clamped: a bad file is refused as a whole and the
    /// caller falls back to defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            self.on_roof_temp_c,
            self.on_roof_humidity_pct,
            self.off_indoor_temp_c,
            self.off_indoor_humidity_pct,
            self.low_water_percent,
            self.tank_empty_distance_cm,
            self.tank_full_distance_cm,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::ValidationFailed("non-finite threshold"));
        }
        let pct = 0.0..=100.0;
        if !pct.contains(&self.on_roof_humidity_pct) || !pct.contains(&self.off_indoor_humidity_pct) {
            return Err(ConfigError::ValidationFailed("humidity threshold outside 0-100%"));
        }
        if !pct.contains(&self.low_water_percent) {
            return Err(ConfigError::ValidationFailed("low water threshold outside 0-100%"));
        }
        if self.tank_full_distance_cm <= 0.0
            || self.tank_empty_distance_cm <= self.tank_full_distance_cm
        {
            return Err(ConfigError::ValidationFailed(
                "tank empty distance must exceed full distance",
            ));
        }
        if self.sensor_read_interval_ms == 0 || self.display_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("zero timing interval"));
        }
        if self.banner_hold_ms >= self.display_interval_ms {
            return Err(ConfigError::ValidationFailed(
                "banner hold must be shorter than the display interval",
            ));
        }
        if self.clock_retry_interval_secs == 0 {
            return Err(ConfigError::ValidationFailed("zero clock retry interval"));
        }
        if self.sms_cooldown_secs == 0 {
            return Err(ConfigError::ValidationFailed("zero SMS cooldown"));
        }
        if !self
            .sms_number
            .chars()
            .all(|c| c.is_ascii_digit() || c == '+')
        {
            return Err(ConfigError::ValidationFailed("SMS number must be digits"));
        }
        Ok(())
    }
}
