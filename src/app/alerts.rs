//! SMS and journal text.
//!
//! Fixed templates, no localisation.  Temperatures and humidities are
//! printed with two decimals, the tank level truncated to a whole percent.
//! Output depends only on the arguments, so the strings can be compared
//! byte-for-byte in tests and by the log tooling.

use core::fmt::Write;

use crate::control::irrigation::SprinklerState;

use super::reading::SensorReading;

/// Which message to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Sprinkler engaged because the roof is hot and dry.
    ThresholdAlert,
    /// Tank at or below the refill threshold.
    LowWater,
    /// Reply to a `VAPOR STATUS` request.
    StatusQuery,
}

fn on_off(active: bool) -> &'static str {
    if active { "ON" } else { "OFF" }
}

/// Build the SMS body for `kind`.
pub fn compose(kind: AlertKind, reading: &SensorReading, sprinkler: SprinklerState) -> String {
    match kind {
        AlertKind::ThresholdAlert | AlertKind::StatusQuery => {
            let mut msg = String::from("[VAPOR SYSTEM ALERT]\n\n");
            let _ = writeln!(
                msg,
                "Roof: {:.2} C | {:.2}% RH",
                reading.roof_temp_c, reading.roof_humidity_pct
            );
            let _ = writeln!(
                msg,
                "Indoor: {:.2} C | {:.2}% RH",
                reading.indoor_temp_c, reading.indoor_humidity_pct
            );
            let _ = writeln!(msg, "Water Level: {}%", reading.water_level_whole());
            let _ = write!(msg, "Status: SPRINKLER {}", on_off(sprinkler.active));
            msg
        }
        AlertKind::LowWater => format!(
            "[WATER TANK STATUS]\n\nWater level is LOW ({}%). Please refill soon.",
            reading.water_level_whole()
        ),
    }
}

/// One journal line, prefixed with the clock timestamp.
///
/// `[MM/DD/YYYY, HH:MM:SS] Indoor: T C, H% | Roof: T C, H% | Water: N% | Sprinkler: ON|OFF`
pub fn journal_line(timestamp: &str, reading: &SensorReading, sprinkler: SprinklerState) -> String {
    format!(
        "[{}] Indoor: {:.2} C, {:.2}% | Roof: {:.2} C, {:.2}% | Water: {}% | Sprinkler: {}",
        timestamp,
        reading.indoor_temp_c,
        reading.indoor_humidity_pct,
        reading.roof_temp_c,
        reading.roof_humidity_pct,
        reading.water_level_whole(),
        on_off(sprinkler.active),
    )
}
