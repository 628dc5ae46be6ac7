//! Sprinkler hysteresis policy with operator override.
//!
//! ```text
//!              roof hot AND roof dry
//!   AUTO/OFF ─────────────────────────▶ AUTO/ON
//!       ▲                                  │
//!       └──── indoor cool OR indoor humid ─┘
//!
//!   set_manual(x) ──▶ MANUAL/x   (AUTO rules suspended)
//!   clear_manual() ──▶ AUTO, relay state kept until next evaluate
//! ```
//!
//! Turn-on looks at the roof sensor, turn-off at the indoor sensor.  Two
//! independent sensors with separate thresholds keep the relay from
//! short-cycling.  When both rules hold in the same sample, turn-on wins.
//!
//! The policy is purely logical: `active == true` means water flows.  The
//! active-low relay inversion belongs to [`RelayDriver`](crate::drivers::relay::RelayDriver).

use log::info;

use crate::app::reading::SensorReading;
use crate::config::SystemConfig;

/// Thresholds for the automatic rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub on_roof_temp_c: f32,
    pub on_roof_humidity_pct: f32,
    pub off_indoor_temp_c: f32,
    pub off_indoor_humidity_pct: f32,
}

impl Thresholds {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            on_roof_temp_c: config.on_roof_temp_c,
            on_roof_humidity_pct: config.on_roof_humidity_pct,
            off_indoor_temp_c: config.off_indoor_temp_c,
            off_indoor_humidity_pct: config.off_indoor_humidity_pct,
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::from_config(&SystemConfig::default())
    }
}

/// Relay state as seen by the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SprinklerState {
    /// Water is (logically) flowing.
    pub active: bool,
    /// An operator command is holding the relay; AUTO rules are suspended.
    pub manual_override: bool,
}

/// Result of one [`IrrigationPolicy::evaluate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub active: bool,
    /// Only flip the relay and notify when this is set.
    pub changed: bool,
}

#[derive(Debug, Clone)]
pub struct IrrigationPolicy {
    thresholds: Thresholds,
    state: SprinklerState,
}

impl IrrigationPolicy {
    /// Start in AUTO with the sprinkler off.
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            state: SprinklerState::default(),
        }
    }

    pub fn state(&self) -> SprinklerState {
        self.state
    }

    /// The AUTO turn-on rule: roof hot and dry.
    pub fn should_engage(&self, reading: &SensorReading) -> bool {
        reading.valid
            && reading.roof_temp_c >= self.thresholds.on_roof_temp_c
            && reading.roof_humidity_pct <= self.thresholds.on_roof_humidity_pct
    }

    /// The AUTO turn-off rule: greenhouse cooled down or humid enough.
    pub fn should_release(&self, reading: &SensorReading) -> bool {
        reading.valid
            && (reading.indoor_temp_c <= self.thresholds.off_indoor_temp_c
                || reading.indoor_humidity_pct >= self.thresholds.off_indoor_humidity_pct)
    }

    /// Apply the AUTO rules to `reading`.
    ///
    /// Under manual override, or for an invalid sample, the state is left
    /// untouched and `changed` is false.
    pub fn evaluate(&mut self, reading: &SensorReading) -> Decision {
        if self.state.manual_override || !reading.valid {
            return self.unchanged();
        }
        let next = if self.should_engage(reading) {
            true
        } else if self.should_release(reading) {
            false
        } else {
            self.state.active
        };
        self.switch(next)
    }

    /// Operator command: hold the sprinkler at `active` and suspend AUTO.
    pub fn set_manual(&mut self, active: bool) -> Decision {
        self.state.manual_override = true;
        info!("Sprinkler manual override: {}", if active { "ON" } else { "OFF" });
        self.switch(active)
    }

    /// Hand control back to the AUTO rules.  The relay keeps its current
    /// state; the next [`evaluate`](Self::evaluate) decides from scratch.
    pub fn clear_manual(&mut self) {
        if self.state.manual_override {
            info!("Sprinkler manual override released");
        }
        self.state.manual_override = false;
    }

    fn switch(&mut self, active: bool) -> Decision {
        let changed = self.state.active != active;
        self.state.active = active;
        Decision { active, changed }
    }

    fn unchanged(&self) -> Decision {
        Decision {
            active: self.state.active,
            changed: false,
        }
    }
}

impl Default for IrrigationPolicy {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
