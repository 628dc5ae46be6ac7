//! Per-tick sensor data and display paging.

/// One sample of every environmental sensor.
///
/// Produced by the [`SensorPort`](super::ports::SensorPort) and completed
/// with the tank level by the control loop.  The water level is kept
/// private so it can only be stored clamped to 0–100 %.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    /// Indoor (greenhouse) air temperature (°C).
    pub indoor_temp_c: f32,
    /// Indoor relative humidity (%).
    pub indoor_humidity_pct: f32,
    /// Roof air temperature (°C).
    pub roof_temp_c: f32,
    /// Roof relative humidity (%).
    pub roof_humidity_pct: f32,
    water_level_pct: f32,
    /// False if any transducer failed during this sample.
    pub valid: bool,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            indoor_temp_c: 0.0,
            indoor_humidity_pct: 0.0,
            roof_temp_c: 0.0,
            roof_humidity_pct: 0.0,
            water_level_pct: 0.0,
            valid: false,
        }
    }
}

impl SensorReading {
    /// A valid climate sample.  The water level starts at 0 % until
    /// [`with_water_level`](Self::with_water_level) fills it in.
    pub fn new(indoor_temp_c: f32, indoor_humidity_pct: f32, roof_temp_c: f32, roof_humidity_pct: f32) -> Self {
        let valid = [indoor_temp_c, indoor_humidity_pct, roof_temp_c, roof_humidity_pct]
            .iter()
            .all(|v| v.is_finite());
        Self {
            indoor_temp_c,
            indoor_humidity_pct,
            roof_temp_c,
            roof_humidity_pct,
            water_level_pct: 0.0,
            valid,
        }
    }

    /// A sample where the transducers failed.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// Same sample with the tank level set (clamped to 0–100 %).
    #[must_use]
    pub fn with_water_level(mut self, pct: f32) -> Self {
        self.set_water_level(pct);
        self
    }

    pub fn set_water_level(&mut self, pct: f32) {
        self.water_level_pct = if pct.is_nan() { 0.0 } else { pct.clamp(0.0, 100.0) };
    }

    pub fn water_level_pct(&self) -> f32 {
        self.water_level_pct
    }

    /// Water level truncated toward zero, as shown to humans.
    pub fn water_level_whole(&self) -> u8 {
        self.water_level_pct as u8
    }
}

/// Linear map from rangefinder distance to tank fill, clamped to 0–100 %.
///
/// The sensor looks down at the water: `empty_cm` is the distance to the
/// bottom of an empty tank, `full_cm` the distance at the brim.
pub fn fill_percent(distance_cm: f32, empty_cm: f32, full_cm: f32) -> f32 {
    let span = empty_cm - full_cm;
    if span <= 0.0 || !distance_cm.is_finite() {
        return 0.0;
    }
    ((empty_cm - distance_cm) / span * 100.0).clamp(0.0, 100.0)
}

/// LCD page, rotated on a fixed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DisplayMode {
    #[default]
    RoofReading = 0,
    IndoorReading = 1,
    WaterLevel = 2,
}

impl DisplayMode {
    /// Number of pages in the rotation.
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        self as usize
    }

    /// The page after this one, wrapping back to the roof page.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::RoofReading => Self::IndoorReading,
            Self::IndoorReading => Self::WaterLevel,
            Self::WaterLevel => Self::RoofReading,
        }
    }
}
