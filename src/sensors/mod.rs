//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns both DHT11 probes and the tank rangefinder, and produces a
//! [`SensorReading`] each sample that the control loop completes with the
//! tank level.

pub mod dht;
pub mod ultrasonic;

use log::warn;

use crate::app::reading::SensorReading;
use dht::{DhtSensor, Site};
use ultrasonic::Ultrasonic;

/// Aggregates all sensor drivers.
pub struct SensorHub {
    pub roof: DhtSensor,
    pub indoor: DhtSensor,
    pub range: Ultrasonic,
}

impl SensorHub {
    /// Construct a new hub.  Pass in pre-built drivers (built in main
    /// where peripheral ownership is established).
    pub fn new(roof: DhtSensor, indoor: DhtSensor, range: Ultrasonic) -> Self {
        Self { roof, indoor, range }
    }

    /// Read both climate probes.
    ///
    /// If either probe fails, the whole sample is flagged invalid; the
    /// control loop then keeps its last good values.
    pub fn read_climate(&mut self) -> SensorReading {
        let roof = self.roof.read();
        let indoor = self.indoor.read();
        match (indoor, roof) {
            (Ok(i), Ok(r)) => {
                SensorReading::new(i.temp_c, i.humidity_pct, r.temp_c, r.humidity_pct)
            }
            (i, r) => {
                if let Err(e) = i {
                    warn!("DHT {:?}: {}", Site::Indoor, e);
                }
                if let Err(e) = r {
                    warn!("DHT {:?}: {}", Site::Roof, e);
                }
                SensorReading::invalid()
            }
        }
    }

    /// Tank distance in cm, `None` on echo timeout.
    pub fn measure_distance(&mut self) -> Option<f32> {
        self.range.measure_cm()
    }
}
