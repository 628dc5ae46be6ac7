//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, relay, LCD, modem, SD card) implement these
//! traits.  The [`ControlLoop`](super::service::ControlLoop) consumes them
//! via generics, so the domain core never touches hardware directly.
//!
//! Every call here is synchronous.  A slow modem round-trip stalls the
//! whole loop for its duration, which is the intended execution model.

use crate::config::SystemConfig;
use crate::control::irrigation::SprinklerState;
use crate::error::{IoError, SendError};

use super::reading::{DisplayMode, SensorReading};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Temperature / humidity for both DHT11 probes.
pub trait SensorPort {
    /// Sample indoor and roof climate.  On a transducer fault the reading
    /// comes back with `valid == false`.  The water level is filled in by
    /// the control loop from [`DistancePort`].
    fn read(&mut self) -> SensorReading;
}

/// Ultrasonic rangefinder above the tank.
pub trait DistancePort {
    /// Distance to the water surface in centimetres, `None` on echo timeout.
    fn measure(&mut self) -> Option<f32>;
}

// ───────────────────────────────────────────────────────────────
// Actuator / display ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Sprinkler relay.  Takes the logical state; wiring polarity is the
/// adapter's concern.
pub trait RelayPort {
    fn set(&mut self, active: bool);
}

/// 16×2 character LCD.
pub trait DisplayPort {
    /// Render one page of the rotation.
    fn show(&mut self, mode: DisplayMode, reading: &SensorReading, sprinkler: SprinklerState);

    /// Replace the page with a one-line notice (e.g. `SPRINKLER: ON`).
    fn banner(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Messaging ports (driven adapter: domain ↔ GSM modem)
// ───────────────────────────────────────────────────────────────

/// SMS transport.
pub trait MessagingPort {
    /// Deliver `body` to `number`.  Blocks until the modem answers or
    /// its timeout runs out.
    fn send(&mut self, number: &str, body: &str) -> Result<(), SendError>;

    /// Body of the next received SMS, if one has arrived.
    fn poll_incoming(&mut self) -> Option<String>;
}

/// Network time source.
pub trait TimeSourcePort {
    /// Raw response to a clock query (e.g. `+CCLK: "25/10/21,18:52:24+32"`),
    /// `None` if the modem did not answer.
    fn network_time(&mut self) -> Option<String>;
}

// ───────────────────────────────────────────────────────────────
// Journal port (driven adapter: domain → SD card)
// ───────────────────────────────────────────────────────────────

/// Append-only text log.
pub trait LogPort {
    fn append(&mut self, line: &str) -> Result<(), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate config values before persisting and
/// reject invalid ranges with [`ConfigError::ValidationFailed`] rather
/// than clamping them.
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`SystemConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
