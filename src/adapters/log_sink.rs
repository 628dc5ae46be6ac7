//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production).  Each line
//! starts with a subsystem tag so serial captures can be grepped.

use log::Level;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::{Error, SensorFault};

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

fn on_off(active: bool) -> &'static str {
    if active { "ON" } else { "OFF" }
}

/// Severity and text of the log line for `event`.
///
/// Failures are rendered through [`Error`] so every subsystem reads the
/// same way on the console.
pub fn describe(event: &AppEvent) -> (Level, String) {
    match event {
        AppEvent::Started { clock_synced } => {
            (Level::Info, format!("START | clock_synced={}", clock_synced))
        }
        AppEvent::SprinklerChanged { active, manual } => (
            Level::Info,
            format!(
                "SPRINKLER | {} ({})",
                on_off(*active),
                if *manual { "manual" } else { "auto" }
            ),
        ),
        AppEvent::AlertSent(kind) => (Level::Info, format!("ALERT | {:?} sent", kind)),
        AppEvent::AlertFailed { kind, error } => (
            Level::Warn,
            format!("ALERT | {:?} failed: {}", kind, Error::from(*error)),
        ),
        AppEvent::CommandApplied(cmd) => (Level::Info, format!("CMD | {:?} applied", cmd)),
        AppEvent::CommandDropped(cmd) => {
            (Level::Warn, format!("CMD | {:?} dropped, queue full", cmd))
        }
        AppEvent::SensorFault => (
            Level::Warn,
            format!("SENSOR | {}", Error::from(SensorFault)),
        ),
        AppEvent::DistanceTimeout => (Level::Warn, String::from("SENSOR | rangefinder timeout")),
        AppEvent::ClockSynced(state) => {
            (Level::Info, format!("CLOCK | synced {}", state.format_12h()))
        }
        AppEvent::ClockSyncFailed(Some(e)) => {
            (Level::Warn, format!("CLOCK | sync failed: {}", Error::from(*e)))
        }
        AppEvent::ClockSyncFailed(None) => {
            (Level::Warn, String::from("CLOCK | sync failed: no reply"))
        }
        AppEvent::JournalFailed(e) => (Level::Warn, format!("JOURNAL | {}", Error::from(*e))),
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        let (level, line) = describe(event);
        log::log!(level, "{}", line);
    }
}
