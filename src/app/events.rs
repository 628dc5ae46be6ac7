//! Outbound application events.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log to serial today, perhaps a
//! status page later.

use crate::clock::ClockState;
use crate::error::{IoError, ParseError, SendError};

use super::alerts::AlertKind;
use super::commands::AppCommand;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The loop has started; carries whether the clock synced at boot.
    Started { clock_synced: bool },

    /// The relay was switched.
    SprinklerChanged { active: bool, manual: bool },

    /// An SMS went out.
    AlertSent(AlertKind),

    /// An SMS could not be delivered.  The cooldown is armed regardless.
    AlertFailed { kind: AlertKind, error: SendError },

    /// An operator command was applied.
    CommandApplied(AppCommand),

    /// The command queue was full and a command was dropped.
    CommandDropped(AppCommand),

    /// The DHT sensors failed; last-known values are retained.
    SensorFault,

    /// The rangefinder timed out; last-known level is retained.
    DistanceTimeout,

    /// The modem clock was adopted.
    ClockSynced(ClockState),

    /// The modem returned no usable time.
    ClockSyncFailed(Option<ParseError>),

    /// A journal line could not be appended.
    JournalFailed(IoError),
}
