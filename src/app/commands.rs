//! Inbound commands to the control loop.
//!
//! Operators text the controller; the modem adapter hands the message body
//! to [`AppCommand::from_sms`].  Commands are queued and applied by the
//! [`ControlLoop`](super::service::ControlLoop) on its own turn, never from
//! the receive path.

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// `VAPOR ON`: force the sprinkler on and hold it there.
    SprinklerOn,

    /// `VAPOR OFF`: switch the sprinkler off and hand control back to AUTO.
    SprinklerOff,

    /// `VAPOR STATUS`: reply with the current readings.
    Status,
}

impl AppCommand {
    /// Match an SMS body against the known keywords.
    ///
    /// Case-insensitive substring search over the whole body, so carrier
    /// prefixes or signatures around the keyword do not matter.  `ON` is
    /// checked first, as the keywords do not overlap.
    pub fn from_sms(body: &str) -> Option<Self> {
        let body = body.to_ascii_uppercase();
        if body.contains("VAPOR ON") {
            Some(Self::SprinklerOn)
        } else if body.contains("VAPOR OFF") {
            Some(Self::SprinklerOff)
        } else if body.contains("VAPOR STATUS") {
            Some(Self::Status)
        } else {
            None
        }
    }
}
