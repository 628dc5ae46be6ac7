//! Unified error types for the Vapor firmware.
//!
//! Every subsystem has a small `Copy` error enum; all of them convert into
//! the top-level [`Error`], which is how they are rendered in the event
//! log and at boot.  None of these are fatal: the loop logs them, degrades the
//! current tick and carries on.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The modem time string could not be parsed.
    Clock(ParseError),
    /// An SMS could not be delivered.
    Send(SendError),
    /// The SD journal could not be written.
    Io(IoError),
    /// A temperature/humidity transducer returned garbage.
    Sensor(SensorFault),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clock(e) => write!(f, "clock: {e}"),
            Self::Send(e) => write!(f, "sms: {e}"),
            Self::Io(e) => write!(f, "journal: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than 17 significant characters (`YY/MM/DD,HH:MM:SS`).
    TooShort,
    /// A field is non-numeric or outside its calendar range.
    OutOfRange,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "timestamp too short"),
            Self::OutOfRange => write!(f, "timestamp field out of range"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Clock(e)
    }
}

// ---------------------------------------------------------------------------
// Messaging errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    /// The modem never acknowledged the message within its window.
    Timeout,
    /// The serial link or the network refused the message.
    TransportUnavailable,
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "modem timed out"),
            Self::TransportUnavailable => write!(f, "transport unavailable"),
        }
    }
}

impl From<SendError> for Error {
    fn from(e: SendError) -> Self {
        Self::Send(e)
    }
}

// ---------------------------------------------------------------------------
// Journal I/O errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// The card (or the log directory) is not mounted.
    NotFound,
    /// The file exists but the write did not complete.
    WriteFailed,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "log file not found"),
            Self::WriteFailed => write!(f, "log write failed"),
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// A temperature/humidity read failed (timeout, checksum, NaN).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault;

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DHT read failed")
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}
