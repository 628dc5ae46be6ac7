//! Free-running software real-time clock.
//!
//! The modem reports network time (`AT+CCLK?`) as `YY/MM/DD,HH:MM:SS+TZ`.
//! That string seeds a [`ClockState`]; afterwards the [`Clock`] is advanced
//! purely by locally measured elapsed time and re-synced every few hours.
//!
//! ```text
//!  "+CCLK: \"25/10/21,18:52:24+32\""
//!        │ extract_cclk
//!        ▼
//!  ClockState::parse ──▶ Clock::sync ──▶ Clock::advance(elapsed) ...
//! ```
//!
//! The clock is best-effort: it is never calibrated and drifts with the
//! crystal between syncs.

use core::fmt;
use core::time::Duration;

use crate::error::ParseError;

/// Milliseconds since boot, as reported by the monotonic system timer.
pub type Timestamp = u64;

/// Rendered by [`Clock::format`] while no modem time has been accepted.
pub const UNSET_TIMESTAMP: &str = "--/--/----, --:--:--";

/// Number of significant characters in `YY/MM/DD,HH:MM:SS`.
const CCLK_LEN: usize = 17;

const CCLK_PREFIX: &str = "+CCLK: \"";

/// Gregorian leap-year rule.
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in `month` (1–12) of `year`.
pub const fn days_in_month(month: u8, year: u16) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 30,
    }
}

/// Pull the quoted timestamp out of a raw `AT+CCLK?` response.
///
/// Returns `None` if the `+CCLK: "` marker or the closing quote is missing.
pub fn extract_cclk(response: &str) -> Option<&str> {
    let start = response.find(CCLK_PREFIX)? + CCLK_PREFIX.len();
    let len = response[start..].find('"')?;
    Some(&response[start..start + len])
}

// ---------------------------------------------------------------------------
// ClockState
// ---------------------------------------------------------------------------

/// A calendar date and time of day.  Always valid by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockState {
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl ClockState {
    /// Build a state from explicit fields, range-checking each one.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, ParseError> {
        let in_range = (1..=12).contains(&month)
            && day >= 1
            && day <= days_in_month(month, year)
            && hour < 24
            && minute < 60
            && second < 60;
        if !in_range {
            return Err(ParseError::OutOfRange);
        }
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Parse a modem timestamp of the shape `YY/MM/DD,HH:MM:SS`.
    ///
    /// Anything after the seconds field (the `+32` quarter-hour timezone
    /// offset) is ignored.  Years map to 2000 + YY.  A wrong separator is
    /// reported as `OutOfRange`.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let raw = raw.trim();
        if raw.len() < CCLK_LEN || !raw.is_char_boundary(CCLK_LEN) {
            return Err(ParseError::TooShort);
        }
        let separators_ok = [(2, b'/'), (5, b'/'), (8, b','), (11, b':'), (14, b':')]
            .iter()
            .all(|&(at, sep)| raw.as_bytes()[at] == sep);
        if !separators_ok {
            return Err(ParseError::OutOfRange);
        }
        let field = |at: usize| -> Result<u8, ParseError> {
            let digits = raw.get(at..at + 2).ok_or(ParseError::OutOfRange)?;
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseError::OutOfRange);
            }
            digits.parse().map_err(|_| ParseError::OutOfRange)
        };

        Self::new(
            2000 + u16::from(field(0)?),
            field(3)?,
            field(6)?,
            field(9)?,
            field(12)?,
            field(15)?,
        )
    }

    pub fn year(&self) -> u16 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    /// Move forward by `secs` whole seconds, rolling over the calendar.
    pub fn add_seconds(&mut self, secs: u64) {
        if secs == 0 {
            return;
        }
        let total_secs = u64::from(self.second) + secs;
        self.second = (total_secs % 60) as u8;

        let total_mins = u64::from(self.minute) + total_secs / 60;
        self.minute = (total_mins % 60) as u8;

        let total_hours = u64::from(self.hour) + total_mins / 60;
        self.hour = (total_hours % 24) as u8;

        let mut day = u64::from(self.day) + total_hours / 24;
        loop {
            let dim = u64::from(days_in_month(self.month, self.year));
            if day <= dim {
                break;
            }
            day -= dim;
            if self.month == 12 {
                self.month = 1;
                self.year = self.year.saturating_add(1);
            } else {
                self.month += 1;
            }
        }
        self.day = day as u8;
    }

    /// `MM/DD/YYYY, HH:MM:SS` (24-hour), used for journal timestamps.
    pub fn format(&self) -> String {
        self.to_string()
    }

    /// `MM/DD/YYYY, H:MM AM|PM`, used for human display.
    pub fn format_12h(&self) -> String {
        let suffix = if self.hour >= 12 { "PM" } else { "AM" };
        let hour12 = match self.hour % 12 {
            0 => 12,
            h => h,
        };
        format!(
            "{:02}/{:02}/{:04}, {}:{:02} {}",
            self.month, self.day, self.year, hour12, self.minute, suffix
        )
    }
}

impl fmt::Display for ClockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}/{:02}/{:04}, {:02}:{:02}:{:02}",
            self.month, self.day, self.year, self.hour, self.minute, self.second
        )
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// The running clock: an optional [`ClockState`] plus the sub-second
/// remainder that has not yet been folded into it.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    state: Option<ClockState>,
    pending_ms: u64,
    last_sync: Option<Timestamp>,
}

impl Clock {
    /// An uninitialized clock.  Advancing it is a no-op.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a parsed modem timestamp taken at `now`.
    ///
    /// On failure the previous state (if any) is left running.
    pub fn sync(&mut self, raw: &str, now: Timestamp) -> Result<ClockState, ParseError> {
        let parsed = ClockState::parse(raw)?;
        self.set(parsed, now);
        Ok(parsed)
    }

    /// Replace the running state wholesale.
    pub fn set(&mut self, state: ClockState, now: Timestamp) {
        self.state = Some(state);
        self.pending_ms = 0;
        self.last_sync = Some(now);
    }

    /// Fold `elapsed` into the clock.  Whole seconds are applied; the
    /// millisecond remainder is carried into the next call.
    pub fn advance(&mut self, elapsed: Duration) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let total_ms = self.pending_ms.saturating_add(elapsed.as_millis() as u64);
        state.add_seconds(total_ms / 1000);
        self.pending_ms = total_ms % 1000;
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn now(&self) -> Option<ClockState> {
        self.state
    }

    /// Boot-relative time of the last accepted sync.
    pub fn last_sync(&self) -> Option<Timestamp> {
        self.last_sync
    }

    /// 24-hour timestamp, or [`UNSET_TIMESTAMP`] before the first sync.
    pub fn format(&self) -> String {
        self.state
            .map_or_else(|| UNSET_TIMESTAMP.to_string(), |s| s.format())
    }

    /// 12-hour timestamp for display, `None` before the first sync.
    pub fn format_12h(&self) -> Option<String> {
        self.state.map(|s| s.format_12h())
    }
}
