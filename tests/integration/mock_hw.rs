//! Mock adapters for integration tests.
//!
//! Record every outbound call so tests can assert on the full history
//! without touching real GPIO, UART or SD registers.

use std::collections::VecDeque;

use vapor::app::events::AppEvent;
use vapor::app::ports::{
    DisplayPort, DistancePort, EventSink, LogPort, MessagingPort, RelayPort, SensorPort,
    TimeSourcePort,
};
use vapor::app::reading::{DisplayMode, SensorReading};
use vapor::config::SystemConfig;
use vapor::control::irrigation::SprinklerState;
use vapor::error::{IoError, SendError};

pub const RECIPIENT: &str = "+15550001111";

/// Defaults plus a recipient, so alerts actually go out.
pub fn test_config() -> SystemConfig {
    let mut cfg = SystemConfig::default();
    cfg.sms_number.push_str(RECIPIENT).unwrap();
    cfg
}

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Page(DisplayMode, SensorReading, SprinklerState),
    Banner(String),
}

pub struct MockHardware {
    /// Returned by every `read()`.
    pub climate: SensorReading,
    /// Returned by every `measure()`.
    pub distance: Option<f32>,
    pub relay: Vec<bool>,
    pub screens: Vec<Screen>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            climate: SensorReading::invalid(),
            distance: Some(30.0),
            relay: Vec::new(),
            screens: Vec::new(),
        }
    }

    /// Indoor temp/humidity, roof temp/humidity.
    pub fn set_climate(&mut self, it: f32, ih: f32, rt: f32, rh: f32) {
        self.climate = SensorReading::new(it, ih, rt, rh);
    }

    pub fn relay_on(&self) -> bool {
        self.relay.last().copied().unwrap_or(false)
    }

    pub fn banners(&self) -> Vec<&str> {
        self.screens
            .iter()
            .filter_map(|s| match s {
                Screen::Banner(b) => Some(b.as_str()),
                Screen::Page(..) => None,
            })
            .collect()
    }

    pub fn last_page(&self) -> Option<DisplayMode> {
        self.screens.iter().rev().find_map(|s| match s {
            Screen::Page(mode, ..) => Some(*mode),
            Screen::Banner(_) => None,
        })
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read(&mut self) -> SensorReading {
        self.climate
    }
}

impl DistancePort for MockHardware {
    fn measure(&mut self) -> Option<f32> {
        self.distance
    }
}

impl RelayPort for MockHardware {
    fn set(&mut self, active: bool) {
        self.relay.push(active);
    }
}

impl DisplayPort for MockHardware {
    fn show(&mut self, mode: DisplayMode, reading: &SensorReading, sprinkler: SprinklerState) {
        self.screens.push(Screen::Page(mode, *reading, sprinkler));
    }

    fn banner(&mut self, text: &str) {
        self.screens.push(Screen::Banner(text.to_string()));
    }
}

// ── MockModem ─────────────────────────────────────────────────

pub struct MockModem {
    pub sent: Vec<(String, String)>,
    pub inbox: VecDeque<String>,
    pub send_error: Option<SendError>,
    pub time_reply: Option<String>,
    pub time_queries: usize,
}

#[allow(dead_code)]
impl MockModem {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            inbox: VecDeque::new(),
            send_error: None,
            time_reply: Some("AT+CCLK?\r\n+CCLK: \"25/10/21,18:52:24+32\"\r\n\r\nOK\r\n".into()),
            time_queries: 0,
        }
    }

    pub fn receive(&mut self, body: &str) {
        self.inbox.push_back(body.to_string());
    }

    pub fn bodies(&self) -> Vec<&str> {
        self.sent.iter().map(|(_, b)| b.as_str()).collect()
    }
}

impl Default for MockModem {
    fn default() -> Self {
        Self::new()
    }
}

impl MessagingPort for MockModem {
    fn send(&mut self, number: &str, body: &str) -> Result<(), SendError> {
        if let Some(e) = self.send_error {
            return Err(e);
        }
        self.sent.push((number.to_string(), body.to_string()));
        Ok(())
    }

    fn poll_incoming(&mut self) -> Option<String> {
        self.inbox.pop_front()
    }
}

impl TimeSourcePort for MockModem {
    fn network_time(&mut self) -> Option<String> {
        self.time_queries += 1;
        self.time_reply.clone()
    }
}

// ── MockJournal ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockJournal {
    pub lines: Vec<String>,
    pub fail: Option<IoError>,
}

impl LogPort for MockJournal {
    fn append(&mut self, line: &str) -> Result<(), IoError> {
        if let Some(e) = self.fail {
            return Err(e);
        }
        self.lines.push(line.to_string());
        Ok(())
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
