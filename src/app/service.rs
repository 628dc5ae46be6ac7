//! Control loop: the hexagonal core.
//!
//! [`ControlLoop`] owns every piece of mutable controller state (clock,
//! sprinkler policy, cooldown gates, display page, last reading) in one
//! [`ControllerState`].  It exposes a clean, hardware-agnostic API.  All
//! I/O flows through port traits injected at call sites, making the whole
//! loop testable with mock adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ RelayPort
//! DistancePort ──▶│        ControlLoop        │ ──▶ DisplayPort
//!                 │ Clock · Policy · Cooldown │ ──▶ LogPort
//! MessagingPort ◀▶└──────────────────────────┘ ──▶ EventSink
//! ```
//!
//! Per tick, in order:
//!
//! 1. advance the clock by the elapsed time (re-sync from the modem when due);
//! 2. sample sensors once per sensor interval and run the policy;
//! 3. send threshold / low-water alerts their gates allow;
//! 4. queue and apply SMS commands;
//! 5. on the display interval, write a journal line and rotate the page.
//!
//! Nothing here is fatal: a failing port degrades the tick and the loop
//! carries on with last-known values.

use core::time::Duration;

use log::{debug, info, warn};

use crate::clock::{Clock, Timestamp, extract_cclk};
use crate::config::SystemConfig;
use crate::control::cooldown::{AlertCategory, CooldownGate};
use crate::control::irrigation::{IrrigationPolicy, SprinklerState, Thresholds};
use crate::error::SendError;

use super::alerts::{AlertKind, compose, journal_line};
use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    DisplayPort, DistancePort, EventSink, LogPort, MessagingPort, RelayPort, SensorPort,
    TimeSourcePort,
};
use super::reading::{DisplayMode, SensorReading, fill_percent};

/// Pending operator commands.  More than this per tick is a flood.
pub const COMMAND_QUEUE_CAP: usize = 4;

// ───────────────────────────────────────────────────────────────
// ControllerState
// ───────────────────────────────────────────────────────────────

/// Everything the controller remembers between ticks.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub clock: Clock,
    pub policy: IrrigationPolicy,
    pub threshold_gate: CooldownGate,
    pub low_water_gate: CooldownGate,
    pub display_mode: DisplayMode,
    /// Last good climate values; `valid` mirrors the latest sample.
    pub reading: SensorReading,
    /// The tank has been measured at least once.
    pub water_level_known: bool,
}

impl ControllerState {
    fn new(config: &SystemConfig) -> Self {
        Self {
            clock: Clock::new(),
            policy: IrrigationPolicy::new(Thresholds::from_config(config)),
            threshold_gate: CooldownGate::new(AlertCategory::Threshold),
            low_water_gate: CooldownGate::new(AlertCategory::LowWater),
            display_mode: DisplayMode::default(),
            reading: SensorReading::invalid(),
            water_level_known: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Timers {
    last_tick: Option<Timestamp>,
    last_sample: Option<Timestamp>,
    last_page: Timestamp,
    banner_until: Option<Timestamp>,
    next_clock_sync: Timestamp,
}

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

/// The control loop orchestrates all domain logic.
pub struct ControlLoop {
    config: SystemConfig,
    state: ControllerState,
    timers: Timers,
    commands: heapless::Deque<AppCommand, COMMAND_QUEUE_CAP>,
    tick_count: u64,
}

impl ControlLoop {
    /// Construct the loop from configuration.  Call [`start`](Self::start)
    /// before the first [`tick`](Self::tick) to sync the clock at boot.
    pub fn new(config: SystemConfig) -> Self {
        let state = ControllerState::new(&config);
        Self {
            config,
            state,
            timers: Timers::default(),
            commands: heapless::Deque::new(),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Take the boot-time clock reading and reset the interval timers.
    pub fn start(
        &mut self,
        now: Timestamp,
        time: &mut impl TimeSourcePort,
        sink: &mut impl EventSink,
    ) {
        self.timers.last_tick = Some(now);
        self.timers.last_page = now;
        self.sync_clock(now, time, sink);
        let clock_synced = self.state.clock.is_initialized();
        sink.emit(&AppEvent::Started { clock_synced });
        let local = self
            .state
            .clock
            .format_12h()
            .unwrap_or_else(|| self.state.clock.format());
        info!("ControlLoop started (clock {})", local);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle.
    ///
    /// `hw` satisfies all the board-side ports at once, which avoids
    /// juggling several mutable borrows of the same adapter.
    pub fn tick(
        &mut self,
        now: Timestamp,
        hw: &mut (impl SensorPort + DistancePort + RelayPort + DisplayPort),
        modem: &mut (impl MessagingPort + TimeSourcePort),
        journal: &mut impl LogPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;
        let mut redraw = false;

        // 1. Clock
        let elapsed = self.timers.last_tick.map_or(0, |t| now.saturating_sub(t));
        self.timers.last_tick = Some(now);
        self.state.clock.advance(Duration::from_millis(elapsed));
        if now >= self.timers.next_clock_sync {
            self.sync_clock(now, modem, sink);
        }
        self.state.threshold_gate.tick(now);
        self.state.low_water_gate.tick(now);

        // 2. Sensors → policy → relay
        if self.sample_due(now) {
            self.timers.last_sample = Some(now);
            self.sample(hw, sink);

            let decision = self.state.policy.evaluate(&self.state.reading);
            if decision.changed {
                self.apply_relay(hw, sink);
            }

            // 3. Gated alerts
            self.check_alerts(now, modem, sink);
            redraw = true;
        }

        // 4. Operator commands
        for _ in 0..COMMAND_QUEUE_CAP {
            let Some(body) = modem.poll_incoming() else {
                break;
            };
            match AppCommand::from_sms(&body) {
                Some(cmd) => {
                    self.enqueue(cmd, sink);
                }
                None => debug!("SMS ignored: {:?}", body),
            }
        }
        while let Some(cmd) = self.commands.pop_front() {
            self.handle_command(cmd, now, hw, modem, sink);
        }

        // 5. Journal + page rotation
        if now.saturating_sub(self.timers.last_page) >= u64::from(self.config.display_interval_ms) {
            self.timers.last_page = now;
            self.write_journal(journal, sink);
            self.state.display_mode = self.state.display_mode.next();
            redraw = true;
        }

        if let Some(until) = self.timers.banner_until {
            if now < until {
                return;
            }
            self.timers.banner_until = None;
            redraw = true;
        }
        if redraw {
            hw.show(self.state.display_mode, &self.state.reading, self.state.policy.state());
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Queue an operator command for the next [`tick`](Self::tick).
    /// Returns `false` if the queue is full and the command was dropped.
    pub fn enqueue(&mut self, cmd: AppCommand, sink: &mut impl EventSink) -> bool {
        if self.commands.push_back(cmd).is_err() {
            warn!("Command queue full, dropping {:?}", cmd);
            sink.emit(&AppEvent::CommandDropped(cmd));
            return false;
        }
        true
    }

    /// Apply an operator command immediately.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        now: Timestamp,
        hw: &mut (impl RelayPort + DisplayPort),
        modem: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) {
        info!("Command: {:?}", cmd);
        match cmd {
            AppCommand::SprinklerOn => {
                if self.state.policy.set_manual(true).changed {
                    self.apply_relay(hw, sink);
                }
                self.show_banner(hw, "SPRINKLER: ON", now);
            }
            AppCommand::SprinklerOff => {
                let decision = self.state.policy.set_manual(false);
                self.state.policy.clear_manual();
                if decision.changed {
                    self.apply_relay(hw, sink);
                }
                self.show_banner(hw, "SPRINKLER: OFF", now);
            }
            AppCommand::Status => {
                self.show_banner(hw, "Sending Status", now);
                self.notify(AlertKind::StatusQuery, modem, sink);
            }
        }
        sink.emit(&AppEvent::CommandApplied(cmd));
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn sprinkler(&self) -> SprinklerState {
        self.state.policy.state()
    }

    pub fn reading(&self) -> &SensorReading {
        &self.state.reading
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.state.display_mode
    }

    pub fn clock(&self) -> &Clock {
        &self.state.clock
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Commands waiting for the next tick.
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    // ── Internal ──────────────────────────────────────────────

    fn sample_due(&self, now: Timestamp) -> bool {
        self.timers.last_sample.is_none_or(|last| {
            now.saturating_sub(last) >= u64::from(self.config.sensor_read_interval_ms)
        })
    }

    /// Pull a fresh sample.  Failed transducers keep their last good value.
    fn sample(&mut self, hw: &mut (impl SensorPort + DistancePort), sink: &mut impl EventSink) {
        let level = match hw.measure() {
            Some(cm) => {
                self.state.water_level_known = true;
                fill_percent(
                    cm,
                    self.config.tank_empty_distance_cm,
                    self.config.tank_full_distance_cm,
                )
            }
            None => {
                warn!("Rangefinder timeout, keeping last water level");
                sink.emit(&AppEvent::DistanceTimeout);
                self.state.reading.water_level_pct()
            }
        };

        let fresh = hw.read();
        if fresh.valid {
            self.state.reading = fresh.with_water_level(level);
            debug!(
                "Indoor: {:.2} C, {:.2}% RH | Roof: {:.2} C, {:.2}% RH | Water: {:.1}%",
                fresh.indoor_temp_c,
                fresh.indoor_humidity_pct,
                fresh.roof_temp_c,
                fresh.roof_humidity_pct,
                level
            );
        } else {
            warn!("DHT read failed, keeping last climate values");
            sink.emit(&AppEvent::SensorFault);
            self.state.reading.valid = false;
            self.state.reading.set_water_level(level);
        }
    }

    fn check_alerts(
        &mut self,
        now: Timestamp,
        modem: &mut impl MessagingPort,
        sink: &mut impl EventSink,
    ) {
        let cooldown = Duration::from_secs(u64::from(self.config.sms_cooldown_secs));
        let reading = self.state.reading;

        let threshold_hit = !self.state.policy.state().manual_override
            && self.state.policy.should_engage(&reading);
        if threshold_hit {
            if let Some(left) = self.state.threshold_gate.remaining(now) {
                debug!("SMS cooldown: {}s left", left.as_secs());
            } else {
                self.state.threshold_gate.arm(now, cooldown);
                self.notify(AlertKind::ThresholdAlert, modem, sink);
            }
        }

        let water_low = self.state.water_level_known
            && reading.water_level_pct() <= self.config.low_water_percent;
        if water_low {
            if let Some(left) = self.state.low_water_gate.remaining(now) {
                debug!("Low water SMS cooldown: {}s left", left.as_secs());
            } else {
                self.state.low_water_gate.arm(now, cooldown);
                self.notify(AlertKind::LowWater, modem, sink);
            }
        }
    }

    /// Compose and send one SMS.  Failures are reported, never retried.
    fn notify(&self, kind: AlertKind, modem: &mut impl MessagingPort, sink: &mut impl EventSink) {
        let body = compose(kind, &self.state.reading, self.state.policy.state());
        let result = if self.config.sms_number.is_empty() {
            warn!("No SMS recipient configured");
            Err(SendError::TransportUnavailable)
        } else {
            modem.send(&self.config.sms_number, &body)
        };
        match result {
            Ok(()) => {
                info!("{:?} SMS sent", kind);
                sink.emit(&AppEvent::AlertSent(kind));
            }
            Err(error) => {
                warn!("{:?} SMS failed: {}", kind, error);
                sink.emit(&AppEvent::AlertFailed { kind, error });
            }
        }
    }

    fn apply_relay(&self, hw: &mut impl RelayPort, sink: &mut impl EventSink) {
        let s = self.state.policy.state();
        hw.set(s.active);
        sink.emit(&AppEvent::SprinklerChanged {
            active: s.active,
            manual: s.manual_override,
        });
    }

    fn show_banner(&mut self, hw: &mut impl DisplayPort, text: &str, now: Timestamp) {
        hw.banner(text);
        self.timers.banner_until = Some(now.saturating_add(u64::from(self.config.banner_hold_ms)));
    }

    fn write_journal(&self, journal: &mut impl LogPort, sink: &mut impl EventSink) {
        let line = journal_line(
            &self.state.clock.format(),
            &self.state.reading,
            self.state.policy.state(),
        );
        match journal.append(&line) {
            Ok(()) => debug!("Logged {}", line),
            Err(e) => {
                warn!("Journal append failed: {}", e);
                sink.emit(&AppEvent::JournalFailed(e));
            }
        }
    }

    fn sync_clock(
        &mut self,
        now: Timestamp,
        time: &mut impl TimeSourcePort,
        sink: &mut impl EventSink,
    ) {
        let result = match time.network_time() {
            None => Err(None),
            Some(response) => match extract_cclk(&response) {
                None => Err(None),
                Some(raw) => self.state.clock.sync(raw, now).map_err(Some),
            },
        };

        let wait_secs = match result {
            Ok(synced) => {
                info!("Clock synced: {}", synced);
                sink.emit(&AppEvent::ClockSynced(synced));
                self.config.clock_resync_interval_secs
            }
            Err(reason) => {
                warn!("Clock sync failed ({:?})", reason);
                sink.emit(&AppEvent::ClockSyncFailed(reason));
                if self.state.clock.is_initialized() {
                    self.config.clock_resync_interval_secs
                } else {
                    self.config.clock_retry_interval_secs
                }
            }
        };
        self.timers.next_clock_sync = if wait_secs == 0 {
            Timestamp::MAX
        } else {
            now.saturating_add(u64::from(wait_secs) * 1000)
        };
    }
}
