//! Integration tests for the ControlLoop → policy → ports pipeline.
//!
//! These run on the host and drive the loop tick by tick with explicit
//! timestamps, asserting on relay writes, outgoing SMS, journal lines and
//! LCD pages recorded by the mock adapters.

use crate::mock_hw::{LogSink, MockHardware, MockJournal, MockModem, RECIPIENT, test_config};

use vapor::app::alerts::AlertKind;
use vapor::app::commands::AppCommand;
use vapor::app::events::AppEvent;
use vapor::app::reading::DisplayMode;
use vapor::app::service::ControlLoop;
use vapor::clock::UNSET_TIMESTAMP;
use vapor::config::SystemConfig;
use vapor::error::{IoError, SendError};

struct Rig {
    app: ControlLoop,
    hw: MockHardware,
    modem: MockModem,
    journal: MockJournal,
    sink: LogSink,
}

impl Rig {
    fn new(config: SystemConfig) -> Self {
        Self {
            app: ControlLoop::new(config),
            hw: MockHardware::new(),
            modem: MockModem::new(),
            journal: MockJournal::default(),
            sink: LogSink::new(),
        }
    }

    fn booted() -> Self {
        let mut rig = Self::new(test_config());
        rig.start(0);
        rig
    }

    fn start(&mut self, now: u64) {
        self.app.start(now, &mut self.modem, &mut self.sink);
    }

    fn tick(&mut self, now: u64) {
        self.app.tick(
            now,
            &mut self.hw,
            &mut self.modem,
            &mut self.journal,
            &mut self.sink,
        );
    }

    /// Tick every `step` ms over `from..=to`.
    fn run(&mut self, from: u64, to: u64, step: u64) {
        let mut t = from;
        while t <= to {
            self.tick(t);
            t += step;
        }
    }
}

// ── Automatic control ─────────────────────────────────────────

#[test]
fn hot_dry_roof_engages_then_humid_greenhouse_releases_with_one_sms() {
    let mut rig = Rig::booted();

    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.tick(0);
    assert!(rig.hw.relay_on(), "roof 31 C / 55 % must engage");
    assert!(rig.app.sprinkler().active);

    rig.hw.set_climate(29.0, 72.0, 25.0, 80.0);
    rig.tick(1_000);
    assert!(!rig.hw.relay_on(), "indoor 29 C / 72 % must release");

    assert_eq!(rig.hw.relay, vec![true, false]);
    assert_eq!(rig.modem.sent.len(), 1, "exactly one SMS for the episode");
    let (to, body) = &rig.modem.sent[0];
    assert_eq!(to, RECIPIENT);
    assert!(body.starts_with("[VAPOR SYSTEM ALERT]"));
    assert!(body.contains("Roof: 31.00 C | 55.00% RH"));
    assert!(body.ends_with("Status: SPRINKLER ON"));
}

#[test]
fn neither_rule_holds_keeps_relay_state() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.tick(0);
    // Roof cooled, greenhouse still hot and dry.
    rig.hw.set_climate(33.0, 40.0, 28.0, 70.0);
    rig.run(1_000, 10_000, 1_000);
    assert_eq!(rig.hw.relay, vec![true]);
}

#[test]
fn sensors_sampled_only_on_interval() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.tick(0);
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.tick(500);
    assert!(rig.hw.relay.is_empty(), "no sample before the interval elapses");
    rig.tick(1_000);
    assert_eq!(rig.hw.relay, vec![true]);
}

// ── Cooldown ──────────────────────────────────────────────────

#[test]
fn threshold_alert_respects_cooldown() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);

    rig.run(0, 299_000, 1_000);
    assert_eq!(rig.modem.sent.len(), 1);

    rig.tick(300_000);
    assert_eq!(rig.modem.sent.len(), 2, "gate reopens after 300 s");
}

#[test]
fn low_water_and_threshold_alerts_have_separate_gates() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    // 42.5 cm from a 45/20 cm tank = 10 %.
    rig.hw.distance = Some(42.5);

    rig.tick(0);
    let bodies = rig.modem.bodies();
    assert_eq!(bodies.len(), 2);
    assert!(bodies.iter().any(|b| b.starts_with("[VAPOR SYSTEM ALERT]")));
    assert!(bodies.contains(&"[WATER TANK STATUS]\n\nWater level is LOW (10%). Please refill soon."));

    rig.run(1_000, 60_000, 1_000);
    assert_eq!(rig.modem.sent.len(), 2);
}

#[test]
fn low_water_threshold_is_inclusive() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    // (45 - 40) / 25 = 20 %
    rig.hw.distance = Some(40.0);
    rig.tick(0);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::AlertSent(AlertKind::LowWater)), 1);
}

#[test]
fn failed_send_still_arms_cooldown() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.modem.send_error = Some(SendError::Timeout);

    rig.tick(0);
    assert!(rig.sink.events.contains(&AppEvent::AlertFailed {
        kind: AlertKind::ThresholdAlert,
        error: SendError::Timeout,
    }));

    rig.modem.send_error = None;
    rig.run(1_000, 120_000, 1_000);
    assert!(rig.modem.sent.is_empty(), "no retry inside the window");
}

#[test]
fn missing_recipient_reports_failure_without_sending() {
    let mut rig = Rig::new(SystemConfig::default());
    rig.start(0);
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.tick(0);
    assert!(rig.modem.sent.is_empty());
    assert_eq!(
        rig.sink.count(|e| matches!(e, AppEvent::AlertFailed { error: SendError::TransportUnavailable, .. })),
        1
    );
}

// ── Operator commands ─────────────────────────────────────────

#[test]
fn vapor_on_forces_relay_and_suspends_auto() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.tick(0);
    assert!(rig.hw.relay.is_empty());

    rig.modem.receive("Vapor On");
    rig.tick(1_000);
    assert_eq!(rig.hw.relay, vec![true]);
    assert!(rig.app.sprinkler().manual_override);
    assert_eq!(rig.hw.banners(), vec!["SPRINKLER: ON"]);
    assert!(rig.sink.events.contains(&AppEvent::CommandApplied(AppCommand::SprinklerOn)));

    // Release rule holds, but the override wins.
    rig.run(2_000, 20_000, 1_000);
    assert_eq!(rig.hw.relay, vec![true]);
}

#[test]
fn vapor_off_returns_control_to_auto() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.modem.receive("VAPOR ON");
    rig.tick(0);
    rig.modem.receive("vapor off");
    rig.tick(1_000);
    assert_eq!(rig.hw.relay, vec![true, false]);
    assert!(!rig.app.sprinkler().manual_override);
    assert_eq!(rig.hw.banners(), vec!["SPRINKLER: ON", "SPRINKLER: OFF"]);

    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.tick(2_000);
    assert_eq!(rig.hw.relay, vec![true, false, true], "AUTO engages again");
}

#[test]
fn manual_on_does_not_send_threshold_alert() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.modem.receive("VAPOR ON");
    rig.tick(0);
    // The sample ran before the command, so the AUTO alert fired once.
    assert_eq!(rig.modem.sent.len(), 1);
    rig.run(1_000, 400_000, 1_000);
    assert_eq!(rig.modem.sent.len(), 1, "override suppresses threshold alerts");
}

#[test]
fn status_replies_every_time_without_cooldown() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(28.5, 65.25, 31.0, 55.0);
    rig.modem.receive("VAPOR STATUS");
    rig.modem.receive("vapor status please");
    rig.tick(0);

    let bodies = rig.modem.bodies();
    // One threshold alert plus two status replies.
    assert_eq!(bodies.len(), 3);
    assert_eq!(rig.sink.count(|e| *e == AppEvent::AlertSent(AlertKind::StatusQuery)), 2);
    assert!(bodies[2].contains("Indoor: 28.50 C | 65.25% RH"));
    assert!(rig.hw.banners().contains(&"Sending Status"));
}

#[test]
fn unknown_sms_is_ignored() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.modem.receive("hello there");
    rig.tick(0);
    assert!(rig.hw.relay.is_empty());
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandApplied(_))), 0);
}

#[test]
fn burst_of_commands_drains_over_ticks() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    for _ in 0..6 {
        rig.modem.receive("VAPOR STATUS");
    }
    rig.tick(0);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandApplied(_))), 4);
    rig.tick(100);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::CommandApplied(_))), 6);
    assert_eq!(rig.app.pending_commands(), 0);
}

// ── Sensor faults ─────────────────────────────────────────────

#[test]
fn invalid_reading_leaves_relay_and_keeps_values() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(29.0, 72.0, 31.0, 55.0);
    rig.tick(0);
    assert!(rig.hw.relay_on());

    rig.hw.climate = vapor::app::reading::SensorReading::invalid();
    rig.run(1_000, 5_000, 1_000);
    assert_eq!(rig.hw.relay, vec![true]);
    assert!(!rig.app.reading().valid);
    assert_eq!(rig.app.reading().roof_temp_c, 31.0);
    assert!(rig.sink.count(|e| *e == AppEvent::SensorFault) >= 5);
}

#[test]
fn distance_timeout_keeps_last_level() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    // (45 - 32.5) / 25 = 50 %
    rig.hw.distance = Some(32.5);
    rig.tick(0);
    assert_eq!(rig.app.reading().water_level_whole(), 50);

    rig.hw.distance = None;
    rig.tick(1_000);
    assert_eq!(rig.app.reading().water_level_whole(), 50);
    assert!(rig.sink.events.contains(&AppEvent::DistanceTimeout));
}

#[test]
fn no_low_water_alert_before_first_measurement() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.hw.distance = None;
    rig.run(0, 10_000, 1_000);
    assert!(rig.modem.sent.is_empty());
}

// ── Journal and display ───────────────────────────────────────

#[test]
fn journal_written_and_page_rotated_on_display_interval() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.run(0, 10_000, 1_000);

    assert_eq!(rig.journal.lines.len(), 2);
    assert_eq!(
        rig.journal.lines[0],
        "[10/21/2025, 18:52:29] Indoor: 25.00 C, 50.00% | Roof: 25.00 C, 80.00% | Water: 60% | Sprinkler: OFF"
    );
    assert!(rig.journal.lines[1].starts_with("[10/21/2025, 18:52:34]"));
    assert_eq!(rig.app.display_mode(), DisplayMode::WaterLevel);
    assert_eq!(rig.hw.last_page(), Some(DisplayMode::WaterLevel));
}

#[test]
fn journal_uses_placeholder_until_clock_synced() {
    let mut rig = Rig::new(test_config());
    rig.modem.time_reply = None;
    rig.start(0);
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.run(0, 5_000, 1_000);
    assert!(rig.journal.lines[0].starts_with(&format!("[{}]", UNSET_TIMESTAMP)));
}

#[test]
fn journal_failure_is_reported_and_loop_continues() {
    let mut rig = Rig::booted();
    rig.journal.fail = Some(IoError::NotFound);
    rig.hw.set_climate(25.0, 50.0, 31.0, 55.0);
    rig.run(0, 5_000, 1_000);
    assert!(rig.sink.events.contains(&AppEvent::JournalFailed(IoError::NotFound)));
    assert!(rig.hw.relay_on());
    assert_eq!(rig.app.display_mode(), DisplayMode::IndoorReading);
}

#[test]
fn banner_holds_the_screen() {
    let mut rig = Rig::booted();
    rig.hw.set_climate(25.0, 50.0, 25.0, 80.0);
    rig.modem.receive("VAPOR ON");
    rig.tick(0);
    rig.tick(1_000);
    rig.tick(2_000);
    let after_banner = rig
        .hw
        .screens
        .iter()
        .skip_while(|s| !matches!(s, crate::mock_hw::Screen::Banner(_)))
        .count();
    assert_eq!(after_banner, 1, "nothing drawn over the banner");

    rig.tick(3_000);
    assert_eq!(rig.hw.last_page(), Some(DisplayMode::RoofReading));
    assert!(matches!(rig.hw.screens.last(), Some(crate::mock_hw::Screen::Page(..))));
}

// ── Clock ─────────────────────────────────────────────────────

#[test]
fn clock_synced_at_start() {
    let rig = Rig::booted();
    assert!(rig.app.clock().is_initialized());
    assert_eq!(rig.app.clock().format(), "10/21/2025, 18:52:24");
    assert!(rig.sink.events.contains(&AppEvent::Started { clock_synced: true }));
}

#[test]
fn unsynced_clock_retries_every_minute() {
    let mut rig = Rig::new(test_config());
    rig.modem.time_reply = None;
    rig.start(0);
    assert_eq!(rig.modem.time_queries, 1);

    rig.run(1_000, 59_000, 1_000);
    assert_eq!(rig.modem.time_queries, 1);
    rig.modem.time_reply = Some("+CCLK: \"25/12/31,23:59:59+00\"".into());
    rig.tick(60_000);
    assert_eq!(rig.modem.time_queries, 2);
    assert_eq!(rig.app.clock().format(), "12/31/2025, 23:59:59");

    rig.tick(61_000);
    assert_eq!(rig.app.clock().format(), "01/01/2026, 00:00:00");
}

#[test]
fn synced_clock_resyncs_every_six_hours() {
    let mut rig = Rig::booted();
    rig.tick(21_599_000);
    assert_eq!(rig.modem.time_queries, 1);
    rig.tick(21_600_000);
    assert_eq!(rig.modem.time_queries, 2);
}

#[test]
fn garbled_time_reply_keeps_clock_unset() {
    let mut rig = Rig::new(test_config());
    rig.modem.time_reply = Some("+CCLK: \"25/13/40,99:00:00+00\"".into());
    rig.start(0);
    assert!(!rig.app.clock().is_initialized());
    assert!(rig.sink.events.iter().any(|e| matches!(e, AppEvent::ClockSyncFailed(Some(_)))));
}
