//! Notification cooldown gate.
//!
//! One gate per alert category.  Once armed, the gate blocks further
//! notifications of its category until the window has fully elapsed.
//!
//! ```text
//!   idle ──arm(now)──▶ armed ──tick(now ≥ armed_at + duration)──▶ idle
//! ```

use core::time::Duration;

use log::{debug, info};

use crate::clock::Timestamp;

/// Default minimum spacing between two alerts of one category.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(300);

/// Which alert stream a gate protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCategory {
    /// Roof heat / dryness alert sent when the sprinkler engages.
    Threshold,
    /// Tank refill reminder.
    LowWater,
}

#[derive(Debug, Clone)]
pub struct CooldownGate {
    category: AlertCategory,
    active: bool,
    started_at: Timestamp,
    duration: Duration,
}

impl CooldownGate {
    /// A disarmed gate.
    pub fn new(category: AlertCategory) -> Self {
        Self {
            category,
            active: false,
            started_at: 0,
            duration: DEFAULT_COOLDOWN,
        }
    }

    /// Start a cooldown window at `now`.
    pub fn arm(&mut self, now: Timestamp, duration: Duration) {
        self.active = true;
        self.started_at = now;
        self.duration = duration;
        debug!("{:?} cooldown armed for {}s", self.category, duration.as_secs());
    }

    /// True while the window opened by [`arm`](Self::arm) is still running.
    pub fn is_blocking(&self, now: Timestamp) -> bool {
        self.active && self.elapsed(now) < self.duration
    }

    /// Disarm once the window has elapsed.  Call once per control cycle.
    pub fn tick(&mut self, now: Timestamp) {
        if !self.active {
            return;
        }
        if self.elapsed(now) >= self.duration {
            self.active = false;
            info!("{:?} SMS cooldown over", self.category);
        }
    }

    /// Time left in the window, `None` when disarmed or expired.
    pub fn remaining(&self, now: Timestamp) -> Option<Duration> {
        if !self.is_blocking(now) {
            return None;
        }
        Some(self.duration - self.elapsed(now))
    }

    pub fn is_armed(&self) -> bool {
        self.active
    }

    fn elapsed(&self, now: Timestamp) -> Duration {
        Duration::from_millis(now.saturating_sub(self.started_at))
    }
}
