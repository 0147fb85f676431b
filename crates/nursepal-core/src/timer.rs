//! Exam countdown.
//!
//! [`ExamClock`] is the pure countdown the session owns; [`Ticker`] is the
//! cancellable one-second schedule the driver polls to feed it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Seconds between ticks.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Exam allowance: half a minute per question, rounded up to whole minutes.
pub fn allotted_seconds(question_count: usize) -> u64 {
    question_count.div_ceil(2) as u64 * 60
}

/// Remaining-time countdown for one exam attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamClock {
    allotted_secs: u64,
    remaining_secs: u64,
    started_at: DateTime<Utc>,
}

impl ExamClock {
    pub fn arm(question_count: usize, started_at: DateTime<Utc>) -> Self {
        let allotted_secs = allotted_seconds(question_count);
        Self {
            allotted_secs,
            remaining_secs: allotted_secs,
            started_at,
        }
    }

    /// Restore the full allowance and restart the attempt clock.
    pub fn rearm(&mut self, started_at: DateTime<Utc>) {
        self.remaining_secs = self.allotted_secs;
        self.started_at = started_at;
    }

    /// Consume one second. Never goes below zero. Returns the remaining time.
    pub fn tick(&mut self) -> u64 {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn allotted_secs(&self) -> u64 {
        self.allotted_secs
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whole seconds between the start of the attempt and `now`.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        (now - self.started_at).num_seconds().max(0) as u64
    }
}

/// A repeating schedule that can be started and stopped.
///
/// While stopped, [`Ticker::tick`] never resolves, so it can sit in a
/// `tokio::select!` unconditionally.
#[derive(Debug)]
pub struct Ticker {
    period: Duration,
    interval: Option<Interval>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    /// Start (or restart) the schedule; the first tick fires one period from now.
    pub fn start(&mut self) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.interval = Some(interval);
    }

    pub fn stop(&mut self) {
        self.interval = None;
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Wait for the next tick. Cancel-safe.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending::<()>().await,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}
