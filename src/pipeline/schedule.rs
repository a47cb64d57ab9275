//! Fixed-delay tick scheduling

use std::time::{Duration, Instant};

/// When the next tick may run.
///
/// The delay counts from the end of the previous tick, so slow inference
/// stretches the cadence instead of queueing ticks.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    interval: Duration,
    next_due: Option<Instant>,
}

impl TickSchedule {
    /// A schedule whose first tick is due at `now`
    pub fn starting_at(now: Instant, interval: Duration) -> Self {
        Self {
            interval,
            next_due: Some(now),
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Book the next tick one interval after `finished_at`
    pub fn reschedule(&mut self, finished_at: Instant) {
        if self.next_due.is_some() {
            self.next_due = Some(finished_at + self.interval);
        }
    }

    /// Stop scheduling for good
    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Time left until the next tick, `None` once cancelled
    pub fn until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
