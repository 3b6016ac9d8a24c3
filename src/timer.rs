use std::time::Duration;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Repeating timer over a virtual clock.
///
/// Times are offsets from the owner's epoch. A disabled timer has no deadline.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Timer {
    interval: Duration,
    deadline: Option<Duration>,
}

impl Timer {
    /// Creates a disabled timer.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            deadline: None,
        }
    }

    /// Enables the timer; the first firing is one interval after `now`.
    pub fn start(&mut self, now: Duration) {
        self.deadline = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Changes the period. Takes effect from the next rescheduling.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval.max(MIN_INTERVAL);
    }

    /// Reschedules after a firing. No-op when disabled.
    pub fn fire(&mut self) {
        if let Some(deadline) = self.deadline {
            self.deadline = Some(deadline + self.interval);
        }
    }
}
