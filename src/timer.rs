//! Cancellable deadline for the pause that follows a wrong keystroke.
//!
//! The timer never fires on its own. The owner polls [`PauseTimer::is_due`]
//! from its tick handler and applies the reset itself, so dropping or
//! cancelling the handle is enough to make sure a stale pause never touches
//! the next word.

use std::time::{Duration, Instant};

use tracing::trace;

#[derive(Debug)]
pub struct PauseTimer {
    deadline: Instant,
}

impl PauseTimer {
    pub fn start(now: Instant, delay: Duration) -> Self {
        trace!(delay_ms = delay.as_millis() as u64, "wrong pause started");
        Self {
            deadline: now + delay,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    pub fn cancel(self) {
        trace!("wrong pause cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_after_delay() {
        let now = Instant::now();
        let timer = PauseTimer::start(now, Duration::from_millis(300));

        assert!(!timer.is_due(now));
        assert!(!timer.is_due(now + Duration::from_millis(299)));
        assert!(timer.is_due(now + Duration::from_millis(300)));
        assert_eq!(timer.deadline(), now + Duration::from_millis(300));
    }

    #[test]
    fn test_remaining_saturates() {
        let now = Instant::now();
        let timer = PauseTimer::start(now, Duration::from_millis(100));

        assert_eq!(timer.remaining(now), Duration::from_millis(100));
        assert_eq!(timer.remaining(now + Duration::from_secs(1)), Duration::ZERO);
    }

    #[test]
    fn test_zero_delay_is_immediately_due() {
        let now = Instant::now();
        assert!(PauseTimer::start(now, Duration::ZERO).is_due(now));
    }
}
