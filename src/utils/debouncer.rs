use std::time::{Duration, Instant};

/// Holds at most one pending deadline.
///
/// Scheduling again replaces the pending deadline instead of adding another,
/// so a burst of events collapses into a single firing.
#[derive(Debug, Clone)]
pub struct Debouncer {
    /// Delay used by `schedule`
    delay: Duration,
    /// When the pending action becomes due
    deadline: Option<Instant>,
}

impl Debouncer {
    /// Create a new debouncer with the specified delay in milliseconds
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            deadline: None,
        }
    }

    /// Cancel any pending deadline and schedule a fresh one after the default delay
    pub fn schedule(&mut self, now: Instant) {
        self.schedule_in(now, self.delay);
    }

    /// Cancel any pending deadline and schedule a fresh one after `delay`
    pub fn schedule_in(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Returns true exactly once when the pending deadline has passed
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Get the time remaining before the action will trigger
    /// Returns None if no action is pending
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(100);
        d.schedule(t0);

        assert!(!d.fire_if_due(t0 + Duration::from_millis(99)));
        assert!(d.fire_if_due(t0 + Duration::from_millis(100)));
        assert!(!d.fire_if_due(t0 + Duration::from_millis(500)));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_reschedule_replaces_deadline() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(100);
        d.schedule(t0);
        d.schedule(t0 + Duration::from_millis(80));

        assert!(!d.fire_if_due(t0 + Duration::from_millis(150)));
        assert_eq!(
            d.time_remaining(t0 + Duration::from_millis(150)),
            Some(Duration::from_millis(30))
        );
        assert!(d.fire_if_due(t0 + Duration::from_millis(180)));
    }

    #[test]
    fn test_zero_delay_is_due_immediately() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(700);
        d.schedule_in(t0, Duration::ZERO);
        assert!(d.fire_if_due(t0));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(10);
        d.schedule(t0);
        d.cancel();
        assert!(!d.fire_if_due(t0 + Duration::from_secs(1)));
        assert_eq!(d.time_remaining(t0), None);
    }
}
