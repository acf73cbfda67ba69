use std::time::{Duration, Instant};

/// Delay between the last search keystroke and the query it triggers.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// A single pending deadline. Scheduling again replaces it, so only the
/// last of a burst of changes fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True once, when the deadline has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_delay_once() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        d.schedule(start);
        assert!(!d.fire(start + Duration::from_millis(299)));
        assert!(d.fire(start + SEARCH_DEBOUNCE));
        assert!(!d.fire(start + Duration::from_secs(5)));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_reschedule_replaces_deadline() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        d.schedule(start);
        d.schedule(start + Duration::from_millis(200));
        assert!(!d.fire(start + Duration::from_millis(350)));
        assert!(d.fire(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut d = Debouncer::default();
        d.schedule(start);
        d.cancel();
        assert!(!d.fire(start + Duration::from_secs(1)));
    }
}
