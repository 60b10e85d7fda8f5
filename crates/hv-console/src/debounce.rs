//! Keystroke debounce for free-text search.
//!
//! Every keystroke re-arms the deadline; the fetch fires once the settle
//! window elapses with no further input. Time is injected by the caller so
//! tests never sleep.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct SearchDebounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Record a keystroke at `now`, pushing the deadline out.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// True once while the armed window has settled; disarms on firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop a pending deadline, e.g. when another filter change already
    /// triggered the fetch the search was waiting for.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(400);

    #[test]
    fn does_not_fire_before_the_window_settles() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::new(DELAY);
        debounce.arm(start);
        assert!(!debounce.poll(start + Duration::from_millis(399)));
        assert!(debounce.is_armed());
    }

    #[test]
    fn fires_exactly_once_after_the_window() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::new(DELAY);
        debounce.arm(start);
        assert!(debounce.poll(start + DELAY));
        assert!(!debounce.poll(start + DELAY + Duration::from_secs(1)));
    }

    #[test]
    fn rapid_keystrokes_push_the_deadline_out() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::new(DELAY);
        debounce.arm(start);
        debounce.arm(start + Duration::from_millis(300));

        // The first deadline has passed, but the re-arm moved it.
        assert!(!debounce.poll(start + Duration::from_millis(450)));
        assert!(debounce.poll(start + Duration::from_millis(700)));
    }

    #[test]
    fn cancel_disarms() {
        let start = Instant::now();
        let mut debounce = SearchDebounce::new(DELAY);
        debounce.arm(start);
        debounce.cancel();
        assert!(!debounce.poll(start + DELAY));
    }

    #[test]
    fn unarmed_poll_is_false() {
        let mut debounce = SearchDebounce::new(DELAY);
        assert!(!debounce.poll(Instant::now()));
    }
}
