//! Debounce filter for one mechanical switch.
//!
//! The start (and end) of a press is noisy: the contacts bounce between "touching" and "not
//! touching" for a few milliseconds. The filter only accepts a new level once the raw samples have
//! held it continuously for longer than the delay window, and drops the candidate as soon as a
//! sample reverts.

use embassy_time::{Duration, Instant};

use crate::BUTTON_DEBOUNCE_DELAY;

/// Debounce state for one switch, fed with raw samples by [`update`](Self::update).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    stable: bool,
    pending_since: Option<Instant>,
    delay: Duration,
}

impl Debouncer {
    /// Creates a filter whose logical value starts at `initial`, with the default 50 ms window.
    #[must_use]
    pub const fn new(initial: bool) -> Self {
        Self::with_delay(initial, BUTTON_DEBOUNCE_DELAY)
    }

    #[must_use]
    pub const fn with_delay(initial: bool, delay: Duration) -> Self {
        Self {
            stable: initial,
            pending_since: None,
            delay,
        }
    }

    pub const fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Feeds one raw sample taken at `now`.
    ///
    /// Returns `true` when this sample committed a new logical value.
    pub fn update(&mut self, raw: bool, now: Instant) -> bool {
        if raw == self.stable {
            // The transient reverted before it was confirmed.
            self.pending_since = None;
            return false;
        }

        match self.pending_since {
            None => {
                self.pending_since = Some(now);
                false
            }
            Some(since) => {
                let held = now.checked_duration_since(since).unwrap_or_default();
                if held > self.delay {
                    self.stable = raw;
                    self.pending_since = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// The last committed logical value. Never reflects an unconfirmed transition.
    #[must_use]
    pub const fn value(&self) -> bool {
        self.stable
    }

    /// Whether a different raw level is currently being timed.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    fn at(millis: u64) -> Instant {
        Instant::from_millis(millis)
    }

    /// Feeds `(time_ms, level)` samples and records the logical value after each one.
    fn run(debouncer: &mut Debouncer, samples: &[(u64, bool)]) -> Vec<bool> {
        samples
            .iter()
            .map(|&(millis, level)| {
                debouncer.update(level, at(millis));
                debouncer.value()
            })
            .collect()
    }

    #[test]
    fn held_flip_commits_once_after_the_window() {
        let mut debouncer = Debouncer::new(true);
        let samples: Vec<(u64, bool)> = (0..=100).step_by(10).map(|ms| (ms, false)).collect();
        let values = run(&mut debouncer, &samples);

        // Candidate recorded at 0 ms; 50 ms is not yet "longer than" the window.
        assert!(values.iter().take(6).all(|&value| value));
        assert!(values.iter().skip(6).all(|&value| !value));
        let changes = values.windows(2).filter(|pair| pair[0] != pair[1]).count();
        assert_eq!(changes, 1);
    }

    #[test]
    fn bounce_shorter_than_the_window_is_rejected() {
        let mut debouncer = Debouncer::new(true);
        let samples = [
            (0, false),
            (10, true),
            (20, false),
            (45, false),
            (60, true),
            (70, false),
            (110, false),
            (115, true),
        ];
        let values = run(&mut debouncer, &samples);
        assert!(values.iter().all(|&value| value));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn revert_restarts_the_window() {
        let mut debouncer = Debouncer::new(true);
        debouncer.update(false, at(0));
        debouncer.update(true, at(40));
        debouncer.update(false, at(45));
        // 90 ms after the first edge but only 45 ms after the restart.
        assert!(!debouncer.update(false, at(90)));
        assert!(debouncer.value());
        assert!(debouncer.update(false, at(96)));
        assert!(!debouncer.value());
    }

    #[test]
    fn custom_delay_is_honoured() {
        let mut debouncer = Debouncer::with_delay(false, Duration::from_millis(5));
        debouncer.update(true, at(100));
        assert!(!debouncer.update(true, at(105)));
        assert!(debouncer.update(true, at(106)));

        debouncer.set_delay(Duration::from_millis(200));
        debouncer.update(false, at(110));
        assert!(!debouncer.update(false, at(300)));
        assert!(debouncer.update(false, at(311)));
    }
}
