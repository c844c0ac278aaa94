//! Front-panel buttons: debounced, active-low switches that report falling edges.

use embassy_time::Instant;
use heapless::Vec;

use crate::BUTTON_COUNT;
use crate::debounce::Debouncer;

/// One front-panel button, wired active-low with a pull-up.
///
/// Keeps the previous debounced level so each press fires exactly once, on the confirmed
/// high-to-low transition.
#[derive(Debug, Clone, Copy)]
pub struct Button {
    debouncer: Debouncer,
    previous: bool,
}

impl Button {
    /// A released button (pulled high).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            debouncer: Debouncer::new(true),
            previous: true,
        }
    }

    /// Feeds one raw pin level. Returns `true` if this sample completed a press.
    pub fn sample(&mut self, raw_level: bool, now: Instant) -> bool {
        self.debouncer.update(raw_level, now);
        let level = self.debouncer.value();
        let pressed = self.previous && !level;
        self.previous = level;
        pressed
    }

    /// Whether the debounced level currently reads as held down.
    #[must_use]
    pub const fn is_down(&self) -> bool {
        !self.debouncer.value()
    }
}

impl Default for Button {
    fn default() -> Self {
        Self::new()
    }
}

// Instead of passing around a bare index, we name the buttons by the role they play in the
// clock's modes. `Up` and `Down` double as "next view" and "power" outside the edit chain.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonId {
    /// Top button: start or advance the edit chain.
    Select,
    /// Middle button: increment, or toggle time/date.
    Up,
    /// Bottom button: decrement, or toggle the display off.
    Down,
}

impl ButtonId {
    /// Buttons in pin order (top, middle, bottom).
    pub const ALL: [Self; BUTTON_COUNT] = [Self::Select, Self::Up, Self::Down];
}

/// The three front-panel buttons.
#[derive(Debug, Clone, Copy, Default)]
pub struct Buttons([Button; BUTTON_COUNT]);

impl Buttons {
    #[must_use]
    pub const fn new() -> Self {
        Self([Button::new(); BUTTON_COUNT])
    }

    /// Feeds one raw sample per button (pin order) and returns the buttons pressed by it.
    pub fn poll(
        &mut self,
        raw_levels: [bool; BUTTON_COUNT],
        now: Instant,
    ) -> Vec<ButtonId, BUTTON_COUNT> {
        let mut pressed = Vec::new();
        for ((button, raw_level), id) in self.0.iter_mut().zip(raw_levels).zip(ButtonId::ALL) {
            if button.sample(raw_level, now) {
                // Capacity equals the number of buttons.
                let _ = pressed.push(id);
            }
        }
        pressed
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    fn at(millis: u64) -> Instant {
        Instant::from_millis(millis)
    }

    #[test]
    fn press_fires_once_on_the_falling_edge() {
        let mut button = Button::new();
        let mut presses = 0;
        for millis in (0..300).step_by(10) {
            if button.sample(false, at(millis)) {
                presses += 1;
            }
        }
        assert_eq!(presses, 1);
        assert!(button.is_down());
    }

    #[test]
    fn release_does_not_fire() {
        let mut button = Button::new();
        for millis in (0..100).step_by(10) {
            button.sample(false, at(millis));
        }
        let fired = (100..300)
            .step_by(10)
            .any(|millis| button.sample(true, at(millis)));
        assert!(!fired);
        assert!(!button.is_down());
    }

    #[test]
    fn poll_reports_buttons_in_pin_order() {
        let mut buttons = Buttons::new();
        buttons.poll([false, true, false], at(0));
        let pressed = buttons.poll([false, true, false], at(60));
        assert_eq!(pressed.as_slice(), &[ButtonId::Select, ButtonId::Down]);

        let pressed = buttons.poll([false, true, false], at(120));
        assert!(pressed.is_empty());
    }
}
