//! VFD brightness setting, held as a whole percentage of boost PWM duty.

use crate::{DEFAULT_BRIGHTNESS_PERCENT, MAX_BRIGHTNESS_PERCENT, MIN_BRIGHTNESS_PERCENT};

/// Boost converter duty in percent, always within `[50, 75]`.
///
/// The value is persisted and exchanged as a fraction (`0.60`), but stored as an integer so that
/// repeated 0.01 steps never drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness(u8);

impl Brightness {
    pub const MIN: Self = Self(MIN_BRIGHTNESS_PERCENT);
    pub const MAX: Self = Self(MAX_BRIGHTNESS_PERCENT);
    pub const DEFAULT: Self = Self(DEFAULT_BRIGHTNESS_PERCENT);

    /// Clamps `percent` into the supported range.
    #[must_use]
    pub const fn from_percent(percent: u8) -> Self {
        if percent < MIN_BRIGHTNESS_PERCENT {
            Self::MIN
        } else if percent > MAX_BRIGHTNESS_PERCENT {
            Self::MAX
        } else {
            Self(percent)
        }
    }

    /// Rounds a stored fraction to the nearest percent and clamps it. NaN maps to the minimum.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Value is clamped to the u8 range before the cast"
    )]
    #[expect(clippy::cast_sign_loss, reason = "Value is clamped to be non-negative")]
    pub fn from_fraction(fraction: f32) -> Self {
        // `as` saturates and maps NaN to 0.
        let percent = ((fraction * 100.0 + 0.5) as i32).clamp(0, i32::from(u8::MAX));
        Self::from_percent(percent as u8)
    }

    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }

    /// The setting as a fraction of full duty, as persisted.
    #[must_use]
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }

    /// One percent brighter, saturating at the maximum.
    #[must_use]
    pub const fn brighter(self) -> Self {
        Self::from_percent(self.0.saturating_add(1))
    }

    /// One percent dimmer, saturating at the minimum.
    #[must_use]
    pub const fn dimmer(self) -> Self {
        Self::from_percent(self.0.saturating_sub(1))
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn steps_saturate_at_both_ends() {
        let mut brightness = Brightness::DEFAULT;
        for _ in 0..40 {
            brightness = brightness.brighter();
        }
        assert_eq!(brightness, Brightness::MAX);
        assert_eq!(brightness.percent(), 75);

        for _ in 0..40 {
            brightness = brightness.dimmer();
        }
        assert_eq!(brightness, Brightness::MIN);
        assert_eq!(brightness.percent(), 50);
    }

    #[test]
    fn fractions_round_to_the_nearest_percent() {
        assert_eq!(Brightness::from_fraction(0.6).percent(), 60);
        assert_eq!(Brightness::from_fraction(0.619_9).percent(), 62);
        assert_eq!(Brightness::from_fraction(0.9).percent(), 75);
        assert_eq!(Brightness::from_fraction(-1.0).percent(), 50);
        assert_eq!(Brightness::from_fraction(f32::NAN).percent(), 50);
    }

    #[test]
    fn fraction_matches_percent() {
        assert!((Brightness::DEFAULT.fraction() - 0.60).abs() < 1e-6);
        assert_eq!(Brightness::from_fraction(Brightness::MAX.fraction()), Brightness::MAX);
    }
}
