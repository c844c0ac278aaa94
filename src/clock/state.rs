//! Display modes of the VFD clock and the button transitions between them.

use crate::brightness::Brightness;
use crate::button::ButtonId;
use crate::clock::Clock;
use crate::clock_time::ClockTime;
use crate::digit_frame::DigitFrame;
use crate::display_fields::DisplayFields;
use crate::peripherals::{PowerSupply, Rtc, SettingsStore};
use crate::{MAX_YEAR, MIN_YEAR, Result};

/// What the clock shows, and which field the buttons edit.
///
/// The `Set*` modes form the edit chain entered from `Time` or `Date` with `Select`; each further
/// `Select` moves to the next field, and the last one commits and returns to `Time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    Time,
    Date,
    Off,
    SetHour,
    SetMinute,
    SetDay,
    SetMonth,
    SetYear,
    SetBrightness,
}

/// Direction of an edit step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Up,
    Down,
}

impl Mode {
    /// Whether this mode is part of the edit chain.
    #[must_use]
    pub const fn is_editing(self) -> bool {
        matches!(
            self,
            Self::SetHour
                | Self::SetMinute
                | Self::SetDay
                | Self::SetMonth
                | Self::SetYear
                | Self::SetBrightness
        )
    }

    /// Applies one button press and returns the next mode.
    ///
    /// Field edits land in the clock's pending time; the two commits of the edit chain write the
    /// RTC through the clock.
    pub(crate) fn execute<R, P, S>(
        self,
        clock: &mut Clock<'_, R, P, S>,
        button: ButtonId,
    ) -> Result<Self>
    where
        R: Rtc,
        P: PowerSupply,
        S: SettingsStore,
    {
        let next = match (self, button) {
            (Self::Time | Self::Date, ButtonId::Select) => {
                clock.begin_edit();
                Self::SetHour
            }
            (Self::Time, ButtonId::Up) => Self::Date,
            (Self::Date, ButtonId::Up) => Self::Time,
            (Self::Time | Self::Date, ButtonId::Down) => Self::Off,
            (Self::Off, ButtonId::Down) => Self::Time,
            (Self::Off, ButtonId::Select | ButtonId::Up) => Self::Off,
            (Self::SetHour, ButtonId::Select) => Self::SetMinute,
            (Self::SetMinute, ButtonId::Select) => {
                clock.commit_provisional()?;
                Self::SetDay
            }
            (Self::SetDay, ButtonId::Select) => Self::SetMonth,
            (Self::SetMonth, ButtonId::Select) => Self::SetYear,
            (Self::SetYear, ButtonId::Select) => Self::SetBrightness,
            (Self::SetBrightness, ButtonId::Select) => {
                clock.commit_final()?;
                Self::Time
            }
            (Self::SetBrightness, ButtonId::Up) => {
                clock.step_brightness(Brightness::brighter)?;
                self
            }
            (Self::SetBrightness, ButtonId::Down) => {
                clock.step_brightness(Brightness::dimmer)?;
                self
            }
            (edit, ButtonId::Up) => {
                clock.edit_pending(|pending| edit.step(pending, Step::Up));
                edit
            }
            (edit, ButtonId::Down) => {
                clock.edit_pending(|pending| edit.step(pending, Step::Down));
                edit
            }
        };
        Ok(next)
    }

    /// Renders this mode. `None` means the display is off.
    ///
    /// Edit modes show only the edited field (from `pending`) plus the edit marker; the hour and
    /// minute edits also show zeroed seconds.
    #[must_use]
    pub fn render(
        self,
        clock_time: &ClockTime,
        pending: Option<&ClockTime>,
        brightness: Brightness,
    ) -> Option<DigitFrame> {
        let edited = pending.unwrap_or(clock_time);
        let only = DisplayFields::BLANK;
        let frame = match self {
            Self::Time => DisplayFields::from_time(clock_time).time_frame(false),
            Self::Date => DisplayFields::from_time(clock_time).date_frame(false),
            Self::Off => return None,
            Self::SetHour => DisplayFields {
                hour: Some(edited.hour),
                second: Some(0),
                ..only
            }
            .time_frame(true),
            Self::SetMinute => DisplayFields {
                minute: Some(edited.minute),
                second: Some(0),
                ..only
            }
            .time_frame(true),
            Self::SetDay => DisplayFields {
                day: Some(edited.day),
                ..only
            }
            .date_frame(true),
            Self::SetMonth => DisplayFields {
                month: Some(edited.month),
                ..only
            }
            .date_frame(true),
            Self::SetYear => DisplayFields {
                year: Some(edited.year),
                ..only
            }
            .date_frame(true),
            Self::SetBrightness => DisplayFields {
                second: Some(brightness.percent()),
                ..only
            }
            .time_frame(true),
        };
        Some(frame)
    }

    /// Hour, minute, day and month wrap around; the year saturates.
    fn step(self, pending: &mut ClockTime, step: Step) {
        match self {
            Self::SetHour => pending.hour = wrap(pending.hour, 0, 23, step),
            Self::SetMinute => pending.minute = wrap(pending.minute, 0, 59, step),
            Self::SetDay => pending.day = wrap(pending.day, 1, 31, step),
            Self::SetMonth => pending.month = wrap(pending.month, 1, 12, step),
            Self::SetYear => {
                pending.year = match step {
                    Step::Up => pending.year.saturating_add(1),
                    Step::Down => pending.year.saturating_sub(1),
                }
                .clamp(MIN_YEAR, MAX_YEAR);
            }
            Self::Time | Self::Date | Self::Off | Self::SetBrightness => {}
        }
    }
}

/// One step within `[min, max]`, wrapping at both ends.
const fn wrap(value: u8, min: u8, max: u8, step: Step) -> u8 {
    match step {
        Step::Up if value >= max => min,
        Step::Up => value.saturating_add(1),
        Step::Down if value <= min => max,
        Step::Down => value.saturating_sub(1),
    }
}
