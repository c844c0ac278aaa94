//! Calendar time as held by the RTC, and the calendar rules used when committing edits.
//!
//! [`ClockTime`] is a plain named structure (no timezone, no sub-second part). Calendar
//! arithmetic (day numbers, weekday, day of year) is delegated to the `time` crate.

use time::{Date, Month, PrimitiveDateTime};

use crate::{MAX_YEAR, MIN_YEAR};

/// Seconds in one day.
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// A wall-clock reading from (or for) the RTC.
///
/// `weekday` counts from 1 (Monday) to 7; `yearday` from 1 to 366.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub weekday: u8,
    pub yearday: u16,
}

impl ClockTime {
    /// Builds a reading and derives `weekday` and `yearday` from the date.
    ///
    /// Out-of-range fields are kept as given; use [`validated`](Self::validated) to clamp them.
    #[must_use]
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            weekday: 0,
            yearday: 0,
        }
        .with_derived_fields()
    }

    /// Leap rule: divisible by 4 and not by 100, unless also divisible by 400.
    #[must_use]
    pub fn is_leap_year(year: u16) -> bool {
        time::util::is_leap_year(i32::from(year))
    }

    /// The last valid day of `month` in `year`. Months outside 1-12 are treated as 31-day months.
    #[must_use]
    pub fn days_in_month(year: u16, month: u8) -> u8 {
        match month {
            4 | 6 | 9 | 11 => 30,
            2 if Self::is_leap_year(year) => 29,
            2 => 28,
            _ => 31,
        }
    }

    /// Clamps every field into its valid range instead of rejecting the value.
    ///
    /// The day saturates at the last day of the (possibly just edited) month, so an impossible
    /// date such as 30 February silently becomes the 28th or 29th.
    #[must_use]
    pub fn validated(self) -> Self {
        let year = self.year.clamp(MIN_YEAR, MAX_YEAR);
        let month = self.month.clamp(1, 12);
        let day = self.day.clamp(1, Self::days_in_month(year, month));
        Self {
            year,
            month,
            day,
            hour: self.hour.min(23),
            minute: self.minute.min(59),
            second: self.second.min(59),
            ..self
        }
        .with_derived_fields()
    }

    /// Copies the hour, minute and second of `other` into this reading.
    #[must_use]
    pub const fn with_time_of_day(self, other: &Self) -> Self {
        Self {
            hour: other.hour,
            minute: other.minute,
            second: other.second,
            ..self
        }
    }

    /// The date part, if it is a real calendar date.
    #[must_use]
    pub fn date(&self) -> Option<Date> {
        let month = Month::try_from(self.month).ok()?;
        Date::from_calendar_date(i32::from(self.year), month, self.day).ok()
    }

    /// Seconds from `earlier` to `self` (negative if `self` is before `earlier`).
    ///
    /// Whole days come from the calendar, so month and year boundaries count correctly.
    #[must_use]
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Day numbers and second counts of valid readings are far from i64 limits"
    )]
    pub fn seconds_since(&self, earlier: &Self) -> i64 {
        (self.day_number() - earlier.day_number()) * SECONDS_PER_DAY + self.second_of_day()
            - earlier.second_of_day()
    }

    /// This reading advanced by `seconds`. Returns `None` for an invalid reading.
    #[must_use]
    pub fn plus_seconds(&self, seconds: i64) -> Option<Self> {
        let start = self.date()?.with_hms(self.hour, self.minute, self.second).ok()?;
        let later = start.checked_add(time::Duration::seconds(seconds))?;
        Self::from_primitive(later)
    }

    fn from_primitive(date_time: PrimitiveDateTime) -> Option<Self> {
        Some(Self {
            year: u16::try_from(date_time.year()).ok()?,
            month: u8::from(date_time.month()),
            day: date_time.day(),
            hour: date_time.hour(),
            minute: date_time.minute(),
            second: date_time.second(),
            weekday: date_time.weekday().number_from_monday(),
            yearday: date_time.ordinal(),
        })
    }

    fn with_derived_fields(self) -> Self {
        match self.date() {
            Some(date) => Self {
                weekday: date.weekday().number_from_monday(),
                yearday: date.ordinal(),
                ..self
            },
            None => self,
        }
    }

    fn day_number(&self) -> i64 {
        self.date()
            .map_or_else(|| i64::from(self.day), |date| i64::from(date.to_julian_day()))
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "Fields are u8; the sum stays below one day"
    )]
    fn second_of_day(&self) -> i64 {
        i64::from(self.hour) * 3600 + i64::from(self.minute) * 60 + i64::from(self.second)
    }
}
