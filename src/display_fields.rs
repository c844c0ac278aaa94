//! Blank-capable view of a clock reading, rendered into tube glyphs.
//!
//! Tube 1 (slot 0) is the rightmost tube, so every field is written least-significant digit
//! first. A field that is `None` shows dashes in place of its digits.

use crate::TUBE_COUNT;
use crate::clock_time::ClockTime;
use crate::digit_frame::{DigitFrame, Glyph};

/// Which calendar fields to show. Edit modes show only the field being edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayFields {
    pub year: Option<u16>,
    pub month: Option<u8>,
    pub day: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
}

impl DisplayFields {
    /// Every field blank.
    pub const BLANK: Self = Self {
        year: None,
        month: None,
        day: None,
        hour: None,
        minute: None,
        second: None,
    };

    /// Every field of `time` shown.
    #[must_use]
    pub const fn from_time(time: &ClockTime) -> Self {
        Self {
            year: Some(time.year),
            month: Some(time.month),
            day: Some(time.day),
            hour: Some(time.hour),
            minute: Some(time.minute),
            second: Some(time.second),
        }
    }

    /// Time layout: `s s - m m - h h marker`, from tube 1.
    #[must_use]
    pub fn time_glyphs(&self, marker: bool) -> [Glyph; TUBE_COUNT] {
        let [s0, s1] = digits(self.second);
        let [m0, m1] = digits(self.minute);
        let [h0, h1] = digits(self.hour);
        [
            s0,
            s1,
            Glyph::DASH,
            m0,
            m1,
            Glyph::DASH,
            h0,
            h1,
            marker_glyph(marker),
        ]
    }

    /// Date layout: `y y y y m. m d. d marker`, from tube 1.
    #[must_use]
    pub fn date_glyphs(&self, marker: bool) -> [Glyph; TUBE_COUNT] {
        let [y0, y1, y2, y3] = digits(self.year);
        let [mo0, mo1] = digits(self.month);
        let [d0, d1] = digits(self.day);
        [
            y0,
            y1,
            y2,
            y3,
            mo0.with_dot(),
            mo1,
            d0.with_dot(),
            d1,
            marker_glyph(marker),
        ]
    }

    #[must_use]
    pub fn time_frame(&self, marker: bool) -> DigitFrame {
        DigitFrame::from_glyphs(&self.time_glyphs(marker))
    }

    #[must_use]
    pub fn date_frame(&self, marker: bool) -> DigitFrame {
        DigitFrame::from_glyphs(&self.date_glyphs(marker))
    }
}

const fn marker_glyph(marker: bool) -> Glyph {
    if marker { Glyph::MARKER } else { Glyph::BLANK }
}

/// Zero-padded decimal digits of `value`, least significant first, or `N` dashes for `None`.
///
/// Digits above the width are dropped.
#[expect(
    clippy::integer_division_remainder_used,
    reason = "Decimal digit extraction"
)]
#[expect(clippy::arithmetic_side_effects, reason = "Divisor and modulus are non-zero constants")]
fn digits<const N: usize, T: Into<u32>>(value: Option<T>) -> [Glyph; N] {
    let mut glyphs = [Glyph::DASH; N];
    if let Some(value) = value {
        let mut rest: u32 = value.into();
        for glyph in &mut glyphs {
            *glyph = Glyph::new(decimal_char(rest % 10));
            rest /= 10;
        }
    }
    glyphs
}

fn decimal_char(digit: u32) -> char {
    char::from_digit(digit, 10).unwrap_or('-')
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn time_layout_starts_with_seconds_ones() {
        let time = ClockTime::new(2024, 2, 28, 23, 59, 7);
        let glyphs = DisplayFields::from_time(&time).time_glyphs(false);
        let expected = [
            Glyph::new('7'),
            Glyph::new('0'),
            Glyph::DASH,
            Glyph::new('9'),
            Glyph::new('5'),
            Glyph::DASH,
            Glyph::new('3'),
            Glyph::new('2'),
            Glyph::BLANK,
        ];
        assert_eq!(glyphs, expected);
    }

    #[test]
    fn date_layout_dots_month_and_day_ones() {
        let time = ClockTime::new(2024, 2, 9, 0, 0, 0);
        let glyphs = DisplayFields::from_time(&time).date_glyphs(true);
        let expected = [
            Glyph::new('4'),
            Glyph::new('2'),
            Glyph::new('0'),
            Glyph::new('2'),
            Glyph::new('2').with_dot(),
            Glyph::new('0'),
            Glyph::new('9').with_dot(),
            Glyph::new('0'),
            Glyph::MARKER,
        ];
        assert_eq!(glyphs, expected);
    }

    #[test]
    fn blank_fields_render_as_dashes() {
        let fields = DisplayFields {
            hour: Some(5),
            second: Some(0),
            ..DisplayFields::BLANK
        };
        let glyphs = fields.time_glyphs(true);
        assert_eq!(glyphs[0], Glyph::new('0'));
        assert_eq!(glyphs[3], Glyph::DASH);
        assert_eq!(glyphs[4], Glyph::DASH);
        assert_eq!(glyphs[6], Glyph::new('5'));
        assert_eq!(glyphs[7], Glyph::new('0'));
        assert_eq!(glyphs[8], Glyph::MARKER);
    }

    #[test]
    fn blank_date_keeps_its_dots() {
        let glyphs = DisplayFields::BLANK.date_glyphs(false);
        assert_eq!(glyphs[4], Glyph::DASH.with_dot());
        assert_eq!(glyphs[6], Glyph::DASH.with_dot());
        assert_eq!(glyphs[0], Glyph::DASH);
    }
}
