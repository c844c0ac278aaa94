//! Segment encoding for the MAX6921 VFD driver.
//!
//! Every frame slot is one 24-bit driver word: a tube-select bit plus the segment bits to light
//! on that tube. The bit positions follow the board's wiring of the driver outputs.

use crate::TUBE_COUNT;

/// MAX6921 output bits for the seven segments and the decimal point.
pub struct Segments;

impl Segments {
    /// Segment A (top).
    pub const A: u32 = 1 << 9;
    /// Segment B (top right).
    pub const B: u32 = 1 << 11;
    /// Segment C (bottom right).
    pub const C: u32 = 1 << 14;
    /// Segment D (bottom).
    pub const D: u32 = 1 << 15;
    /// Segment E (bottom left).
    pub const E: u32 = 1 << 13;
    /// Segment F (top left).
    pub const F: u32 = 1 << 12;
    /// Segment G (middle).
    pub const G: u32 = 1 << 10;
    /// Decimal point.
    pub const DP: u32 = 1 << 16;

    /// Every segment output, decimal point included.
    pub const ALL: u32 =
        Self::A | Self::B | Self::C | Self::D | Self::E | Self::F | Self::G | Self::DP;

    /// Segment patterns for the digits 0-9.
    const DIGITS: [u32; 10] = [
        Self::A | Self::B | Self::C | Self::D | Self::E | Self::F, // 0
        Self::B | Self::C,                                         // 1
        Self::A | Self::B | Self::D | Self::E | Self::G,           // 2
        Self::A | Self::B | Self::C | Self::D | Self::G,           // 3
        Self::B | Self::C | Self::F | Self::G,                     // 4
        Self::A | Self::C | Self::D | Self::F | Self::G,           // 5
        Self::A | Self::C | Self::D | Self::E | Self::F | Self::G, // 6
        Self::A | Self::B | Self::C,                               // 7
        Self::A | Self::B | Self::C | Self::D | Self::E | Self::F | Self::G, // 8
        Self::A | Self::B | Self::C | Self::D | Self::F | Self::G, // 9
    ];
}

/// Tube-select bits, in frame-slot order (tube D1 first).
pub(crate) const TUBES: [u32; TUBE_COUNT] = [
    1 << 7,
    1 << 0,
    1 << 6,
    1 << 1,
    1 << 5,
    1 << 2,
    1 << 3,
    1 << 4,
    1 << 8,
];

/// Every tube-select output.
pub const TUBE_MASK: u32 = 0x1FF;

/// Returns the tube-select bit for frame slot `index`, or `None` past the last tube.
#[must_use]
pub fn tube_select(index: usize) -> Option<u32> {
    TUBES.get(index).copied()
}

/// Encodes a character and an optional decimal point as MAX6921 segment bits.
///
/// The result carries no tube-select bit; [`DigitFrame`](crate::DigitFrame) combines the two.
///
/// # Panics
///
/// Panics if `ch` is not one of `-`, `.` or `0`-`9`. The renderer only ever produces those, so
/// anything else is a programming error.
#[must_use]
pub fn encode(ch: char, dot: bool) -> u32 {
    let bits = match ch {
        '-' => Segments::G,
        '.' => Segments::DP,
        digit @ '0'..='9' => {
            let index = (digit as u32).wrapping_sub('0' as u32) as usize;
            Segments::DIGITS.get(index).copied().unwrap_or_default()
        }
        other => panic!("no segment pattern for {:?}", other),
    };
    if dot { bits | Segments::DP } else { bits }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn zero_lights_the_outer_ring() {
        let expected =
            Segments::A | Segments::B | Segments::C | Segments::D | Segments::E | Segments::F;
        assert_eq!(encode('0', false), expected);
    }

    #[test]
    fn one_lights_the_right_side() {
        assert_eq!(encode('1', false), Segments::B | Segments::C);
    }

    #[test]
    fn dash_with_dot_lights_middle_and_point() {
        assert_eq!(encode('-', true), Segments::G | Segments::DP);
    }

    #[test]
    fn dot_flag_only_adds_the_decimal_point() {
        for digit in '0'..='9' {
            assert_eq!(encode(digit, true), encode(digit, false) | Segments::DP);
            assert_eq!(encode(digit, false) & Segments::DP, 0);
        }
    }

    #[test]
    fn eight_lights_every_segment_but_the_point() {
        assert_eq!(encode('8', false), Segments::ALL & !Segments::DP);
    }

    #[test]
    fn segments_never_overlap_tube_selects() {
        assert_eq!(Segments::ALL & TUBE_MASK, 0);
        let tubes = TUBES.iter().fold(0, |acc, bit| acc | bit);
        assert_eq!(tubes, TUBE_MASK);
        assert!(tube_select(TUBE_COUNT).is_none());
        assert_eq!(tube_select(0), Some(1 << 7));
        assert_eq!(tube_select(8), Some(1 << 8));
    }

    #[test]
    #[should_panic(expected = "no segment pattern")]
    fn unknown_character_is_rejected() {
        let _ = encode('A', false);
    }
}
