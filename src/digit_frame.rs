//! Nine-slot driver frames for the multiplexed VFD.

use core::ops::Index;

use crate::TUBE_COUNT;
use crate::segment::{self, Segments};

/// One tube's content: an optional character and an optional decimal point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph {
    ch: Option<char>,
    dot: bool,
}

impl Glyph {
    /// An unlit tube.
    pub const BLANK: Self = Self { ch: None, dot: false };

    /// A lone decimal point, used on the last tube to flag edit mode.
    pub const MARKER: Self = Self { ch: None, dot: true };

    /// A placeholder for a field that is not shown.
    pub const DASH: Self = Self::new('-');

    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self { ch: Some(ch), dot: false }
    }

    /// The same glyph with its decimal point lit.
    #[must_use]
    pub const fn with_dot(self) -> Self {
        Self { ch: self.ch, dot: true }
    }

    /// Segment bits for this glyph, without a tube-select bit.
    #[must_use]
    pub fn bits(self) -> u32 {
        match (self.ch, self.dot) {
            (Some(ch), dot) => segment::encode(ch, dot),
            (None, true) => Segments::DP,
            (None, false) => 0,
        }
    }
}

/// Driver words for all nine tubes, each combining a tube-select bit with segment bits.
///
/// A frame is always built whole, from nine glyphs, so a partially updated frame cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DigitFrame([u32; TUBE_COUNT]);

impl DigitFrame {
    /// Every tube selected in turn with no segments lit.
    pub const BLANK: Self = Self(segment::TUBES);

    #[must_use]
    pub fn from_glyphs(glyphs: &[Glyph; TUBE_COUNT]) -> Self {
        let mut slots = segment::TUBES;
        for (slot, glyph) in slots.iter_mut().zip(glyphs) {
            *slot |= glyph.bits();
        }
        Self(slots)
    }

    /// Driver word for slot `index`, wrapping past the last tube.
    #[must_use]
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Modulo keeps the slot index in range"
    )]
    pub fn slot(&self, index: usize) -> u32 {
        self.0.get(index % TUBE_COUNT).copied().unwrap_or_default()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        TUBE_COUNT
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> core::slice::Iter<'_, u32> {
        self.0.iter()
    }
}

impl Default for DigitFrame {
    fn default() -> Self {
        Self::BLANK
    }
}

impl Index<usize> for DigitFrame {
    type Output = u32;

    #[expect(clippy::indexing_slicing, reason = "Caller's responsibility")]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for DigitFrame {
    type Item = u32;
    type IntoIter = core::array::IntoIter<u32, TUBE_COUNT>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DigitFrame {
    type Item = &'a u32;
    type IntoIter = core::slice::Iter<'a, u32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;
    use crate::segment::{TUBE_MASK, encode, tube_select};

    #[test]
    fn every_slot_selects_exactly_one_tube() {
        let frame = DigitFrame::from_glyphs(&[Glyph::new('8'); TUBE_COUNT]);
        for (index, &bits) in frame.iter().enumerate() {
            assert_eq!((bits & TUBE_MASK).count_ones(), 1);
            assert_eq!(Some(bits & TUBE_MASK), tube_select(index));
        }
    }

    #[test]
    fn glyph_bits_land_on_their_own_slot() {
        let mut glyphs = [Glyph::BLANK; TUBE_COUNT];
        glyphs[2] = Glyph::new('7').with_dot();
        glyphs[8] = Glyph::MARKER;
        let frame = DigitFrame::from_glyphs(&glyphs);

        assert_eq!(frame[2] & !TUBE_MASK, encode('7', true));
        assert_eq!(frame[8] & !TUBE_MASK, Segments::DP);
        assert_eq!(frame[0] & !TUBE_MASK, 0);
        assert_eq!(frame.len(), TUBE_COUNT);
    }

    #[test]
    fn slot_wraps_around() {
        let frame = DigitFrame::from_glyphs(&[Glyph::DASH; TUBE_COUNT]);
        assert_eq!(frame.slot(TUBE_COUNT), frame.slot(0));
        assert_eq!(frame.slot(TUBE_COUNT + 3), frame[3]);
    }

    #[test]
    fn blank_frame_lights_no_segments() {
        assert!(DigitFrame::BLANK.iter().all(|&bits| bits & !TUBE_MASK == 0));
        assert_eq!(DigitFrame::default(), DigitFrame::BLANK);
    }
}
