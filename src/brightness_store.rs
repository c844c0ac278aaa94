//! Storage for the brightness setting in NOR flash.
//!
//! One erase sector holds a 16-byte record: magic, version, reserved, the brightness fraction and
//! a CRC over version..value. Erased flash and records from other layouts read as "nothing
//! saved"; a record with the right magic and version but a bad CRC is reported as corrupted.

use crc32fast::Hasher;
use embedded_storage::nor_flash::NorFlash;

use crate::peripherals::SettingsStore;
use crate::{Error, Result};

const MAGIC: u32 = 0x5449_5242; // "BRIT"
const VERSION: u16 = 1;
const RECORD_SIZE: usize = 16;

/// The brightness record in one erase sector of a [`NorFlash`].
pub struct BrightnessStore<F> {
    flash: F,
    offset: u32,
}

impl<F: NorFlash> BrightnessStore<F> {
    /// Uses the sector starting at `offset`, which must be erase-aligned.
    #[must_use]
    pub const fn new(flash: F, offset: u32) -> Self {
        Self { flash, offset }
    }

    /// Uses the last erase sector of `flash`.
    #[must_use]
    pub fn at_end(flash: F) -> Self {
        let capacity = u32::try_from(flash.capacity()).unwrap_or(u32::MAX);
        let sector = u32::try_from(F::ERASE_SIZE).unwrap_or(u32::MAX);
        let offset = capacity.saturating_sub(sector);
        Self::new(flash, offset)
    }

    #[must_use]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    /// Loads the persisted brightness fraction.
    ///
    /// # Errors
    ///
    /// Returns an error if flash cannot be read or the record fails its CRC.
    pub fn load(&mut self) -> Result<Option<f32>> {
        let mut record = [0u8; RECORD_SIZE];
        self.flash
            .read(self.offset, &mut record)
            .map_err(|_| Error::Storage)?;
        parse_record(&record)
    }

    /// Persists `brightness`, erasing the sector first.
    ///
    /// # Errors
    ///
    /// Returns an error if flash cannot be erased or written.
    pub fn save(&mut self, brightness: f32) -> Result<()> {
        let record = build_record(brightness);
        self.erase()?;
        self.flash
            .write(self.offset, &record)
            .map_err(|_| Error::Storage)
    }

    /// Removes the persisted brightness.
    ///
    /// # Errors
    ///
    /// Returns an error if flash cannot be erased.
    pub fn clear(&mut self) -> Result<()> {
        self.erase()
    }

    fn erase(&mut self) -> Result<()> {
        let sector = u32::try_from(F::ERASE_SIZE).map_err(|_| Error::Storage)?;
        let end = self.offset.checked_add(sector).ok_or(Error::Storage)?;
        self.flash
            .erase(self.offset, end)
            .map_err(|_| Error::Storage)
    }
}

impl<F: NorFlash> SettingsStore for BrightnessStore<F> {
    fn load_brightness(&mut self) -> Result<Option<f32>> {
        self.load()
    }

    fn save_brightness(&mut self, brightness: f32) -> Result<()> {
        self.save(brightness)
    }
}

fn parse_record(record: &[u8; RECORD_SIZE]) -> Result<Option<f32>> {
    let [
        m0, m1, m2, m3,
        v0, v1, r0, r1,
        b0, b1, b2, b3,
        c0, c1, c2, c3,
    ] = *record;
    if u32::from_le_bytes([m0, m1, m2, m3]) != MAGIC {
        return Ok(None);
    }
    if u16::from_le_bytes([v0, v1]) != VERSION {
        return Ok(None);
    }
    let crc = compute_crc(&[v0, v1, r0, r1, b0, b1, b2, b3]);
    if crc != u32::from_le_bytes([c0, c1, c2, c3]) {
        return Err(Error::StorageCorrupted);
    }
    Ok(Some(f32::from_le_bytes([b0, b1, b2, b3])))
}

fn build_record(brightness: f32) -> [u8; RECORD_SIZE] {
    let [m0, m1, m2, m3] = MAGIC.to_le_bytes();
    let [v0, v1] = VERSION.to_le_bytes();
    let [b0, b1, b2, b3] = brightness.to_le_bytes();
    let [c0, c1, c2, c3] = compute_crc(&[v0, v1, 0, 0, b0, b1, b2, b3]).to_le_bytes();
    [
        m0, m1, m2, m3,
        v0, v1, 0, 0,
        b0, b1, b2, b3,
        c0, c1, c2, c3,
    ]
}

fn compute_crc(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn record_parses_back() {
        let record = build_record(0.63);
        assert_eq!(parse_record(&record).expect("valid record"), Some(0.63));
        assert_eq!(&record[..4], b"BRIT");
    }

    #[test]
    fn erased_record_is_absent() {
        assert_eq!(parse_record(&[0xFF; RECORD_SIZE]).expect("erased"), None);
    }

    #[test]
    fn other_version_is_absent() {
        let mut record = build_record(0.6);
        record[4] = 2;
        assert_eq!(parse_record(&record).expect("foreign version"), None);
    }

    #[test]
    fn flipped_value_bit_is_corruption() {
        let mut record = build_record(0.6);
        record[9] ^= 0x01;
        assert!(matches!(parse_record(&record), Err(Error::StorageCorrupted)));
    }
}
