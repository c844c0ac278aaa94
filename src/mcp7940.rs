//! MCP7940 battery-backed RTC over any `embedded-hal` I2C bus.
//!
//! Time registers are BCD. The oscillator runs while ST (bit 7 of the seconds register) is set;
//! writing a time clears it, so [`Rtc::set_time`] must be followed by [`Rtc::start`]. The year
//! register holds two digits and reads back as 2000-2099.

use embedded_hal::i2c::I2c;

use crate::clock_time::ClockTime;
use crate::peripherals::Rtc;
use crate::{Error, MAX_TRIM, Result};

/// Fixed I2C address of the MCP7940.
pub const ADDRESS: u8 = 0x6F;

const RTCSEC: u8 = 0x00;
const RTCWKDAY: u8 = 0x03;
const OSCTRIM: u8 = 0x08;

const ST: u8 = 1 << 7;
const HOUR_12: u8 = 1 << 6;
const PM: u8 = 1 << 5;
const OSCRUN: u8 = 1 << 5;
const VBATEN: u8 = 1 << 3;
const WEEKDAY_MASK: u8 = 0x07;
const TRIM_SIGN: u8 = 1 << 7;
const TRIM_MAGNITUDE: u8 = 0x7F;

const CENTURY: u16 = 2000;

/// The MCP7940 real-time clock.
pub struct Mcp7940<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Mcp7940<I2C> {
    #[must_use]
    pub const fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Whether the oscillator is actually running (OSCRUN), as opposed to merely enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails.
    pub fn oscillator_running(&mut self) -> Result<bool> {
        Ok(self.read_register(RTCWKDAY)? & OSCRUN != 0)
    }

    fn read_register(&mut self, register: u8) -> Result<u8> {
        let mut value = [0u8; 1];
        self.i2c
            .write_read(ADDRESS, &[register], &mut value)
            .map_err(|_| Error::RtcBus)?;
        let [value] = value;
        Ok(value)
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.i2c
            .write(ADDRESS, &[register, value])
            .map_err(|_| Error::RtcBus)
    }

    fn update_register(&mut self, register: u8, mask: u8, set: bool) -> Result<()> {
        let value = self.read_register(register)?;
        let updated = if set { value | mask } else { value & !mask };
        if updated == value {
            return Ok(());
        }
        self.write_register(register, updated)
    }
}

impl<I2C: I2c> Rtc for Mcp7940<I2C> {
    fn time(&mut self) -> Result<ClockTime> {
        let mut registers = [0u8; 7];
        self.i2c
            .write_read(ADDRESS, &[RTCSEC], &mut registers)
            .map_err(|_| Error::RtcBus)?;
        decode_time(registers).ok_or(Error::RtcInvalidData)
    }

    fn set_time(&mut self, time: &ClockTime) -> Result<()> {
        let battery = self.read_register(RTCWKDAY)? & VBATEN;
        let [sec, min, hour, wkday, date, month, year] = encode_time(time);
        self.i2c
            .write(
                ADDRESS,
                &[RTCSEC, sec, min, hour, wkday | battery, date, month, year],
            )
            .map_err(|_| Error::RtcBus)
    }

    fn start(&mut self) -> Result<()> {
        self.update_register(RTCSEC, ST, true)
    }

    fn stop(&mut self) -> Result<()> {
        self.update_register(RTCSEC, ST, false)
    }

    fn trim(&mut self) -> Result<i8> {
        Ok(decode_trim(self.read_register(OSCTRIM)?))
    }

    fn set_trim(&mut self, trim: i8) -> Result<()> {
        self.write_register(OSCTRIM, encode_trim(trim))
    }

    fn set_battery_backup(&mut self, enabled: bool) -> Result<()> {
        self.update_register(RTCWKDAY, VBATEN, enabled)
    }
}

/// Two BCD digits to binary. `None` if either nibble is not a decimal digit.
#[expect(clippy::arithmetic_side_effects, reason = "Nibbles are at most 9")]
const fn from_bcd(bcd: u8) -> Option<u8> {
    let tens = bcd >> 4;
    let ones = bcd & 0x0F;
    if tens > 9 || ones > 9 {
        return None;
    }
    Some(tens * 10 + ones)
}

/// Binary to two BCD digits. Values above 99 keep only their last two digits.
#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "Division by a non-zero constant"
)]
const fn to_bcd(value: u8) -> u8 {
    let value = value % 100;
    ((value / 10) << 4) | (value % 10)
}

fn decode_time(registers: [u8; 7]) -> Option<ClockTime> {
    let [sec, min, hour, _wkday, date, month, year] = registers;
    let second = from_bcd(sec & !ST)?;
    let minute = from_bcd(min & 0x7F)?;
    let hour = decode_hour(hour)?;
    let day = from_bcd(date & 0x3F)?;
    let month = from_bcd(month & 0x1F)?;
    let year = CENTURY.checked_add(u16::from(from_bcd(year)?))?;

    let time = ClockTime::new(year, month, day, hour, minute, second);
    (second < 60 && minute < 60 && time.date().is_some()).then_some(time)
}

#[expect(
    clippy::arithmetic_side_effects,
    clippy::integer_division_remainder_used,
    reason = "12-hour values are at most 12"
)]
fn decode_hour(register: u8) -> Option<u8> {
    let hour = if register & HOUR_12 == 0 {
        from_bcd(register & 0x3F)?
    } else {
        let twelve_hour = from_bcd(register & 0x1F)?;
        if !(1..=12).contains(&twelve_hour) {
            return None;
        }
        let pm_offset = if register & PM == 0 { 0 } else { 12 };
        twelve_hour % 12 + pm_offset
    };
    (hour < 24).then_some(hour)
}

/// Register values for `time`, starting at RTCSEC, with the oscillator stopped and 24-hour mode.
#[expect(
    clippy::cast_possible_truncation,
    clippy::integer_division_remainder_used,
    reason = "Year modulo 100 fits in u8"
)]
fn encode_time(time: &ClockTime) -> [u8; 7] {
    [
        to_bcd(time.second),
        to_bcd(time.minute),
        to_bcd(time.hour),
        time.weekday & WEEKDAY_MASK,
        to_bcd(time.day),
        to_bcd(time.month),
        to_bcd((time.year % 100) as u8),
    ]
}

/// OSCTRIM is sign-magnitude; a set sign bit adds clocks.
fn decode_trim(register: u8) -> i8 {
    // Magnitude is at most 127.
    let magnitude = i8::try_from(register & TRIM_MAGNITUDE).unwrap_or(MAX_TRIM);
    if register & TRIM_SIGN == 0 {
        magnitude.saturating_neg()
    } else {
        magnitude
    }
}

fn encode_trim(trim: i8) -> u8 {
    let magnitude = trim.unsigned_abs().min(TRIM_MAGNITUDE);
    if trim > 0 { TRIM_SIGN | magnitude } else { magnitude }
}
