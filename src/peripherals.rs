//! Collaborator traits between the clock core and its hardware.
//!
//! The display multiplexer, the mode state machine and the calibration loop only talk to
//! hardware through these traits, so all of them run on the host against fakes. Generic
//! implementations over `embedded-hal` are [`Mcp7940`](crate::Mcp7940),
//! [`Max6921`](crate::Max6921), [`PowerRail`](crate::PowerRail) and
//! [`BrightnessStore`](crate::BrightnessStore).

use embedded_hal::digital::{InputPin, OutputPin};

use crate::brightness::Brightness;
use crate::clock_time::ClockTime;
use crate::{BUTTON_COUNT, Error, Result};

/// Battery-backed real-time clock with a trimmable oscillator.
pub trait Rtc {
    /// Reads the current time.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails or the registers hold an impossible value.
    fn time(&mut self) -> Result<ClockTime>;

    /// Writes a new time. The oscillator is left stopped; call [`start`](Self::start) after.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails.
    fn set_time(&mut self, time: &ClockTime) -> Result<()>;

    /// Starts the oscillator.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails.
    fn start(&mut self) -> Result<()>;

    /// Stops the oscillator.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails.
    fn stop(&mut self) -> Result<()>;

    /// Reads the oscillator trim. Positive values add clocks (the RTC runs faster).
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails.
    fn trim(&mut self) -> Result<i8>;

    /// Writes the oscillator trim, clamped to `[-127, 127]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails.
    fn set_trim(&mut self, trim: i8) -> Result<()>;

    /// Enables or disables the switch-over to the backup battery.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus transfer fails.
    fn set_battery_backup(&mut self, enabled: bool) -> Result<()>;
}

/// Serial-to-parallel VFD driver: one 24-bit word per tube, shifted then latched.
pub trait VfdDriver {
    /// Shifts the low 24 bits of `bits` into the driver, most significant bit first.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer or the load line fails.
    fn write_slot(&mut self, bits: u32) -> Result<()>;

    /// Transfers the shifted word to the outputs.
    ///
    /// # Errors
    ///
    /// Returns an error if the load line fails.
    fn latch(&mut self) -> Result<()>;

    /// Forces every output low (`true`) or releases them (`false`).
    ///
    /// # Errors
    ///
    /// Returns an error if the blank line fails.
    fn set_blank(&mut self, blank: bool) -> Result<()>;
}

/// Boost converter and filament supply for the tubes.
pub trait PowerSupply {
    /// Runs the boost converter at the duty for `brightness`.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM output fails.
    fn set_boost_duty(&mut self, brightness: Brightness) -> Result<()>;

    /// Stops the boost converter (zero duty).
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM output fails.
    fn boost_off(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the filament output fails.
    fn set_filament(&mut self, on: bool) -> Result<()>;
}

/// Persistent storage for the brightness setting.
pub trait SettingsStore {
    /// Loads the saved brightness fraction, or `None` if nothing was ever saved.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read or the record is corrupted.
    fn load_brightness(&mut self) -> Result<Option<f32>>;

    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    fn save_brightness(&mut self, brightness: f32) -> Result<()>;
}

/// Source of accurate wall-clock time for calibration.
pub trait ReferenceClock {
    /// # Errors
    ///
    /// Returns an error if the reference cannot be read.
    fn now(&mut self) -> Result<ClockTime>;
}

/// A single status light.
pub trait Indicator {
    /// # Errors
    ///
    /// Returns an error if the output fails.
    fn set(&mut self, on: bool) -> Result<()>;
}

/// Raw levels of the front-panel switches, in pin order. `false` means pressed.
pub trait SwitchInputs {
    /// # Errors
    ///
    /// Returns an error if any input cannot be read.
    fn levels(&mut self) -> Result<[bool; BUTTON_COUNT]>;
}

impl<T: Rtc + ?Sized> Rtc for &mut T {
    fn time(&mut self) -> Result<ClockTime> {
        (**self).time()
    }

    fn set_time(&mut self, time: &ClockTime) -> Result<()> {
        (**self).set_time(time)
    }

    fn start(&mut self) -> Result<()> {
        (**self).start()
    }

    fn stop(&mut self) -> Result<()> {
        (**self).stop()
    }

    fn trim(&mut self) -> Result<i8> {
        (**self).trim()
    }

    fn set_trim(&mut self, trim: i8) -> Result<()> {
        (**self).set_trim(trim)
    }

    fn set_battery_backup(&mut self, enabled: bool) -> Result<()> {
        (**self).set_battery_backup(enabled)
    }
}

impl<T: VfdDriver + ?Sized> VfdDriver for &mut T {
    fn write_slot(&mut self, bits: u32) -> Result<()> {
        (**self).write_slot(bits)
    }

    fn latch(&mut self) -> Result<()> {
        (**self).latch()
    }

    fn set_blank(&mut self, blank: bool) -> Result<()> {
        (**self).set_blank(blank)
    }
}

impl<T: PowerSupply + ?Sized> PowerSupply for &mut T {
    fn set_boost_duty(&mut self, brightness: Brightness) -> Result<()> {
        (**self).set_boost_duty(brightness)
    }

    fn boost_off(&mut self) -> Result<()> {
        (**self).boost_off()
    }

    fn set_filament(&mut self, on: bool) -> Result<()> {
        (**self).set_filament(on)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for &mut T {
    fn load_brightness(&mut self) -> Result<Option<f32>> {
        (**self).load_brightness()
    }

    fn save_brightness(&mut self, brightness: f32) -> Result<()> {
        (**self).save_brightness(brightness)
    }
}

impl<T: ReferenceClock + ?Sized> ReferenceClock for &mut T {
    fn now(&mut self) -> Result<ClockTime> {
        (**self).now()
    }
}

impl<T: Indicator + ?Sized> Indicator for &mut T {
    fn set(&mut self, on: bool) -> Result<()> {
        (**self).set(on)
    }
}

impl<T: SwitchInputs + ?Sized> SwitchInputs for &mut T {
    fn levels(&mut self) -> Result<[bool; BUTTON_COUNT]> {
        (**self).levels()
    }
}

/// An indicator LED on any push-pull output, lit when driven high.
pub struct Led<P>(P);

impl<P: OutputPin> Led<P> {
    #[must_use]
    pub const fn new(pin: P) -> Self {
        Self(pin)
    }
}

impl<P: OutputPin> Indicator for Led<P> {
    fn set(&mut self, on: bool) -> Result<()> {
        self.0.set_state(on.into()).map_err(|_| Error::IndicatorOutput)
    }
}

/// Front-panel switches on pulled-up inputs, in pin order (top, middle, bottom).
pub struct Switches<I>([I; BUTTON_COUNT]);

impl<I: InputPin> Switches<I> {
    #[must_use]
    pub const fn new(inputs: [I; BUTTON_COUNT]) -> Self {
        Self(inputs)
    }
}

impl<I: InputPin> SwitchInputs for Switches<I> {
    fn levels(&mut self) -> Result<[bool; BUTTON_COUNT]> {
        let mut levels = [true; BUTTON_COUNT];
        for (level, input) in levels.iter_mut().zip(self.0.iter_mut()) {
            *level = input.is_high().map_err(|_| Error::SwitchInput)?;
        }
        Ok(levels)
    }
}
