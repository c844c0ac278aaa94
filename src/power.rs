//! Tube power: the boost converter's PWM and the filament enable.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::brightness::Brightness;
use crate::peripherals::PowerSupply;
use crate::{Error, Result};

/// Boost converter driven by a PWM channel, and the filament supply on a GPIO.
pub struct PowerRail<PWM, FIL> {
    boost: PWM,
    filament: FIL,
}

impl<PWM: SetDutyCycle, FIL: OutputPin> PowerRail<PWM, FIL> {
    #[must_use]
    pub const fn new(boost: PWM, filament: FIL) -> Self {
        Self { boost, filament }
    }
}

impl<PWM: SetDutyCycle, FIL: OutputPin> PowerSupply for PowerRail<PWM, FIL> {
    fn set_boost_duty(&mut self, brightness: Brightness) -> Result<()> {
        self.boost
            .set_duty_cycle_percent(brightness.percent())
            .map_err(|_| Error::PowerOutput)
    }

    fn boost_off(&mut self) -> Result<()> {
        self.boost
            .set_duty_cycle_fully_off()
            .map_err(|_| Error::PowerOutput)
    }

    fn set_filament(&mut self, on: bool) -> Result<()> {
        self.filament
            .set_state(on.into())
            .map_err(|_| Error::PowerOutput)
    }
}
