//! MAX6921 20-output VFD driver: a 24-bit shift register behind LOAD and BLANK lines.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::peripherals::VfdDriver;
use crate::{Error, Result};

/// The MAX6921 on a transmit-only SPI bus.
///
/// LOAD low lets data shift in; LOAD high latches it onto the outputs. BLANK high forces every
/// output low regardless of the latch.
pub struct Max6921<SPI, LOAD, BLANK> {
    spi: SPI,
    load: LOAD,
    blank: BLANK,
}

impl<SPI, LOAD, BLANK> Max6921<SPI, LOAD, BLANK>
where
    SPI: SpiBus,
    LOAD: OutputPin,
    BLANK: OutputPin,
{
    #[must_use]
    pub const fn new(spi: SPI, load: LOAD, blank: BLANK) -> Self {
        Self { spi, load, blank }
    }
}

impl<SPI, LOAD, BLANK> VfdDriver for Max6921<SPI, LOAD, BLANK>
where
    SPI: SpiBus,
    LOAD: OutputPin,
    BLANK: OutputPin,
{
    fn write_slot(&mut self, bits: u32) -> Result<()> {
        self.load.set_low().map_err(|_| Error::DriverBus)?;
        // Only the low 24 bits reach the driver.
        let [_, high, middle, low] = bits.to_be_bytes();
        self.spi
            .write(&[high, middle, low])
            .map_err(|_| Error::DriverBus)?;
        self.spi.flush().map_err(|_| Error::DriverBus)
    }

    fn latch(&mut self) -> Result<()> {
        self.load.set_high().map_err(|_| Error::DriverBus)
    }

    fn set_blank(&mut self, blank: bool) -> Result<()> {
        self.blank
            .set_state(blank.into())
            .map_err(|_| Error::DriverBus)
    }
}
