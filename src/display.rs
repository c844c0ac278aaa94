//! Multiplexed VFD display: a shared frame cell, the control-side handle that publishes into it,
//! and the refresh side that lights one tube per tick.
//!
//! The control side awaits the lock and holds it only for a frame copy. The refresh side never
//! waits: under contention it redraws from its last-known-good copy, so the refresh cadence is
//! independent of RTC, flash or button work on the control side.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Ticker;

use crate::brightness::Brightness;
use crate::digit_frame::DigitFrame;
use crate::peripherals::{PowerSupply, VfdDriver};
use crate::{Never, REFRESH_PERIOD, Result, TUBE_COUNT};

/// What the refresh side draws: a whole frame, and whether the tubes are lit at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Published {
    pub frame: DigitFrame,
    pub lit: bool,
}

impl Published {
    /// Nothing published yet, or the display has been turned off.
    pub const DARK: Self = Self {
        frame: DigitFrame::BLANK,
        lit: false,
    };
}

impl Default for Published {
    fn default() -> Self {
        Self::DARK
    }
}

/// Static for the [`Display`] and its [`Refresher`].
pub struct DisplayStatic(Mutex<CriticalSectionRawMutex, Published>);

impl DisplayStatic {
    /// Creates static resources for the display, initially dark.
    #[must_use]
    pub const fn new() -> Self {
        Self(Mutex::new(Published::DARK))
    }

    async fn store(&self, published: Published) {
        *self.0.lock().await = published;
    }

    /// Copies the current state out without waiting. `None` while the control side holds it.
    fn try_load(&self) -> Option<Published> {
        self.0.try_lock().ok().map(|published| *published)
    }
}

impl Default for DisplayStatic {
    fn default() -> Self {
        Self::new()
    }
}

/// Control-side handle: publishes frames and owns the tube power supply.
pub struct Display<'a, P> {
    display_static: &'a DisplayStatic,
    power: P,
    brightness: Brightness,
    lit: bool,
}

impl<'a, P: PowerSupply> Display<'a, P> {
    /// Creates the control-side handle. The display starts dark.
    #[must_use]
    pub const fn new(display_static: &'a DisplayStatic, power: P, brightness: Brightness) -> Self {
        Self {
            display_static,
            power,
            brightness,
            lit: false,
        }
    }

    /// Replaces the whole frame and lights the tubes.
    ///
    /// The lock is held only for the copy; the boost converter and filament are switched on
    /// afterwards. The refresh side releases the blank line on its next tick.
    ///
    /// # Errors
    ///
    /// Returns an error if the power supply cannot be switched on.
    pub async fn publish(&mut self, frame: DigitFrame) -> Result<()> {
        #[cfg(feature = "display-trace")]
        info!("publish: {:?}", frame);
        self.display_static
            .store(Published { frame, lit: true })
            .await;
        self.lit = true;
        self.power.set_boost_duty(self.brightness)?;
        self.power.set_filament(true)
    }

    /// Darkens the tubes and powers down the boost converter and filament.
    ///
    /// # Errors
    ///
    /// Returns an error if the power supply cannot be switched off.
    pub async fn turn_off(&mut self) -> Result<()> {
        self.display_static.store(Published::DARK).await;
        self.lit = false;
        self.power.boost_off()?;
        self.power.set_filament(false)
    }

    /// Changes the boost duty, immediately if the tubes are lit.
    ///
    /// # Errors
    ///
    /// Returns an error if the PWM output fails.
    pub fn set_brightness(&mut self, brightness: Brightness) -> Result<()> {
        self.brightness = brightness;
        if self.lit {
            self.power.set_boost_duty(brightness)?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn brightness(&self) -> Brightness {
        self.brightness
    }

    #[must_use]
    pub const fn is_lit(&self) -> bool {
        self.lit
    }

    /// Best-effort power down on the fatal error path. Failures are logged, not returned.
    pub async fn shutdown(&mut self) {
        self.display_static.store(Published::DARK).await;
        self.lit = false;
        if let Err(err) = self.power.boost_off() {
            warn!("shutdown: boost off failed: {}", err);
        }
        if let Err(err) = self.power.set_filament(false) {
            warn!("shutdown: filament off failed: {}", err);
        }
    }
}

/// Refresh side: lights one tube per [`tick`](Self::tick), cycling through all nine.
pub struct Refresher<'a> {
    display_static: &'a DisplayStatic,
    last_good: Published,
    slot: usize,
    contended_ticks: u32,
}

impl<'a> Refresher<'a> {
    #[must_use]
    pub const fn new(display_static: &'a DisplayStatic) -> Self {
        Self {
            display_static,
            last_good: Published::DARK,
            slot: 0,
            contended_ticks: 0,
        }
    }

    /// Draws the next tube.
    ///
    /// The shared state is copied with `try_lock` and released before any driver I/O. While the
    /// display is dark the blank line is held and nothing is shifted.
    ///
    /// # Errors
    ///
    /// Returns an error if any driver line or transfer fails.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "Modulo keeps the slot index in range"
    )]
    #[expect(clippy::arithmetic_side_effects, reason = "Slot index is below TUBE_COUNT")]
    pub fn tick<D: VfdDriver>(&mut self, driver: &mut D) -> Result<()> {
        match self.display_static.try_load() {
            Some(published) => self.last_good = published,
            None => self.contended_ticks = self.contended_ticks.wrapping_add(1),
        }

        if !self.last_good.lit {
            return driver.set_blank(true);
        }

        driver.set_blank(true)?;
        driver.write_slot(self.last_good.frame.slot(self.slot))?;
        driver.latch()?;
        driver.set_blank(false)?;
        self.slot = (self.slot + 1) % TUBE_COUNT;
        Ok(())
    }

    /// The state drawn by the latest tick.
    #[must_use]
    pub const fn last_good(&self) -> &Published {
        &self.last_good
    }

    /// The slot the next tick will draw.
    #[must_use]
    pub const fn slot(&self) -> usize {
        self.slot
    }

    /// Ticks that found the lock held and redrew the last-known-good frame.
    #[must_use]
    pub const fn contended_ticks(&self) -> u32 {
        self.contended_ticks
    }
}

/// Drives `refresher` at the display refresh rate until the driver fails.
///
/// The driver is borrowed so the caller can still blank it after an error.
///
/// # Errors
///
/// Returns the first driver error.
pub async fn refresh_loop<D: VfdDriver>(
    mut refresher: Refresher<'_>,
    driver: &mut D,
) -> Result<Never> {
    let mut ticker = Ticker::every(REFRESH_PERIOD);
    loop {
        refresher.tick(driver)?;
        ticker.next().await;
    }
}
