//! The clock's control side: RTC polling, button handling and the edit chain.
//!
//! See [`Clock`] for usage and [`Mode`] for the transitions.

pub mod state;

use embassy_futures::select::{Either, select};
use embassy_time::{Instant, Ticker};

use self::state::Mode;
use crate::brightness::Brightness;
use crate::button::{ButtonId, Buttons};
use crate::clock_time::ClockTime;
use crate::digit_frame::DigitFrame;
use crate::display::Display;
use crate::peripherals::{PowerSupply, Rtc, SettingsStore, SwitchInputs};
use crate::{Never, Result, SWITCH_CHECK_PERIOD, TIME_CHECK_PERIOD};

/// Control side of the VFD clock.
///
/// Owns the RTC, the settings store and the control-side [`Display`] handle. Button presses are
/// fed in through [`handle`](Self::handle) and RTC readings through
/// [`poll_time`](Self::poll_time); every visible change publishes a whole frame.
///
/// [`run`](Self::run) drives both at their fixed cadences until an error occurs.
pub struct Clock<'a, R, P, S> {
    rtc: R,
    display: Display<'a, P>,
    settings: S,
    mode: Mode,
    clock_time: ClockTime,
    pending: Option<ClockTime>,
}

impl<'a, R, P, S> Clock<'a, R, P, S>
where
    R: Rtc,
    P: PowerSupply,
    S: SettingsStore,
{
    /// Creates the clock. Nothing is read or shown until [`start`](Self::start).
    #[must_use]
    pub fn new(rtc: R, display: Display<'a, P>, settings: S) -> Self {
        Self {
            rtc,
            display,
            settings,
            mode: Mode::Time,
            clock_time: ClockTime::default(),
            pending: None,
        }
    }

    /// Starts the oscillator, enables battery backup, restores the saved brightness and shows
    /// the time.
    ///
    /// A missing or unreadable brightness record falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the RTC or the power supply fails.
    pub async fn start(&mut self) -> Result<()> {
        self.rtc.start()?;
        self.rtc.set_battery_backup(true)?;

        let brightness = match self.settings.load_brightness() {
            Ok(Some(fraction)) => Brightness::from_fraction(fraction),
            Ok(None) => {
                info!("No saved brightness; using the default");
                Brightness::DEFAULT
            }
            Err(err) => {
                warn!("Brightness record unreadable ({}); using the default", err);
                Brightness::DEFAULT
            }
        };
        self.display.set_brightness(brightness)?;

        self.clock_time = self.rtc.time()?;
        self.pending = None;
        self.mode = Mode::Time;
        info!("Clock started at {:?}", self.clock_time);
        self.render().await
    }

    /// Applies one button press: runs the mode transition, then redraws.
    ///
    /// # Errors
    ///
    /// Returns an error if the RTC, the settings store or the power supply fails.
    pub async fn handle(&mut self, button: ButtonId) -> Result<()> {
        let mode = self.mode;
        let next = mode.execute(self, button)?;
        if mode == Mode::Off && next == Mode::Off {
            return Ok(());
        }
        debug!("{:?} + {:?} -> {:?}", mode, button, next);
        self.mode = next;
        if !next.is_editing() {
            self.pending = None;
        }
        self.render().await
    }

    /// Reads the RTC and redraws `Time` or `Date` if the reading changed.
    ///
    /// Returns whether the reading changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the RTC or the power supply fails.
    pub async fn poll_time(&mut self) -> Result<bool> {
        let clock_time = self.rtc.time()?;
        if clock_time == self.clock_time {
            return Ok(false);
        }
        self.clock_time = clock_time;
        if matches!(self.mode, Mode::Time | Mode::Date) {
            self.render().await?;
        }
        Ok(true)
    }

    /// The frame the current mode shows, or `None` while the display is off.
    #[must_use]
    pub fn frame(&self) -> Option<DigitFrame> {
        self.mode.render(
            &self.clock_time,
            self.pending.as_ref(),
            self.display.brightness(),
        )
    }

    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// The latest RTC reading (or the latest committed time).
    #[must_use]
    pub const fn clock_time(&self) -> &ClockTime {
        &self.clock_time
    }

    /// The time being edited, while in the edit chain.
    #[must_use]
    pub const fn pending(&self) -> Option<&ClockTime> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn brightness(&self) -> Brightness {
        self.display.brightness()
    }

    /// Powers the tubes down. Used on the fatal error path; failures are only logged.
    pub async fn shutdown(&mut self) {
        self.display.shutdown().await;
    }

    /// Runs the clock: buttons at 100 Hz, RTC at 50 Hz.
    ///
    /// Only returns on error, after shutting the display down.
    ///
    /// # Errors
    ///
    /// Returns the first error from any collaborator.
    pub async fn run<W: SwitchInputs>(&mut self, mut switches: W) -> Result<Never> {
        let Err(err) = self.inner_run(&mut switches).await;
        error!("Clock stopped: {}", err);
        self.shutdown().await;
        Err(err)
    }

    async fn inner_run<W: SwitchInputs>(&mut self, switches: &mut W) -> Result<Never> {
        self.start().await?;
        let mut buttons = Buttons::new();
        let mut switch_ticker = Ticker::every(SWITCH_CHECK_PERIOD);
        let mut time_ticker = Ticker::every(TIME_CHECK_PERIOD);
        loop {
            match select(switch_ticker.next(), time_ticker.next()).await {
                Either::First(()) => {
                    let levels = switches.levels()?;
                    for button in buttons.poll(levels, Instant::now()) {
                        self.handle(button).await?;
                    }
                }
                Either::Second(()) => {
                    self.poll_time().await?;
                }
            }
        }
    }

    async fn render(&mut self) -> Result<()> {
        match self.frame() {
            Some(frame) => self.display.publish(frame).await,
            None => self.display.turn_off().await,
        }
    }

    /// Seeds the pending time from the latest reading, with seconds zeroed.
    fn begin_edit(&mut self) {
        self.pending = Some(ClockTime {
            second: 0,
            ..self.clock_time
        });
    }

    fn edit_pending(&mut self, edit: impl FnOnce(&mut ClockTime)) {
        if let Some(pending) = self.pending.as_mut() {
            edit(pending);
        }
    }

    /// Writes the edited hour and minute (with the seeded date) and restarts the oscillator.
    fn commit_provisional(&mut self) -> Result<()> {
        let Some(pending) = self.pending else {
            return Ok(());
        };
        self.rtc.set_time(&pending)?;
        self.rtc.start()?;
        self.clock_time = pending;
        info!("Provisional time set: {:?}", pending);
        Ok(())
    }

    /// Writes the edited date with the running time of day, restarts the oscillator and saves
    /// the brightness.
    fn commit_final(&mut self) -> Result<()> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let committed = pending.with_time_of_day(&self.clock_time).validated();
        // The oscillator must be running again before anything else can fail.
        self.rtc.set_time(&committed)?;
        self.rtc.start()?;
        self.clock_time = committed;
        self.settings.save_brightness(self.display.brightness().fraction())?;
        info!("Time set: {:?}", committed);
        Ok(())
    }

    fn step_brightness(&mut self, step: fn(Brightness) -> Brightness) -> Result<()> {
        let brightness = step(self.display.brightness());
        self.display.set_brightness(brightness)
    }
}
