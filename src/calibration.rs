//! Self-calibration of the RTC oscillator trim against a reference clock.
//!
//! Each cycle syncs the RTC to the reference, applies the current trim and starts the
//! oscillator, then compares elapsed seconds once a minute. The first window of a cycle only
//! records the whole-second offset between the two clocks at sync time. The first window that
//! shows drift beyond that offset moves the trim by the current resolution, in the direction that
//! cancels the drift, and halves the resolution (successive approximation). A new cycle starts
//! after every correction.
//!
//! [`DriftMonitor`] is the fixed-trim variant: it syncs once and logs drift forever.

use embassy_time::{Instant, Timer};

use crate::clock_time::ClockTime;
use crate::peripherals::{Indicator, ReferenceClock, Rtc};
use crate::{
    CALIBRATION_POLL, CALIBRATION_WINDOW_SECONDS, CLOCKS_PER_TRIM_UNIT, Error, MAX_TRIM,
    MAX_TRIM_RESOLUTION, Never, OSCILLATOR_HZ, Result,
};

/// One comparison of the RTC against the reference, in whole seconds since the cycle started.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    pub local_sec: i64,
    pub rtc_sec: i64,
    /// RTC-minus-reference seconds recorded on the first window of the cycle.
    pub offset: i64,
    /// Parts per million the RTC runs slow (positive) or fast (negative).
    pub ppm: f32,
    /// The trim that would cancel `ppm` exactly. Informational only.
    pub trim_delta: f32,
}

impl Measurement {
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "Second counts stay far below 2^24")]
    pub fn new(local_sec: i64, rtc_sec: i64, offset: i64) -> Self {
        let drift = drift_seconds(local_sec, rtc_sec, offset);
        let ppm = if local_sec > 0 {
            drift as f32 / local_sec as f32 * 1_000_000.0
        } else {
            0.0
        };
        let trim_delta = ppm * OSCILLATOR_HZ * 60.0 / (1_000_000.0 * CLOCKS_PER_TRIM_UNIT);
        Self {
            local_sec,
            rtc_sec,
            offset,
            ppm,
            trim_delta,
        }
    }

    /// Whole seconds the RTC has lost (positive) or gained (negative) beyond the initial offset.
    #[must_use]
    pub const fn drift_seconds(&self) -> i64 {
        drift_seconds(self.local_sec, self.rtc_sec, self.offset)
    }
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "Second counts of one calibration run are far from i64 limits"
)]
const fn drift_seconds(local_sec: i64, rtc_sec: i64, offset: i64) -> i64 {
    local_sec - rtc_sec + offset
}

/// What one window of a calibration cycle decided.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// No drift yet; keep measuring.
    Measured(Measurement),
    /// The trim moved. `out_of_range` is set when the step had to be clamped to `±127`.
    Adjusted {
        measurement: Measurement,
        trim: i8,
        out_of_range: bool,
    },
}

/// Successive-approximation state: the trim under test and the size of the next step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    trim: i8,
    resolution: u8,
    offset: Option<i64>,
}

impl Calibration {
    /// Starts at zero trim with the widest step.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_trim(0)
    }

    /// Starts from a known trim, still with the widest step.
    #[must_use]
    pub const fn with_trim(trim: i8) -> Self {
        Self {
            trim,
            resolution: MAX_TRIM_RESOLUTION,
            offset: None,
        }
    }

    #[must_use]
    pub const fn trim(&self) -> i8 {
        self.trim
    }

    #[must_use]
    pub const fn resolution(&self) -> u8 {
        self.resolution
    }

    /// Forgets the offset so the next window of the new cycle records it afresh.
    pub const fn begin_cycle(&mut self) {
        self.offset = None;
    }

    /// Feeds one window's elapsed seconds.
    ///
    /// The first call of a cycle records the offset and so never corrects. Later calls correct
    /// the trim as soon as any whole-second drift shows.
    #[expect(
        clippy::arithmetic_side_effects,
        clippy::integer_division_remainder_used,
        reason = "Trim arithmetic is done in i16 and clamped back to i8"
    )]
    pub fn observe(&mut self, local_sec: i64, rtc_sec: i64) -> Outcome {
        let offset = *self
            .offset
            .get_or_insert_with(|| rtc_sec.saturating_sub(local_sec));
        let measurement = Measurement::new(local_sec, rtc_sec, offset);
        let drift = measurement.drift_seconds();
        if drift == 0 || local_sec <= 0 {
            return Outcome::Measured(measurement);
        }

        // The RTC lost time (drift > 0): add clocks.
        let step = i16::from(self.resolution);
        let target = if drift > 0 {
            i16::from(self.trim) + step
        } else {
            i16::from(self.trim) - step
        };
        let limit = i16::from(MAX_TRIM);
        let clamped = target.clamp(-limit, limit);
        self.trim = i8::try_from(clamped).unwrap_or(self.trim);
        self.resolution = (self.resolution / 2).clamp(1, MAX_TRIM_RESOLUTION);
        Outcome::Adjusted {
            measurement,
            trim: self.trim,
            out_of_range: clamped != target,
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs calibration cycles forever, writing each new trim to the RTC.
///
/// The indicator is lit (and stays lit) once the search runs out of trim range.
///
/// # Errors
///
/// Returns the first RTC, reference or indicator error.
pub async fn run_calibration<R, C, I>(
    mut rtc: R,
    mut reference: C,
    mut indicator: I,
    calibration: &mut Calibration,
) -> Result<Never>
where
    R: Rtc,
    C: ReferenceClock,
    I: Indicator,
{
    indicator.set(false)?;
    loop {
        rtc.stop()?;
        let start = reference.now()?;
        rtc.set_time(&start)?;
        rtc.set_trim(calibration.trim())?;
        rtc.start()?;
        calibration.begin_cycle();
        let rtc_trim = rtc.trim()?;
        info!(
            "Calibration cycle: trim {}, resolution {}, rtc trim {}",
            calibration.trim(),
            calibration.resolution(),
            rtc_trim
        );

        let mut window_start = start;
        loop {
            let local_time = next_window(&mut reference, &mut window_start).await?;
            let rtc_time = rtc.time()?;
            let local_sec = local_time.seconds_since(&start);
            let rtc_sec = rtc_time.seconds_since(&start);
            match calibration.observe(local_sec, rtc_sec) {
                Outcome::Measured(measurement) => log_measurement(&measurement),
                Outcome::Adjusted {
                    measurement,
                    trim,
                    out_of_range,
                } => {
                    log_measurement(&measurement);
                    info!("Trim -> {}", trim);
                    if out_of_range {
                        warn!("Trim search left the register range; clamped to {}", trim);
                        indicator.set(true)?;
                    }
                    break;
                }
            }
        }
    }
}

/// Drift log at a fixed trim: one [`Measurement`] per window, never correcting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriftMonitor {
    trim: i8,
    drift_seen: bool,
}

impl DriftMonitor {
    #[must_use]
    pub const fn new(trim: i8) -> Self {
        Self {
            trim,
            drift_seen: false,
        }
    }

    #[must_use]
    pub const fn trim(&self) -> i8 {
        self.trim
    }

    /// Whether any window so far showed drift. Latches once set.
    #[must_use]
    pub const fn drift_seen(&self) -> bool {
        self.drift_seen
    }

    /// Measures one window against the single sync at start (no offset correction).
    pub fn observe(&mut self, local_sec: i64, rtc_sec: i64) -> Measurement {
        let measurement = Measurement::new(local_sec, rtc_sec, 0);
        if measurement.drift_seconds() != 0 {
            self.drift_seen = true;
        }
        measurement
    }
}

/// Applies `monitor`'s trim, syncs the RTC once and logs drift every window forever.
///
/// The indicator lights on the first window that shows any drift.
///
/// # Errors
///
/// Returns the first RTC, reference or indicator error.
pub async fn run_drift_monitor<R, C, I>(
    mut rtc: R,
    mut reference: C,
    mut indicator: I,
    monitor: &mut DriftMonitor,
) -> Result<Never>
where
    R: Rtc,
    C: ReferenceClock,
    I: Indicator,
{
    indicator.set(false)?;
    rtc.set_trim(monitor.trim())?;
    let start = reference.now()?;
    rtc.set_time(&start)?;
    rtc.start()?;
    let rtc_trim = rtc.trim()?;
    info!("Drift monitor started: trim {}", rtc_trim);

    let mut window_start = start;
    loop {
        let local_time = next_window(&mut reference, &mut window_start).await?;
        let rtc_time = rtc.time()?;
        let measurement =
            monitor.observe(local_time.seconds_since(&start), rtc_time.seconds_since(&start));
        log_measurement(&measurement);
        if monitor.drift_seen() {
            indicator.set(true)?;
        }
    }
}

/// Polls `reference` until a full window has passed since `window_start`, then moves it.
async fn next_window<C: ReferenceClock>(
    reference: &mut C,
    window_start: &mut ClockTime,
) -> Result<ClockTime> {
    loop {
        let now = reference.now()?;
        if now.seconds_since(window_start) >= CALIBRATION_WINDOW_SECONDS {
            *window_start = now;
            return Ok(now);
        }
        Timer::after(CALIBRATION_POLL).await;
    }
}

fn log_measurement(measurement: &Measurement) {
    info!(
        "sec local: {}, sec rtc: {}, delta: {}, ppm: {}, trim delta: {}, offset: {}",
        measurement.local_sec,
        measurement.rtc_sec,
        measurement.rtc_sec.saturating_sub(measurement.local_sec),
        measurement.ppm,
        measurement.trim_delta,
        measurement.offset
    );
}

/// Reference time from the MCU's crystal-driven monotonic timer, anchored at a known reading.
///
/// The RP2040 timer runs from the 12 MHz crystal, which is far more stable than the RTC's
/// 32.768 kHz watch crystal over a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonotonicReference {
    epoch: ClockTime,
    started: Instant,
}

impl MonotonicReference {
    #[must_use]
    pub const fn new(epoch: ClockTime, started: Instant) -> Self {
        Self { epoch, started }
    }

    /// The reference reading at `now`. `None` before `started` or past the supported range.
    #[must_use]
    pub fn at(&self, now: Instant) -> Option<ClockTime> {
        let elapsed = now.checked_duration_since(self.started)?;
        let seconds = i64::try_from(elapsed.as_secs()).ok()?;
        self.epoch.plus_seconds(seconds)
    }
}

impl ReferenceClock for MonotonicReference {
    fn now(&mut self) -> Result<ClockTime> {
        self.at(Instant::now()).ok_or(Error::ReferenceTime)
    }
}
