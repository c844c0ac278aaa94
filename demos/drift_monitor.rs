//! Runs the RTC at a fixed trim and logs its drift against the Pico's timer once a minute.
//!
//! The status LED lights on the first whole second of drift.
#![no_std]
#![no_main]

use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_time::Instant;
use panic_probe as _;
use vfd_clock::calibration::run_drift_monitor;
use vfd_clock::hardware::Hardware;
use vfd_clock::peripherals::Rtc;
use vfd_clock::{ClockTime, DriftMonitor, MonotonicReference, Never, Result};

/// Trim found by `calibrate` for this board's crystal.
const TRIM: i8 = -29;

#[embassy_executor::main]
pub async fn main(_spawner: Spawner) -> ! {
    let Err(err) = inner_main().await;
    panic!("{err}");
}

async fn inner_main() -> Result<Never> {
    let mut hardware = Hardware::new()?;

    let epoch = hardware.rtc.time().unwrap_or_else(|err| {
        defmt::warn!("RTC unreadable ({}); starting from a fixed epoch", err);
        ClockTime::new(2024, 1, 1, 0, 0, 0)
    });
    let reference = MonotonicReference::new(epoch, Instant::now());

    let mut monitor = DriftMonitor::new(TRIM);
    run_drift_monitor(hardware.rtc, reference, hardware.led, &mut monitor).await
}
