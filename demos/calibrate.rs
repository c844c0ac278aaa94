//! Trims the RTC oscillator against the Pico's crystal-driven timer.
//!
//! Leave it running and read the log over RTT; the status LED lights if the search runs out of
//! trim range. Tubes stay dark.
#![no_std]
#![no_main]

use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_time::Instant;
use panic_probe as _;
use vfd_clock::calibration::run_calibration;
use vfd_clock::hardware::Hardware;
use vfd_clock::peripherals::Rtc;
use vfd_clock::{Calibration, ClockTime, MonotonicReference, Never, Result};

#[embassy_executor::main]
pub async fn main(_spawner: Spawner) -> ! {
    let Err(err) = inner_main().await;
    panic!("{err}");
}

async fn inner_main() -> Result<Never> {
    let mut hardware = Hardware::new()?;

    // Only elapsed seconds matter, so any valid starting reading will do.
    let epoch = hardware.rtc.time().unwrap_or_else(|err| {
        defmt::warn!("RTC unreadable ({}); starting from a fixed epoch", err);
        ClockTime::new(2024, 1, 1, 0, 0, 0)
    });
    let reference = MonotonicReference::new(epoch, Instant::now());

    let mut calibration = Calibration::new();
    run_calibration(hardware.rtc, reference, hardware.led, &mut calibration).await
}
