//! The VFD clock firmware: time and date on nine tubes, set from three front-panel switches.
//!
//! Core 1 multiplexes the tubes; core 0 runs the clock state machine.
#![no_std]
#![no_main]

use defmt_rtt as _;
use embassy_executor::Spawner;
use panic_probe as _;
use vfd_clock::hardware::{Hardware, spawn_refresh};
use vfd_clock::{Brightness, Clock, Display, DisplayStatic, Never, Result};

static DISPLAY_STATIC: DisplayStatic = DisplayStatic::new();

#[embassy_executor::main]
pub async fn main(_spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let Err(err) = inner_main().await;
    panic!("{err}");
}

async fn inner_main() -> Result<Never> {
    let hardware = Hardware::new()?;
    defmt::info!("VFD clock starting");

    spawn_refresh(hardware.core1, &DISPLAY_STATIC, hardware.vfd);

    let display = Display::new(&DISPLAY_STATIC, hardware.power, Brightness::DEFAULT);
    let mut clock = Clock::new(hardware.rtc, display, hardware.settings);
    clock.run(hardware.switches).await
}
