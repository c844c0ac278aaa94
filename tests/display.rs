//! Host-level tests for frame hand-off between the control side and the refresh side.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use embassy_futures::block_on;
use vfd_clock::peripherals::{PowerSupply, VfdDriver};
use vfd_clock::{
    Brightness, ClockTime, DigitFrame, Display, DisplayFields, DisplayStatic, Error, Refresher,
    Result, TUBE_COUNT, refresh_loop,
};

struct NullPower;

impl PowerSupply for NullPower {
    fn set_boost_duty(&mut self, _brightness: Brightness) -> Result<()> {
        Ok(())
    }

    fn boost_off(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_filament(&mut self, _on: bool) -> Result<()> {
        Ok(())
    }
}

/// Keeps every word shifted into the driver.
#[derive(Default)]
struct WordLog {
    words: Vec<u32>,
    blanked: bool,
}

impl VfdDriver for WordLog {
    fn write_slot(&mut self, bits: u32) -> Result<()> {
        self.words.push(bits);
        Ok(())
    }

    fn latch(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_blank(&mut self, blank: bool) -> Result<()> {
        self.blanked = blank;
        Ok(())
    }
}

struct DeadDriver;

impl VfdDriver for DeadDriver {
    fn write_slot(&mut self, _bits: u32) -> Result<()> {
        Err(Error::DriverBus)
    }

    fn latch(&mut self) -> Result<()> {
        Err(Error::DriverBus)
    }

    fn set_blank(&mut self, _blank: bool) -> Result<()> {
        Err(Error::DriverBus)
    }
}

fn time_frame(time: &ClockTime) -> DigitFrame {
    DisplayFields::from_time(time).time_frame(false)
}

#[test]
fn refresh_side_never_draws_a_torn_frame() {
    let display_static = DisplayStatic::new();
    let first = time_frame(&ClockTime::new(2024, 1, 1, 11, 11, 11));
    let second =
        DisplayFields::from_time(&ClockTime::new(2099, 12, 31, 22, 22, 22)).date_frame(true);
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        scope.spawn(|| {
            let mut display = Display::new(&display_static, NullPower, Brightness::DEFAULT);
            for round in 0..5_000 {
                let frame = if round % 2 == 0 { first } else { second };
                block_on(display.publish(frame)).expect("publish");
            }
            done.store(true, Ordering::Release);
        });

        let mut refresher = Refresher::new(&display_static);
        let mut driver = WordLog::default();
        let mut ticks = 0_u64;
        while !done.load(Ordering::Acquire) || ticks < 100 {
            let slot = refresher.slot();
            refresher.tick(&mut driver).expect("tick");
            ticks += 1;

            let published = refresher.last_good();
            if !published.lit {
                continue;
            }
            assert!(published.frame == first || published.frame == second);
            let word = driver.words.last().copied().expect("a lit tick shifts a word");
            assert!(word == first.slot(slot) || word == second.slot(slot));
            assert!(!driver.blanked);
        }
    });
}

#[test]
fn refresher_cycles_every_tube_of_the_published_frame() {
    let display_static = DisplayStatic::new();
    let frame = time_frame(&ClockTime::new(2024, 7, 4, 9, 8, 7));
    let mut display = Display::new(&display_static, NullPower, Brightness::DEFAULT);
    block_on(display.publish(frame)).expect("publish");

    let mut refresher = Refresher::new(&display_static);
    let mut driver = WordLog::default();
    for _ in 0..TUBE_COUNT * 2 {
        refresher.tick(&mut driver).expect("tick");
    }

    let expected: Vec<u32> = frame.iter().chain(frame.iter()).copied().collect();
    assert_eq!(driver.words, expected);
    assert_eq!(refresher.slot(), 0);
    assert_eq!(refresher.contended_ticks(), 0);
}

#[test]
fn turned_off_display_only_blanks() {
    let display_static = DisplayStatic::new();
    let mut display = Display::new(&display_static, NullPower, Brightness::DEFAULT);
    block_on(display.publish(time_frame(&ClockTime::new(2024, 7, 4, 9, 8, 7)))).expect("publish");
    block_on(display.turn_off()).expect("turn off");
    assert!(!display.is_lit());

    let mut refresher = Refresher::new(&display_static);
    let mut driver = WordLog::default();
    refresher.tick(&mut driver).expect("tick");
    assert!(driver.words.is_empty());
    assert!(driver.blanked);
}

#[test]
fn refresh_loop_stops_on_the_first_driver_error() {
    let display_static = DisplayStatic::new();
    let Err(err) = block_on(refresh_loop(Refresher::new(&display_static), &mut DeadDriver));
    assert!(matches!(err, Error::DriverBus));
}
