//! Firmware library for a nine-tube VFD clock on a Raspberry Pi Pico (RP2040).
//!
//! The control side ([`Clock`]) reads the MCP7940 RTC, runs the front-panel state machine and
//! publishes [`DigitFrame`]s; the refresh side ([`Refresher`]) multiplexes the latest frame onto
//! the tubes through a MAX6921. [`calibration`] trims the RTC oscillator against a reference.
//!
//! Everything above the board wiring in `hardware` (`pico1` only) is generic over the traits in
//! [`peripherals`], so it runs on the host under `cargo test`.
#![cfg_attr(not(test), no_std)]
#![expect(clippy::future_not_send, reason = "Single-threaded executors")]

// Must come first so the logging macros are visible to the modules below.
mod fmt;

mod brightness;
mod brightness_store;
mod button;
pub mod calibration;
mod clock;
mod clock_time;
mod debounce;
mod digit_frame;
mod display;
mod display_fields;
mod error;
#[cfg(feature = "pico1")]
pub mod hardware;
mod max6921;
pub mod mcp7940;
mod never;
pub mod peripherals;
mod power;
pub mod segment;
mod shared_constants;

// Re-export commonly used items
pub use brightness::Brightness;
pub use brightness_store::BrightnessStore;
pub use button::{Button, ButtonId, Buttons};
pub use calibration::{Calibration, DriftMonitor, Measurement, MonotonicReference, Outcome};
pub use clock::Clock;
pub use clock::state::Mode;
pub use clock_time::ClockTime;
pub use debounce::Debouncer;
pub use digit_frame::{DigitFrame, Glyph};
pub use display::{Display, DisplayStatic, Published, Refresher, refresh_loop};
pub use display_fields::DisplayFields;
pub use error::{Error, Result};
pub use max6921::Max6921;
pub use mcp7940::Mcp7940;
pub use never::Never;
pub use power::PowerRail;
pub use shared_constants::*;
