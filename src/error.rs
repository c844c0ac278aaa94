use derive_more::derive::{Display, Error};

/// A specialized `Result` where the error is this crate's `Error` type.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Define a unified error type for this crate.
///
/// Collaborator implementations map their bus- or pin-specific errors onto these variants, so
/// the control loop can propagate any of them with `?` and reach the single shutdown path.
#[derive(Debug, Display, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[display("RTC bus transfer failed")]
    RtcBus,

    #[display("RTC registers hold an impossible date or time")]
    RtcInvalidData,

    #[display("Reference clock reading is out of range")]
    ReferenceTime,

    #[display("VFD driver transfer failed")]
    DriverBus,

    #[display("Error setting power output state")]
    PowerOutput,

    #[display("Error reading switch input")]
    SwitchInput,

    #[display("Error setting indicator output")]
    IndicatorOutput,

    #[display("Settings storage operation failed")]
    Storage,

    #[display("Settings storage record is corrupted")]
    StorageCorrupted,
}
