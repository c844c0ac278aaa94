use embassy_time::Duration;

/// Number of tubes on the display. The ninth tube carries the edit marker.
pub const TUBE_COUNT: usize = 9;

/// Number of front-panel buttons.
pub const BUTTON_COUNT: usize = 3;

pub const DISPLAY_FREQUENCY_HZ: u64 = 600;
pub const SWITCH_CHECK_FREQUENCY_HZ: u64 = 100;
pub const TIME_CHECK_FREQUENCY_HZ: u64 = 50;

/// Period of one refresh tick (one tube lit per tick).
pub const REFRESH_PERIOD: Duration = Duration::from_micros(1_000_000 / DISPLAY_FREQUENCY_HZ);
pub const SWITCH_CHECK_PERIOD: Duration =
    Duration::from_micros(1_000_000 / SWITCH_CHECK_FREQUENCY_HZ);
pub const TIME_CHECK_PERIOD: Duration = Duration::from_micros(1_000_000 / TIME_CHECK_FREQUENCY_HZ);

/// A raw level must hold for longer than this before a switch changes its logical value.
pub const BUTTON_DEBOUNCE_DELAY: Duration = Duration::from_millis(50);

pub const MIN_YEAR: u16 = 1972;
pub const MAX_YEAR: u16 = 2500;

pub const MIN_BRIGHTNESS_PERCENT: u8 = 50;
pub const MAX_BRIGHTNESS_PERCENT: u8 = 75;
pub const DEFAULT_BRIGHTNESS_PERCENT: u8 = 60;

/// Boost converter PWM carrier.
pub const BOOST_PWM_FREQUENCY_HZ: u32 = 625_000;

/// Length of one drift measurement window, in seconds.
pub const CALIBRATION_WINDOW_SECONDS: i64 = 60;
/// Idle wait between reference-clock polls while a window is open.
pub const CALIBRATION_POLL: Duration = Duration::from_millis(1);

/// Nominal RTC crystal frequency.
pub const OSCILLATOR_HZ: f32 = 32_768.0;
/// Each trim unit adds or removes this many oscillator clocks per minute.
pub const CLOCKS_PER_TRIM_UNIT: f32 = 2.0;

pub const MAX_TRIM: i8 = 127;
pub const MAX_TRIM_RESOLUTION: u8 = 127;
