//! RP2040 (Pico) wiring of the VFD clock board, and the core 1 refresh task.

use embassy_executor::Executor;
use embassy_rp::Peri;
use embassy_rp::flash::{Blocking as FlashBlocking, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{Stack, spawn_core1};
use embassy_rp::peripherals::{CORE1, FLASH, I2C0, SPI0};
use embassy_rp::pwm::{self, Pwm, PwmOutput};
use embassy_rp::spi::{self, Spi};
use static_cell::StaticCell;

use crate::brightness_store::BrightnessStore;
use crate::display::{self, DisplayStatic, Refresher};
use crate::max6921::Max6921;
use crate::mcp7940::Mcp7940;
use crate::peripherals::{Led, Switches, VfdDriver};
use crate::power::PowerRail;
use crate::{BOOST_PWM_FREQUENCY_HZ, Error, Result};

/// On-board QSPI flash of the Pico.
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

const RTC_I2C_FREQUENCY_HZ: u32 = 400_000;
const VFD_SPI_FREQUENCY_HZ: u32 = 1_000_000;
const CORE1_STACK_SIZE: usize = 4096;

pub type VfdSpi = Spi<'static, SPI0, spi::Blocking>;
pub type Vfd = Max6921<VfdSpi, Output<'static>, Output<'static>>;
pub type BoardRtc = Mcp7940<I2c<'static, I2C0, i2c::Blocking>>;
pub type BoardPower = PowerRail<PwmOutput<'static>, Output<'static>>;
pub type BoardSettings = BrightnessStore<Flash<'static, FLASH, FlashBlocking, FLASH_SIZE>>;
pub type BoardSwitches = Switches<Input<'static>>;
pub type BoardLed = Led<Output<'static>>;

/// Every peripheral of the board, configured and idle: tubes blanked, boost and filament off.
pub struct Hardware {
    pub rtc: BoardRtc,
    pub vfd: Vfd,
    pub power: BoardPower,
    pub settings: BoardSettings,
    pub switches: BoardSwitches,
    pub led: BoardLed,
    pub core1: Peri<'static, CORE1>,
}

impl Hardware {
    /// Initializes the RP2040 and claims the board's pins.
    ///
    /// | Function              | Pin                     |
    /// |-----------------------|-------------------------|
    /// | Boost PWM             | GPIO17 (PWM slice 0 B)  |
    /// | Filament enable       | GPIO18                  |
    /// | Switches (top→bottom) | GPIO26, GPIO27, GPIO28  |
    /// | RTC I2C0 SDA / SCL    | GPIO20 / GPIO21         |
    /// | VFD SPI0 SCK / MOSI   | GPIO6 / GPIO7           |
    /// | VFD LOAD / BLANK      | GPIO8 / GPIO9           |
    /// | Status LED            | GPIO25                  |
    ///
    /// # Errors
    ///
    /// Returns an error if the boost PWM carrier cannot be derived from the system clock or its
    /// output cannot be claimed.
    pub fn new() -> Result<Self> {
        let peripherals = embassy_rp::init(embassy_rp::config::Config::default());

        // 125 MHz system clock gives top = 199.
        let mut pwm_config = pwm::Config::default();
        pwm_config.top = embassy_rp::clocks::clk_sys_freq()
            .checked_div(BOOST_PWM_FREQUENCY_HZ)
            .and_then(|divisor| divisor.checked_sub(1))
            .and_then(|top| u16::try_from(top).ok())
            .ok_or(Error::PowerOutput)?;
        pwm_config.compare_b = 0;
        let (_, boost) =
            Pwm::new_output_b(peripherals.PWM_SLICE0, peripherals.PIN_17, pwm_config).split();
        let boost = boost.ok_or(Error::PowerOutput)?;
        let filament = Output::new(peripherals.PIN_18, Level::Low);

        let switches = Switches::new([
            Input::new(peripherals.PIN_26, Pull::Up),
            Input::new(peripherals.PIN_27, Pull::Up),
            Input::new(peripherals.PIN_28, Pull::Up),
        ]);

        let mut i2c_config = i2c::Config::default();
        i2c_config.frequency = RTC_I2C_FREQUENCY_HZ;
        let i2c = I2c::new_blocking(
            peripherals.I2C0,
            peripherals.PIN_21,
            peripherals.PIN_20,
            i2c_config,
        );

        let mut spi_config = spi::Config::default();
        spi_config.frequency = VFD_SPI_FREQUENCY_HZ;
        let spi = Spi::new_blocking_txonly(
            peripherals.SPI0,
            peripherals.PIN_6,
            peripherals.PIN_7,
            spi_config,
        );
        let load = Output::new(peripherals.PIN_8, Level::High);
        let blank = Output::new(peripherals.PIN_9, Level::High);

        let flash = Flash::<_, FlashBlocking, FLASH_SIZE>::new_blocking(peripherals.FLASH);

        Ok(Self {
            rtc: Mcp7940::new(i2c),
            vfd: Max6921::new(spi, load, blank),
            power: PowerRail::new(boost, filament),
            settings: BrightnessStore::at_end(flash),
            switches,
            led: Led::new(Output::new(peripherals.PIN_25, Level::Low)),
            core1: peripherals.CORE1,
        })
    }
}

static CORE1_STACK: StaticCell<Stack<CORE1_STACK_SIZE>> = StaticCell::new();
static CORE1_EXECUTOR: StaticCell<Executor> = StaticCell::new();

/// Starts the display refresh task in its own executor on core 1.
///
/// Core 0 keeps the control side; the two only share `display_static`.
pub fn spawn_refresh(
    core1: Peri<'static, CORE1>,
    display_static: &'static DisplayStatic,
    vfd: Vfd,
) {
    spawn_core1(core1, CORE1_STACK.init(Stack::new()), move || {
        let executor = CORE1_EXECUTOR.init(Executor::new());
        executor.run(|spawner| match refresh_task(display_static, vfd) {
            Ok(token) => spawner.spawn(token),
            Err(err) => panic!("{:?}", err),
        })
    });
}

#[embassy_executor::task]
async fn refresh_task(display_static: &'static DisplayStatic, mut vfd: Vfd) -> ! {
    let Err(err) = display::refresh_loop(Refresher::new(display_static), &mut vfd).await;
    // Park the tubes dark before reporting.
    if let Err(blank_err) = vfd.set_blank(true) {
        warn!("refresh: blanking failed: {}", blank_err);
    }
    panic!("{err}");
}
