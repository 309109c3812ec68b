//! Slidegauge - Slide-Pot Distance Gauge Firmware
//!
//! Main firmware binary for RP2040 boards. A slide potentiometer on ADC0 is
//! sampled at a fixed rate by a task on an interrupt-priority executor;
//! changed readings are converted to 0.001 cm and published through a
//! single-slot mailbox to a thread-mode task that draws them on a Nokia
//! 5110 LCD.
//!
//! Pin assignment:
//! - GPIO26 (ADC0): slide pot wiper
//! - GPIO15: profiling output, high while a trigger tick runs
//! - GPIO17/18/19: LCD CS / SCK / DIN (SPI0)
//! - GPIO20/21: LCD D/C / RST

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use defmt::*;
use embassy_executor::Executor;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::gpio::{Level, Output, Pull};
use embassy_rp::peripherals::{PIN_17, PIN_18, PIN_19, PIN_20, PIN_21, SPI0};
use embassy_rp::spi::{self, Spi};
use embassy_rp::Peri;
use embassy_time::{Delay, Duration};
use embedded_hal_bus::spi::ExclusiveDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use slidegauge_core::config::{DisplayConfig, GaugeConfig};
use slidegauge_core::consumer::show_splash;
use slidegauge_drivers::display::{Pcd8544, Screen};
use slidegauge_drivers::sensor::AdcSampler;

use crate::tasks::{GaugeDisplay, RpAdc};

#[cfg(not(feature = "foreground"))]
use {
    embassy_executor::InterruptExecutor,
    embassy_rp::interrupt,
    embassy_rp::interrupt::{InterruptExt, Priority},
    slidegauge_core::consumer::Consumer,
    slidegauge_core::{Mailbox, SampleTrigger},
};

#[cfg(not(feature = "foreground"))]
mod channels;
mod config;
mod tasks;

/// PCD8544 maximum serial clock
const LCD_SPI_HZ: u32 = 4_000_000;

/// Executor for the sample task, driven by a software interrupt
#[cfg(not(feature = "foreground"))]
static EXECUTOR_HIGH: InterruptExecutor = InterruptExecutor::new();

/// Thread-mode executor for the display task
static EXECUTOR_LOW: StaticCell<Executor> = StaticCell::new();

/// Slot between the sample task and the display task
#[cfg(not(feature = "foreground"))]
static MAILBOX: StaticCell<Mailbox> = StaticCell::new();

#[cfg(not(feature = "foreground"))]
#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_HIGH.on_interrupt()
}

/// Main entry point
#[entry]
fn main() -> ! {
    info!("Slidegauge firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load();

    // Slide pot on GPIO26 / ADC0
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let channel = AdcChannel::new_pin(p.PIN_26, Pull::None);
    let sampler = AdcSampler::new(RpAdc::new(adc, channel));

    let mut display = init_display(
        &config.display,
        p.SPI0,
        p.PIN_18,
        p.PIN_19,
        p.PIN_17,
        p.PIN_20,
        p.PIN_21,
    );
    if let Err(e) = show_splash(&mut display, &config.display) {
        warn!("Splash failed: {:?}", e);
    }

    let period = Duration::from_micros(config.sampling.period_us());

    #[cfg(not(feature = "foreground"))]
    run_triggered(
        sampler,
        display,
        &config,
        period,
        Output::new(p.PIN_15, Level::Low),
    );

    #[cfg(feature = "foreground")]
    run_foreground(sampler, display, &config, period);
}

/// Start the sample task at interrupt priority and the display task in
/// thread mode
#[cfg(not(feature = "foreground"))]
fn run_triggered(
    sampler: tasks::PotSampler,
    display: GaugeDisplay,
    config: &GaugeConfig,
    period: Duration,
    probe: Output<'static>,
) -> ! {
    let mailbox = MAILBOX.init(Mailbox::new());
    let (publisher, receiver) = mailbox.split();

    let trigger = SampleTrigger::new(sampler, config.calibration, publisher);
    // Report tick counters about once per second
    let report_every = config.sampling.frequency_hz().max(1);

    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let spawner = EXECUTOR_HIGH.start(interrupt::SWI_IRQ_1);
    spawner
        .spawn(tasks::sample_task(trigger, probe, period, report_every))
        .unwrap();

    let consumer = Consumer::new(receiver, display, config.display.value_at);
    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(tasks::display_task(consumer)).unwrap();
        info!("All tasks spawned, gauge running");
    })
}

/// Sample and display from a single thread-mode task
#[cfg(feature = "foreground")]
fn run_foreground(
    sampler: tasks::PotSampler,
    display: GaugeDisplay,
    config: &GaugeConfig,
    period: Duration,
) -> ! {
    warn!("Foreground sampling mode: no trigger, no mailbox");

    let calibration = config.calibration;
    let at = config.display.value_at;
    let executor = EXECUTOR_LOW.init(Executor::new());
    executor.run(|spawner| {
        spawner
            .spawn(tasks::foreground_task(sampler, calibration, display, at, period))
            .unwrap();
    })
}

/// Bring up the LCD, or fall back to a logged in-memory screen
fn init_display(
    config: &DisplayConfig,
    spi0: Peri<'static, SPI0>,
    clk: Peri<'static, PIN_18>,
    mosi: Peri<'static, PIN_19>,
    cs: Peri<'static, PIN_17>,
    dc: Peri<'static, PIN_20>,
    rst: Peri<'static, PIN_21>,
) -> GaugeDisplay {
    if !config.enabled {
        info!("Display disabled in config, running headless");
        return GaugeDisplay::Headless(Screen::new());
    }

    let mut spi_config = spi::Config::default();
    spi_config.frequency = LCD_SPI_HZ;
    let bus = Spi::new_blocking_txonly(spi0, clk, mosi, spi_config);

    let cs = Output::new(cs, Level::High);
    let Ok(device) = ExclusiveDevice::new(bus, cs, Delay) else {
        warn!("LCD chip select unavailable, running headless");
        return GaugeDisplay::Headless(Screen::new());
    };

    let dc = Output::new(dc, Level::Low);
    let rst = Output::new(rst, Level::High);
    let mut lcd = Pcd8544::new(device, dc, rst);

    match lcd.init(&mut Delay) {
        Ok(()) => {
            info!("LCD initialized");
            GaugeDisplay::Lcd(lcd)
        }
        Err(e) => {
            let e = slidegauge_core::traits::DisplayError::from(e);
            warn!("LCD init failed: {:?}, running headless", e);
            GaugeDisplay::Headless(Screen::new())
        }
    }
}
