//! Display tasks
//!
//! `display_task` is the consumer: it sleeps on the `SAMPLE_READY`
//! doorbell and then takes whatever is newest in the mailbox. With the
//! `foreground` feature, `foreground_task` replaces both sides and samples
//! directly at the configured period.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;

use slidegauge_core::traits::{DisplayError, TextDisplay};
use slidegauge_drivers::display::{Pcd8544, Screen};

#[cfg(not(feature = "foreground"))]
use {crate::channels::SAMPLE_READY, slidegauge_core::consumer::Consumer};

/// Nokia 5110 on SPI0 with a dedicated chip select
pub type Lcd = Pcd8544<
    ExclusiveDevice<Spi<'static, SPI0, Blocking>, Output<'static>, Delay>,
    Output<'static>,
    Output<'static>,
>;

/// Whatever the gauge is drawing on
pub enum GaugeDisplay {
    /// PCD8544 LCD
    Lcd(Lcd),
    /// No display attached; contents are logged instead
    Headless(Screen),
}

impl TextDisplay for GaugeDisplay {
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), DisplayError> {
        match self {
            GaugeDisplay::Lcd(lcd) => lcd.set_cursor(col, row),
            GaugeDisplay::Headless(screen) => screen.set_cursor(col, row),
        }
    }

    fn write_str(&mut self, text: &str) -> Result<(), DisplayError> {
        match self {
            GaugeDisplay::Lcd(lcd) => lcd.write_str(text),
            GaugeDisplay::Headless(screen) => screen.write_str(text),
        }
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        match self {
            GaugeDisplay::Lcd(lcd) => lcd.flush(),
            GaugeDisplay::Headless(screen) => {
                screen.flush()?;
                if screen.is_dirty() {
                    debug!("{}", screen);
                    screen.mark_clean();
                }
                Ok(())
            }
        }
    }
}

/// Display task - consumer side of the mailbox
#[cfg(not(feature = "foreground"))]
#[embassy_executor::task]
pub async fn display_task(mut consumer: Consumer<'static, GaugeDisplay>) {
    info!("Display task started");

    loop {
        SAMPLE_READY.wait().await;

        match consumer.poll() {
            Ok(Some(distance)) => {
                trace!("shown {} (0.001 cm)", distance.thousandths());
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Display write failed: {:?}", e);
            }
        }
    }
}

/// Foreground task - sample, convert and display in thread mode
#[cfg(feature = "foreground")]
#[embassy_executor::task]
pub async fn foreground_task(
    mut sampler: super::PotSampler,
    calibration: slidegauge_core::Calibration,
    mut display: GaugeDisplay,
    at: slidegauge_core::traits::Cursor,
    period: embassy_time::Duration,
) {
    use slidegauge_core::consumer::render_direct;

    info!("Foreground task started");

    let mut ticker = embassy_time::Ticker::every(period);

    loop {
        match render_direct(&mut sampler, &calibration, &mut display, at) {
            Ok(Some(distance)) => trace!("shown {} (0.001 cm)", distance.thousandths()),
            Ok(None) => trace!("no ADC reading yet"),
            Err(e) => warn!("Display write failed: {:?}", e),
        }
        ticker.next().await;
    }
}
