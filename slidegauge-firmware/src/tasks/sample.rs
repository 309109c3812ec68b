//! Periodic sampling task
//!
//! Runs on the interrupt-priority executor, so each tick preempts the
//! display task and runs to completion. The profiling pin is high for the
//! duration of the tick body; scope it to measure the trigger's cost.

use embassy_rp::adc::{Adc, Blocking, Channel};
use slidegauge_drivers::sensor::{AdcReader, AdcSampler};

#[cfg(not(feature = "foreground"))]
use {
    crate::channels::SAMPLE_READY,
    defmt::*,
    embassy_rp::gpio::Output,
    embassy_time::{Duration, Ticker},
    slidegauge_core::trigger::TickOutcome,
    slidegauge_core::SampleTrigger,
};

/// Slide pot wiper on an RP2040 ADC input
pub struct RpAdc {
    adc: Adc<'static, Blocking>,
    channel: Channel<'static>,
}

impl RpAdc {
    pub fn new(adc: Adc<'static, Blocking>, channel: Channel<'static>) -> Self {
        Self { adc, channel }
    }
}

impl AdcReader for RpAdc {
    fn read(&mut self) -> Result<u16, ()> {
        self.adc.blocking_read(&mut self.channel).map_err(|_| ())
    }
}

/// Sampler used by both the trigger and the foreground loop
pub type PotSampler = AdcSampler<RpAdc>;

/// Trigger owning the sampler and the mailbox publisher
#[cfg(not(feature = "foreground"))]
pub type Trigger = SampleTrigger<'static, PotSampler>;

/// Sample task - one trigger tick per period
///
/// Tick counters are logged and reset every `report_every` ticks.
#[cfg(not(feature = "foreground"))]
#[embassy_executor::task]
pub async fn sample_task(
    mut trigger: Trigger,
    mut probe: Output<'static>,
    period: Duration,
    report_every: u32,
) {
    info!("Sample task started ({} us period)", period.as_micros());

    let mut ticker = Ticker::every(period);

    loop {
        ticker.next().await;

        probe.set_high();
        let outcome = trigger.on_tick();
        probe.set_low();

        if let TickOutcome::Published { sample, distance } = outcome {
            trace!("sample {} -> {} (0.001 cm)", sample.get(), distance.thousandths());
            SAMPLE_READY.signal(());
        }

        let stats = trigger.stats();
        if stats.ticks >= report_every {
            debug!(
                "{} ticks: {} published, {} suppressed, {} without reading, {} ADC errors",
                stats.ticks,
                stats.published,
                stats.suppressed,
                stats.missed,
                trigger.sampler().errors()
            );
            trigger.reset_stats();
        }
    }
}
