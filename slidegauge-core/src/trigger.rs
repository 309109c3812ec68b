//! Periodic sampling trigger (producer side)
//!
//! Called once per timer tick at interrupt priority. Each tick walks
//! `idle -> sampling -> evaluating -> idle`:
//!
//! 1. Take one raw sample. If the sampler has no valid reading yet, stop.
//! 2. If it equals the previous sample, stop: nothing is converted and the
//!    mailbox is left untouched (change filter).
//! 3. Otherwise remember it, convert it and publish the distance.
//!
//! [`SampleTrigger::on_tick`] takes `&mut self`, so a tick always runs to
//! completion before the next one can start. A tick either commits one new
//! mailbox value or changes nothing.

use crate::convert::Calibration;
use crate::distance::Distance;
use crate::mailbox::Publisher;
use crate::sample::RawSample;
use crate::traits::Sampler;

/// Result of one trigger tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Sampler has no valid reading yet; mailbox untouched
    NoReading,
    /// Sample unchanged since the last tick; mailbox untouched
    Unchanged(RawSample),
    /// New sample converted and published
    Published {
        /// Raw reading that triggered the update
        sample: RawSample,
        /// Distance written to the mailbox
        distance: Distance,
    },
}

impl TickOutcome {
    /// Check whether this tick wrote to the mailbox
    pub fn is_published(&self) -> bool {
        matches!(self, TickOutcome::Published { .. })
    }
}

/// Tick counters for profiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerStats {
    /// Total ticks handled
    pub ticks: u32,
    /// Ticks that published a new distance
    pub published: u32,
    /// Ticks suppressed by the change filter
    pub suppressed: u32,
    /// Ticks without a valid reading
    pub missed: u32,
}

/// Producer state machine
pub struct SampleTrigger<'a, S> {
    sampler: S,
    calibration: Calibration,
    publisher: Publisher<'a>,
    /// Previous raw sample; `None` until the first tick
    last_sample: Option<RawSample>,
    stats: TriggerStats,
}

impl<'a, S: Sampler> SampleTrigger<'a, S> {
    /// Create a new trigger
    ///
    /// The first tick always publishes, since no previous sample exists.
    pub fn new(sampler: S, calibration: Calibration, publisher: Publisher<'a>) -> Self {
        Self {
            sampler,
            calibration,
            publisher,
            last_sample: None,
            stats: TriggerStats::default(),
        }
    }

    /// Handle one timer tick
    pub fn on_tick(&mut self) -> TickOutcome {
        self.stats.ticks = self.stats.ticks.wrapping_add(1);

        let Some(sample) = self.sampler.try_sample() else {
            self.stats.missed = self.stats.missed.wrapping_add(1);
            return TickOutcome::NoReading;
        };

        if self.last_sample == Some(sample) {
            self.stats.suppressed = self.stats.suppressed.wrapping_add(1);
            return TickOutcome::Unchanged(sample);
        }

        self.last_sample = Some(sample);
        let distance = self.calibration.convert(sample);
        self.publisher.publish(distance);
        self.stats.published = self.stats.published.wrapping_add(1);

        TickOutcome::Published { sample, distance }
    }

    /// Previous raw sample, if any tick has run
    pub fn last_sample(&self) -> Option<RawSample> {
        self.last_sample
    }

    /// Tick counters
    pub fn stats(&self) -> TriggerStats {
        self.stats
    }

    /// Reset tick counters (e.g. after reporting them)
    pub fn reset_stats(&mut self) {
        self.stats = TriggerStats::default();
    }

    /// Get access to the underlying sampler
    pub fn sampler(&self) -> &S {
        &self.sampler
    }
}
