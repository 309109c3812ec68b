//! Sampler trait
//!
//! A sampler triggers one analog conversion and returns the raw reading.
//! It is called from the interrupt-priority trigger in normal operation
//! and from the foreground loop in foreground sampling mode, so
//! implementations must not block or allocate.

use crate::sample::RawSample;

/// Source of raw sensor readings
pub trait Sampler {
    /// Acquire one raw sample
    ///
    /// Always succeeds within the converter's domain.
    fn sample(&mut self) -> RawSample;

    /// Acquire one sample, if the hardware has produced a valid reading
    ///
    /// The default always succeeds. Samplers whose conversions can fail
    /// return `None` until their first good reading.
    fn try_sample(&mut self) -> Option<RawSample> {
        Some(self.sample())
    }
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn sample(&mut self) -> RawSample {
        (**self).sample()
    }

    fn try_sample(&mut self) -> Option<RawSample> {
        (**self).try_sample()
    }
}
