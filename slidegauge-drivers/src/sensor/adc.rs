//! Slide potentiometer on an ADC channel
//!
//! The wiper sits between GND and the ADC reference, so the raw 12-bit
//! conversion is the position. No scaling happens here; the core converter
//! owns calibration.

use slidegauge_core::traits::Sampler;
use slidegauge_core::{RawSample, SAMPLE_MAX};

/// ADC reading trait for platform abstraction
pub trait AdcReader {
    /// Read ADC value (12-bit, 0-4095)
    #[allow(clippy::result_unit_err)]
    fn read(&mut self) -> Result<u16, ()>;
}

impl<A: AdcReader + ?Sized> AdcReader for &mut A {
    fn read(&mut self) -> Result<u16, ()> {
        (**self).read()
    }
}

/// Sampler backed by one ADC channel
///
/// A failed conversion repeats the previous reading, which the trigger's
/// change filter then suppresses. Before the first good conversion there is
/// nothing to repeat and [`Sampler::try_sample`] returns `None`.
pub struct AdcSampler<A> {
    adc: A,
    last: Option<RawSample>,
    errors: u32,
}

impl<A: AdcReader> AdcSampler<A> {
    /// Create a sampler for an ADC channel
    pub fn new(adc: A) -> Self {
        Self {
            adc,
            last: None,
            errors: 0,
        }
    }

    /// Number of failed conversions so far
    pub fn errors(&self) -> u32 {
        self.errors
    }
}

impl<A: AdcReader> Sampler for AdcSampler<A> {
    /// Like `try_sample`, reporting `RawSample::MIN` before the first reading
    fn sample(&mut self) -> RawSample {
        self.try_sample().unwrap_or(RawSample::MIN)
    }

    fn try_sample(&mut self) -> Option<RawSample> {
        match self.adc.read() {
            Ok(raw) => {
                debug_assert!(raw <= SAMPLE_MAX, "ADC reading outside 12-bit domain");
                self.last = Some(RawSample::saturating(raw));
            }
            Err(()) => {
                self.errors = self.errors.wrapping_add(1);
            }
        }
        self.last
    }
}
