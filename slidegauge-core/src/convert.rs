//! Sample-to-distance conversion
//!
//! Linear scaling from the 12-bit sample domain into 0.001 cm units:
//!
//! ```text
//! distance = (sample * scale + bias) >> shift
//! ```
//!
//! With `bias = 1 << (shift - 1)` the shift rounds to nearest (half up)
//! instead of truncating, which would bias every reading downwards.
//!
//! Calibration is gathered by placing the slider at known distances and
//! reading the raw sample. The default maps full scale (4095) to 2.000 cm.

use crate::distance::Distance;
use crate::sample::{RawSample, SAMPLE_MAX};

/// Fixed-point shift used by derived calibrations (divide by 1024)
pub const DEFAULT_SHIFT: u8 = 10;

/// Largest allowed shift
pub const MAX_SHIFT: u8 = 31;

/// Linear calibration constants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Slope numerator (distance per sample, scaled by `1 << shift`)
    pub scale: u32,
    /// Rounding bias added before the shift
    pub bias: u32,
    /// Fixed-point shift (divisor is `1 << shift`)
    pub shift: u8,
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Calibration {
    /// Measured calibration for the reference slide pot:
    /// `(sample * 500 + 512) >> 10`
    pub const DEFAULT: Self = Self {
        scale: 500,
        bias: 512,
        shift: DEFAULT_SHIFT,
    };

    /// Create a calibration from raw constants
    pub const fn new(scale: u32, bias: u32, shift: u8) -> Self {
        Self { scale, bias, shift }
    }

    /// Create a round-half-up calibration with the given slope
    pub const fn with_scale(scale: u32) -> Self {
        Self {
            scale,
            bias: half_unit(DEFAULT_SHIFT),
            shift: DEFAULT_SHIFT,
        }
    }

    /// Derive the calibration from a full-scale reference measurement
    ///
    /// `span` is the distance observed when the sampler reads `sample_max`.
    /// The slope is rounded to nearest in the `1 << DEFAULT_SHIFT` domain.
    ///
    /// # Example
    /// A 2.000 cm span over a 12-bit range gives the default slope of 500.
    pub const fn from_span(span: Distance, sample_max: u16) -> Self {
        let max = if sample_max == 0 { 1 } else { sample_max as u64 };
        let numerator = (span.thousandths() as u64) << DEFAULT_SHIFT;
        let scale = (numerator + max / 2) / max;
        let scale = if scale > u32::MAX as u64 {
            u32::MAX
        } else {
            scale as u32
        };
        Self::with_scale(scale)
    }

    /// Check whether the bias is exactly half of the divisor
    pub const fn rounds_half_up(&self) -> bool {
        self.shift > 0 && self.bias == half_unit(self.shift)
    }

    /// Convert a raw sample into a distance
    ///
    /// Arithmetic is done in 64 bits so any configured slope is safe over the
    /// whole sample domain; results above `u32::MAX` saturate.
    pub fn convert(&self, sample: RawSample) -> Distance {
        debug_assert!(sample.get() <= SAMPLE_MAX);
        debug_assert!(self.shift <= MAX_SHIFT);

        let scaled = sample.get() as u64 * self.scale as u64 + self.bias as u64;
        let value = scaled >> self.shift;
        Distance::from_thousandths(value.min(u32::MAX as u64) as u32)
    }
}

/// Half of the fixed-point divisor for a shift
const fn half_unit(shift: u8) -> u32 {
    if shift == 0 {
        0
    } else {
        1u32 << (shift - 1)
    }
}

/// Convert a raw sample using the default calibration
pub fn convert(sample: RawSample) -> Distance {
    Calibration::DEFAULT.convert(sample)
}
