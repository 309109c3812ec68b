//! Raw ADC sample type

/// Largest raw sample the 12-bit converter can produce
pub const SAMPLE_MAX: u16 = 4095;

/// One raw reading from the sensing hardware
///
/// Always in `[0, SAMPLE_MAX]`. A reading outside that domain is a
/// programming error in the sampler and trips a debug assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample(u16);

impl RawSample {
    /// Smallest possible sample
    pub const MIN: Self = Self(0);

    /// Largest possible sample
    pub const MAX: Self = Self(SAMPLE_MAX);

    /// Wrap a raw reading
    pub const fn new(raw: u16) -> Self {
        debug_assert!(raw <= SAMPLE_MAX, "raw sample outside 12-bit domain");
        Self(raw)
    }

    /// Wrap a raw reading, clamping anything above `SAMPLE_MAX`
    pub const fn saturating(raw: u16) -> Self {
        if raw > SAMPLE_MAX {
            Self(SAMPLE_MAX)
        } else {
            Self(raw)
        }
    }

    /// Get the raw reading
    pub const fn get(self) -> u16 {
        self.0
    }

    /// Iterate over every sample in the domain, in increasing order
    pub fn all() -> impl Iterator<Item = RawSample> {
        (0..=SAMPLE_MAX).map(RawSample)
    }
}

impl From<RawSample> for u16 {
    fn from(sample: RawSample) -> Self {
        sample.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_clamps() {
        assert_eq!(RawSample::saturating(5000), RawSample::MAX);
        assert_eq!(RawSample::saturating(4095).get(), 4095);
        assert_eq!(RawSample::saturating(12).get(), 12);
    }

    #[test]
    fn test_all_covers_domain() {
        let mut count = 0u32;
        let mut last = None;
        for s in RawSample::all() {
            if let Some(prev) = last {
                assert!(s > prev);
            }
            last = Some(s);
            count += 1;
        }
        assert_eq!(count, 4096);
        assert_eq!(last, Some(RawSample::MAX));
    }

    #[test]
    #[should_panic]
    #[cfg(debug_assertions)]
    fn test_out_of_domain_panics_in_debug() {
        let _ = RawSample::new(4096);
    }
}
