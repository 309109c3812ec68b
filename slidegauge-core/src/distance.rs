//! Fixed-point distance type
//!
//! Distances are unsigned integers in units of 0.001 cm, so 2210 is
//! 2.210 cm. There is no upper bound on the value itself; the formatter
//! decides what is representable on screen.

/// Largest distance the `D.DDD` display format can show (9.999 cm)
pub const DISPLAY_MAX: u32 = 9999;

/// Calibrated distance in thousandths of a centimetre
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Distance(u32);

impl Distance {
    /// Zero distance
    pub const ZERO: Self = Self(0);

    /// Create from a value in 0.001 cm units
    pub const fn from_thousandths(value: u32) -> Self {
        Self(value)
    }

    /// Value in 0.001 cm units
    pub const fn thousandths(self) -> u32 {
        self.0
    }

    /// Whole centimetres
    pub const fn whole(self) -> u32 {
        self.0 / 1000
    }

    /// Fractional part in thousandths (0-999)
    pub const fn fraction(self) -> u32 {
        self.0 % 1000
    }

    /// Check if this distance fits the `D.DDD` display format
    pub const fn is_displayable(self) -> bool {
        self.0 <= DISPLAY_MAX
    }
}

impl From<u32> for Distance {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
