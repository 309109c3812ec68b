//! Configuration type definitions

use heapless::String;

use crate::convert::{Calibration, MAX_SHIFT};
use crate::format::DISPLAY_WIDTH;
use crate::traits::Cursor;

/// Maximum length of the splash lines
pub const MAX_TEXT_LEN: usize = 14;

/// Character columns on the reference display (84 px / 6 px cells)
pub const TEXT_COLS: u8 = 14;

/// Character rows on the reference display (48 px / 8 px pages)
pub const TEXT_ROWS: u8 = 6;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Trigger period of zero ticks
    ZeroPeriod,
    /// Reference clock of zero Hz
    ZeroClock,
    /// Trigger period shorter than one microsecond
    PeriodTooShort,
    /// Calibration shift above `MAX_SHIFT`
    ShiftTooLarge,
    /// Calibration bias not smaller than the divisor
    BiasTooLarge,
    /// Distance field does not fit on the display
    CursorOutOfRange,
}

/// Trigger timing
///
/// The period is a tick count of a reference clock, the way a hardware
/// timer reload value is specified. The default is 2,000,000 ticks of an
/// 80 MHz clock: 25 ms, 40 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplingConfig {
    /// Reference-clock ticks per trigger period
    pub period_ticks: u32,
    /// Reference clock frequency
    pub clock_hz: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period_ticks: 2_000_000,
            clock_hz: 80_000_000,
        }
    }
}

impl SamplingConfig {
    /// Trigger period in microseconds
    pub fn period_us(&self) -> u64 {
        if self.clock_hz == 0 {
            return 0;
        }
        self.period_ticks as u64 * 1_000_000 / self.clock_hz as u64
    }

    /// Trigger rate in whole Hz
    pub fn frequency_hz(&self) -> u32 {
        if self.period_ticks == 0 {
            return 0;
        }
        self.clock_hz / self.period_ticks
    }
}

/// Display layout
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Drive the display at all (false = headless)
    pub enabled: bool,
    /// Splash title on row 0
    pub title: String<MAX_TEXT_LEN>,
    /// Splash greeting on row 1
    pub greeting: String<MAX_TEXT_LEN>,
    /// Where the distance is written
    pub value_at: Cursor,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut title = String::new();
        let _ = title.push_str("Slidegauge");
        let mut greeting = String::new();
        let _ = greeting.push_str("Hello");
        Self {
            enabled: true,
            title,
            greeting,
            value_at: Cursor::new(0, 2),
        }
    }
}

/// Complete gauge configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GaugeConfig {
    /// Trigger timing
    pub sampling: SamplingConfig,
    /// Sample-to-distance calibration
    pub calibration: Calibration,
    /// Display layout
    pub display: DisplayConfig,
}

impl GaugeConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Check the configuration for values the gauge cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.period_ticks == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.sampling.clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        if self.sampling.period_us() == 0 {
            return Err(ConfigError::PeriodTooShort);
        }

        let cal = &self.calibration;
        if cal.shift > MAX_SHIFT {
            return Err(ConfigError::ShiftTooLarge);
        }
        if (cal.bias as u64) >= (1u64 << cal.shift) {
            return Err(ConfigError::BiasTooLarge);
        }

        let at = self.display.value_at;
        if at.row >= TEXT_ROWS || at.col as usize + DISPLAY_WIDTH > TEXT_COLS as usize {
            return Err(ConfigError::CursorOutOfRange);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = GaugeConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.sampling.period_us(), 25_000);
        assert_eq!(config.sampling.frequency_hz(), 40);
        assert_eq!(config.calibration, Calibration::DEFAULT);
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut config = GaugeConfig::default();
        config.sampling.period_ticks = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroPeriod));
        assert_eq!(config.sampling.frequency_hz(), 0);
    }

    #[test]
    fn test_zero_clock_rejected() {
        let mut config = GaugeConfig::default();
        config.sampling.clock_hz = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroClock));
        assert_eq!(config.sampling.period_us(), 0);
    }

    #[test]
    fn test_sub_microsecond_period_rejected() {
        let mut config = GaugeConfig::default();
        config.sampling.period_ticks = 1;
        assert_eq!(config.sampling.period_us(), 0);
        assert_eq!(config.validate(), Err(ConfigError::PeriodTooShort));

        config.sampling.period_ticks = 80;
        assert_eq!(config.sampling.period_us(), 1);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_bias_must_be_below_divisor() {
        let mut config = GaugeConfig::default();
        config.calibration = Calibration::new(500, 1024, 10);
        assert_eq!(config.validate(), Err(ConfigError::BiasTooLarge));

        config.calibration = Calibration::new(500, 0, 10);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_shift_limit() {
        let mut config = GaugeConfig::default();
        config.calibration = Calibration::new(1, 0, 32);
        assert_eq!(config.validate(), Err(ConfigError::ShiftTooLarge));
    }

    #[test]
    fn test_value_must_fit_row() {
        let mut config = GaugeConfig::default();
        config.display.value_at = Cursor::new(6, 0);
        assert_eq!(config.validate(), Ok(()));

        config.display.value_at = Cursor::new(7, 0);
        assert_eq!(config.validate(), Err(ConfigError::CursorOutOfRange));

        config.display.value_at = Cursor::new(0, 6);
        assert_eq!(config.validate(), Err(ConfigError::CursorOutOfRange));
    }
}
