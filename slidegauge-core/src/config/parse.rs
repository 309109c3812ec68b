//! Simple TOML parser for the gauge configuration
//!
//! This is a minimal line-based parser that handles only the subset needed
//! for `gauge.toml`. It handles a small subset of TOML only.
//!
//! Supported features:
//! - `[section]` headers (`sampling`, `calibration`, `display`)
//! - `key = value` pairs (string, integer with `_` separators, boolean)
//! - Comments (`# ...`), including trailing comments
//!
//! In `[calibration]`, `span = N` derives scale, bias and shift from a
//! full-scale reference. It cannot be combined with `scale`, `bias` or
//! `shift`, in any order.

use heapless::String;

use super::types::{ConfigError, GaugeConfig, MAX_TEXT_LEN};
use crate::convert::Calibration;
use crate::distance::Distance;
use crate::sample::SAMPLE_MAX;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not recognized in its section
    UnknownKey,
    /// Value has the wrong type or syntax
    InvalidValue,
    /// Value does not fit its field
    OutOfRange,
    /// `span` given together with `scale`, `bias` or `shift`
    ConflictingKeys,
    /// Parsed configuration failed validation
    Invalid(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Invalid(e)
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sampling,
    Calibration,
    Display,
}

/// Calibration keys seen so far, resolved once the whole input is read
#[derive(Debug, Default)]
struct CalibrationKeys {
    span: Option<u32>,
    explicit: bool,
}

impl CalibrationKeys {
    fn resolve(self, calibration: &mut Calibration) -> Result<(), ParseError> {
        match (self.span, self.explicit) {
            (Some(_), true) => Err(ParseError::ConflictingKeys),
            (Some(span), false) => {
                *calibration =
                    Calibration::from_span(Distance::from_thousandths(span), SAMPLE_MAX);
                Ok(())
            }
            (None, _) => Ok(()),
        }
    }
}

/// Parse TOML configuration into a validated `GaugeConfig`
///
/// Missing sections and keys keep their defaults.
pub fn parse_config(input: &str) -> Result<GaugeConfig, ParseError> {
    let mut config = GaugeConfig::new();
    let mut section = Section::Root;
    let mut calibration = CalibrationKeys::default();

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(strip_comment(line))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        apply_value(section, key, value, &mut config, &mut calibration)?;
    }

    calibration.resolve(&mut config.calibration)?;
    config.validate()?;
    Ok(config)
}

/// Parse a header like "[sampling]"
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let inner = line
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or(ParseError::InvalidSection)?;

    match inner.trim() {
        "sampling" => Ok(Section::Sampling),
        "calibration" => Ok(Section::Calibration),
        "display" => Ok(Section::Display),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Remove a trailing comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return line[..i].trim(),
            _ => {}
        }
    }
    line.trim()
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(&line[eq_pos + 1..]);

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Apply one key to the section being parsed
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut GaugeConfig,
    keys: &mut CalibrationKeys,
) -> Result<(), ParseError> {
    match section {
        Section::Root => Err(ParseError::UnknownKey),
        Section::Sampling => {
            let sampling = &mut config.sampling;
            match key {
                "period_ticks" => sampling.period_ticks = parse_int(value)?,
                "clock_hz" => sampling.clock_hz = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
            Ok(())
        }
        Section::Calibration => {
            let cal = &mut config.calibration;
            match key {
                "scale" => cal.scale = parse_int(value)?,
                "bias" => cal.bias = parse_int(value)?,
                "shift" => cal.shift = parse_int(value)?,
                "span" => {
                    keys.span = Some(parse_int(value)?);
                    return Ok(());
                }
                _ => return Err(ParseError::UnknownKey),
            }
            keys.explicit = true;
            Ok(())
        }
        Section::Display => {
            let display = &mut config.display;
            match key {
                "enabled" => display.enabled = parse_bool(value)?,
                "title" => display.title = parse_text(value)?,
                "greeting" => display.greeting = parse_text(value)?,
                "row" => display.value_at.row = parse_int(value)?,
                "col" => display.value_at.col = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
            Ok(())
        }
    }
}

/// Parse a quoted string value
fn parse_string(value: &str) -> Result<&str, ParseError> {
    value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue)
}

/// Parse a quoted string into a bounded label
fn parse_text(value: &str) -> Result<String<MAX_TEXT_LEN>, ParseError> {
    let text = parse_string(value)?;
    String::try_from(text).map_err(|_| ParseError::OutOfRange)
}

/// Parse an unsigned integer, allowing `_` digit separators
fn parse_int<T: TryFrom<u64>>(value: &str) -> Result<T, ParseError> {
    let mut acc: u64 = 0;
    let mut digits = 0;

    for c in value.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(10).ok_or(ParseError::InvalidValue)?;
        acc = acc
            .checked_mul(10)
            .and_then(|a| a.checked_add(d as u64))
            .ok_or(ParseError::OutOfRange)?;
        digits += 1;
    }

    if digits == 0 {
        return Err(ParseError::InvalidValue);
    }

    T::try_from(acc).map_err(|_| ParseError::OutOfRange)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Cursor;

    const FULL: &str = r#"
# Gauge configuration
[sampling]
period_ticks = 2_000_000   # 25 ms
clock_hz = 80000000

[calibration]
scale = 500
bias = 512
shift = 10

[display]
enabled = true
title = "Lab14 # gauge"
greeting = "Hello"
row = 2
col = 0
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(config.sampling.period_ticks, 2_000_000);
        assert_eq!(config.sampling.clock_hz, 80_000_000);
        assert_eq!(config.calibration, Calibration::DEFAULT);
        assert!(config.display.enabled);
        assert_eq!(config.display.title.as_str(), "Lab14 # gauge");
        assert_eq!(config.display.greeting.as_str(), "Hello");
        assert_eq!(config.display.value_at, Cursor::new(0, 2));
    }

    #[test]
    fn test_empty_input_gives_defaults() {
        assert_eq!(parse_config("").unwrap(), GaugeConfig::default());
    }

    #[test]
    fn test_span_derives_calibration() {
        let config = parse_config("[calibration]\nspan = 2000\n").unwrap();
        assert_eq!(config.calibration, Calibration::DEFAULT);

        let config = parse_config("[calibration]\nspan = 4095\n").unwrap();
        assert_eq!(config.calibration.scale, 1024);
        assert_eq!(config.calibration.bias, 512);
        assert_eq!(config.calibration.shift, 10);
    }

    #[test]
    fn test_span_conflicts_in_either_order() {
        for input in [
            "[calibration]\nscale = 300\nspan = 2000\n",
            "[calibration]\nspan = 2000\nscale = 300\n",
            "[calibration]\nspan = 2000\nshift = 4\n",
            "[calibration]\nbias = 0\n[display]\nrow = 2\n[calibration]\nspan = 2000\n",
        ] {
            assert_eq!(parse_config(input), Err(ParseError::ConflictingKeys), "{}", input);
        }
    }

    #[test]
    fn test_explicit_keys_without_span() {
        let config = parse_config("[calibration]\nshift = 4\nscale = 300\nbias = 8\n").unwrap();
        assert_eq!(config.calibration, Calibration::new(300, 8, 4));

        // Default bias of 512 does not fit a shift of 4
        assert_eq!(
            parse_config("[calibration]\nshift = 4\n"),
            Err(ParseError::Invalid(ConfigError::BiasTooLarge))
        );
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_config("[heater]\n"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(parse_config("[sampling\n"), Err(ParseError::InvalidSection));
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_config("[sampling]\nrate = 40\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_config("period_ticks = 1\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            parse_config("[sampling]\nperiod_ticks = fast\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[display]\nenabled = yes\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[display]\ntitle = Hello\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(parse_config("[display]\nrow\n"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_out_of_range_values() {
        assert_eq!(
            parse_config("[display]\nrow = 300\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[display]\ntitle = \"far too long for the lcd\"\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[sampling]\nclock_hz = 99999999999999999999999\n"),
            Err(ParseError::OutOfRange)
        );
    }

    #[test]
    fn test_validation_runs_after_parse() {
        assert_eq!(
            parse_config("[sampling]\nperiod_ticks = 0\n"),
            Err(ParseError::Invalid(ConfigError::ZeroPeriod))
        );
        assert_eq!(
            parse_config("[sampling]\nperiod_ticks = 1\n"),
            Err(ParseError::Invalid(ConfigError::PeriodTooShort))
        );
        assert_eq!(
            parse_config("[display]\ncol = 10\n"),
            Err(ParseError::Invalid(ConfigError::CursorOutOfRange))
        );
    }

    #[test]
    fn test_parse_int_separators() {
        assert_eq!(parse_int::<u32>("80_000_000"), Ok(80_000_000));
        assert_eq!(parse_int::<u8>("_"), Err(ParseError::InvalidValue));
        assert_eq!(parse_int::<u8>("-1"), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_strip_comment_respects_quotes() {
        assert_eq!(strip_comment("\"a # b\" # c"), "\"a # b\"");
        assert_eq!(strip_comment("12 # note"), "12");
    }
}
