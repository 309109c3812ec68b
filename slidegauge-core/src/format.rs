//! Fixed-width distance formatting
//!
//! Renders a distance as one integer digit, a decimal point, three
//! fractional digits, a space and the unit: `"2.210 cm"`. Anything above
//! 9.999 cm is shown as the overflow literal `"*.*** cm"`.

use heapless::String;

use crate::distance::Distance;

/// Number of visible characters in a formatted distance
pub const DISPLAY_WIDTH: usize = 8;

/// Unit suffix appended after the value
pub const UNIT_SUFFIX: &str = "cm";

/// Text shown when the distance exceeds the display range
pub const OVERFLOW_TEXT: &str = "*.*** cm";

/// A formatted distance, always exactly `DISPLAY_WIDTH` characters
pub type DisplayString = String<DISPLAY_WIDTH>;

/// Format a distance for display
pub fn format(value: Distance) -> DisplayString {
    let mut out = DisplayString::new();

    if !value.is_displayable() {
        let _ = out.push_str(OVERFLOW_TEXT);
        return out;
    }

    let fraction = value.fraction();
    let digits = [
        digit(value.whole()),
        '.',
        digit(fraction / 100),
        digit(fraction / 10 % 10),
        digit(fraction % 10),
        ' ',
    ];
    for ch in digits {
        let _ = out.push(ch);
    }
    let _ = out.push_str(UNIT_SUFFIX);
    out
}

/// ASCII digit for a value in 0-9
fn digit(value: u32) -> char {
    debug_assert!(value < 10);
    (b'0' + (value % 10) as u8) as char
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fmt(v: u32) -> DisplayString {
        format(Distance::from_thousandths(v))
    }

    #[test]
    fn test_boundary_table() {
        assert_eq!(fmt(4).as_str(), "0.004 cm");
        assert_eq!(fmt(31).as_str(), "0.031 cm");
        assert_eq!(fmt(102).as_str(), "0.102 cm");
        assert_eq!(fmt(2210).as_str(), "2.210 cm");
        assert_eq!(fmt(9999).as_str(), "9.999 cm");
        assert_eq!(fmt(10000).as_str(), "*.*** cm");
    }

    #[test]
    fn test_zero() {
        assert_eq!(fmt(0).as_str(), "0.000 cm");
    }

    #[test]
    fn test_far_overflow_is_sentinel() {
        assert_eq!(fmt(u32::MAX).as_str(), OVERFLOW_TEXT);
    }

    proptest! {
        #[test]
        fn prop_always_fixed_width(v in any::<u32>()) {
            let s = fmt(v);
            prop_assert_eq!(s.len(), DISPLAY_WIDTH);
            prop_assert!(s.ends_with(" cm"));
        }

        #[test]
        fn prop_in_range_reads_back(v in 0u32..=9999) {
            let s = fmt(v);
            let digits: u32 = s
                .chars()
                .filter(|c| c.is_ascii_digit())
                .fold(0, |acc, c| acc * 10 + c.to_digit(10).unwrap_or(0));
            prop_assert_eq!(digits, v);
        }
    }
}
