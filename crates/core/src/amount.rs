//! Exact decimal amount handling.
//!
//! Institutions report money three ways: signed minor-unit integers, an
//! unsigned magnitude plus a direction implied elsewhere, and major-unit
//! decimal strings. All three paths construct [`Decimal`] values from
//! integers or digit strings; binary floating point is never involved, so
//! `5` cents is `"0.05"` and never `"0.05000000000000000277"`.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::{Error, Result};

/// Fractional digits carried by every canonical amount.
pub const CENT_SCALE: u32 = 2;

/// Convert a signed minor-unit integer (cents) to a canonical amount.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, CENT_SCALE)
}

/// Convert an unsigned minor-unit magnitude, applying the direction the
/// record's type implies.
pub fn from_magnitude(cents: u64, outflow: bool) -> Decimal {
    let magnitude = Decimal::from_i128_with_scale(i128::from(cents), CENT_SCALE);
    if outflow {
        -magnitude
    } else {
        magnitude
    }
}

/// Parse a major-unit decimal string (e.g. `"1234.56"`), normalizing to
/// two fractional digits.
pub fn parse_major(text: &str) -> Result<Decimal> {
    let mut value = Decimal::from_str(text.trim())
        .map_err(|e| Error::MalformedResponse(format!("bad amount {:?}: {}", text, e)))?;
    value.rescale(CENT_SCALE);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn minor_unit_boundaries() {
        assert_eq!(from_minor_units(0).to_string(), "0.00");
        assert_eq!(from_minor_units(5).to_string(), "0.05");
        assert_eq!(from_minor_units(100).to_string(), "1.00");
        assert_eq!(from_minor_units(-250).to_string(), "-2.50");
    }

    #[test]
    fn magnitude_applies_direction() {
        assert_eq!(from_magnitude(1999, true).to_string(), "-19.99");
        assert_eq!(from_magnitude(1999, false).to_string(), "19.99");
        assert_eq!(from_magnitude(0, true).to_string(), "0.00");
    }

    #[test]
    fn major_strings_parse_exactly() {
        assert_eq!(parse_major("1234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_major("1234.5").unwrap().to_string(), "1234.50");
        assert_eq!(parse_major(" 7 ").unwrap().to_string(), "7.00");
        assert_eq!(parse_major("0.1").unwrap().to_string(), "0.10");
    }

    #[test]
    fn garbage_amount_is_rejected() {
        assert!(parse_major("12,34").is_err());
        assert!(parse_major("").is_err());
    }

    proptest! {
        // Formatting carries exactly two fractional digits and matches the
        // digits of the input integer, for any plausible cent count.
        #[test]
        fn minor_units_format_is_exact(n in -10_000_000_000_000i64..10_000_000_000_000i64) {
            let text = from_minor_units(n).to_string();
            let expected = format!(
                "{}{}.{:02}",
                if n < 0 { "-" } else { "" },
                (n / 100).abs(),
                (n % 100).abs()
            );
            prop_assert_eq!(text, expected);
        }
    }
}
