//! Amount parsing for Brazilian-formatted figures.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

/// A value that can be read as a monetary amount.
///
/// Numbers pass through unchanged. Text is read in the pt-BR locale, where
/// `.` groups thousands and `,` separates decimals. Reading never fails:
/// anything unparseable is `0.0`.
pub trait AmountToken {
    fn to_amount(&self) -> f64;
}

impl AmountToken for f64 {
    fn to_amount(&self) -> f64 {
        *self
    }
}

impl AmountToken for f32 {
    fn to_amount(&self) -> f64 {
        f64::from(*self)
    }
}

impl AmountToken for i32 {
    fn to_amount(&self) -> f64 {
        f64::from(*self)
    }
}

impl AmountToken for u32 {
    fn to_amount(&self) -> f64 {
        f64::from(*self)
    }
}

impl AmountToken for i64 {
    fn to_amount(&self) -> f64 {
        *self as f64
    }
}

impl AmountToken for u64 {
    fn to_amount(&self) -> f64 {
        *self as f64
    }
}

impl AmountToken for str {
    fn to_amount(&self) -> f64 {
        parse_locale_amount(self)
    }
}

impl AmountToken for String {
    fn to_amount(&self) -> f64 {
        parse_locale_amount(self)
    }
}

impl<T: AmountToken + ?Sized> AmountToken for &T {
    fn to_amount(&self) -> f64 {
        (**self).to_amount()
    }
}

/// Read any amount token as `f64`.
pub fn parse_amount<T: AmountToken + ?Sized>(token: &T) -> f64 {
    token.to_amount()
}

/// Parse a pt-BR formatted amount (e.g. "1.234,56"), returning `0.0` on failure.
///
/// Exponent forms such as `1e3` are accepted. Values beyond the decimal
/// range are read as a float; non-finite results (`inf`, `NaN`) are `0.0`.
pub fn parse_locale_amount(s: &str) -> f64 {
    // Strip thousand separators, then make the comma the decimal point
    let normalized = s.trim().replace('.', "").replace(',', ".");

    Decimal::from_str(&normalized)
        .ok()
        .and_then(|d| d.to_f64())
        .or_else(|| normalized.parse::<f64>().ok().filter(|v| v.is_finite()))
        .unwrap_or(0.0)
}

/// Parse a machine decimal (e.g. "1500.00") as found in XML invoices.
pub fn parse_plain_amount(s: &str) -> Option<f64> {
    Decimal::from_str(s.trim()).ok().and_then(|d| d.to_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_locale_amount() {
        assert_eq!(parse_locale_amount("1.234,56"), 1234.56);
        assert_eq!(parse_locale_amount("2.500,00"), 2500.0);
        assert_eq!(parse_locale_amount("75,90"), 75.9);
        assert_eq!(parse_locale_amount("12.345.678,90"), 12345678.9);
        assert_eq!(parse_locale_amount(" 100,00\r"), 100.0);
        assert_eq!(parse_locale_amount("-15,5"), -15.5);
    }

    #[test]
    fn test_malformed_reads_as_zero() {
        assert_eq!(parse_locale_amount(""), 0.0);
        assert_eq!(parse_locale_amount("abc"), 0.0);
        assert_eq!(parse_locale_amount("Alíquota 3,00%"), 0.0);
        assert_eq!(parse_locale_amount("R$ 10,00"), 0.0);
        assert_eq!(parse_locale_amount("inf"), 0.0);
        assert_eq!(parse_locale_amount("NaN"), 0.0);
        assert_eq!(parse_locale_amount("1e400"), 0.0);
    }

    #[test]
    fn test_exponent_and_wide_values() {
        assert_eq!(parse_locale_amount("1e3"), 1000.0);
        // Above the decimal range, still a valid float
        assert_eq!(parse_locale_amount("99999999999999999999999999999"), 1e29);
    }

    #[test]
    fn test_numeric_tokens_pass_through() {
        assert_eq!(parse_amount(&42), 42.0);
        assert_eq!(parse_amount(&42i64), 42.0);
        assert_eq!(parse_amount(&1234.5f64), 1234.5);
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount(&String::from("")), 0.0);
    }

    #[test]
    fn test_parse_plain_amount() {
        assert_eq!(parse_plain_amount("1500.00"), Some(1500.0));
        assert_eq!(parse_plain_amount(" 20 "), Some(20.0));
        assert_eq!(parse_plain_amount("1.500,00"), None);
        assert_eq!(parse_plain_amount(""), None);
    }
}
