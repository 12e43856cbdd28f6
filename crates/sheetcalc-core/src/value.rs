use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CellError;

/// Value observed when reading a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Error(CellError),
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Number(0.0)
    }
}

impl CellValue {
    /// Read the value as a formula operand
    ///
    /// Empty text counts as zero, other text must be a complete number
    /// literal. Errors pass through untouched.
    pub fn as_number(&self) -> Result<f64, CellError> {
        match self {
            CellValue::Number(n) => Ok(*n),
            CellValue::Text(s) if s.is_empty() => Ok(0.0),
            CellValue::Text(s) => parse_number(s).ok_or(CellError::Value),
            CellValue::Error(e) => Err(*e),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}

/// Significant digits shown for numbers in values output
const SIGNIFICANT_DIGITS: i32 = 6;

/// Format a number like C's `%g` with six significant digits
///
/// Fixed notation is used for decimal exponents in `-4..6`, scientific
/// notation (`1e+20`, `1.23457e-05`) otherwise. Trailing zeros are dropped.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }

    // Rounding to the shown digits first decides the exponent, so 999999.5
    // becomes 1e+06 rather than 1000000.
    let scientific = format!("{:.*e}", (SIGNIFICANT_DIGITS - 1) as usize, n);
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..SIGNIFICANT_DIGITS).contains(&exponent) {
        let decimals = (SIGNIFICANT_DIGITS - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, n)).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Parse a whole string as a number literal
///
/// Rejects surrounding whitespace, signs-only input and non-finite spellings
/// such as `inf` or `NaN` that `f64::from_str` would otherwise accept.
fn parse_number(s: &str) -> Option<f64> {
    let starts_like_number = s
        .bytes()
        .next()
        .is_some_and(|b| b.is_ascii_digit() || matches!(b, b'.' | b'+' | b'-'));
    if !starts_like_number || s.bytes().any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E') {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_number() {
        assert_eq!(CellValue::Number(42.0).as_number(), Ok(42.0));
        assert_eq!(CellValue::Text("123".to_string()).as_number(), Ok(123.0));
        assert_eq!(CellValue::Text("-1.5e2".to_string()).as_number(), Ok(-150.0));
        assert_eq!(CellValue::Text(String::new()).as_number(), Ok(0.0));
        assert_eq!(CellValue::Text("3D".to_string()).as_number(), Err(CellError::Value));
        assert_eq!(CellValue::Text("A1".to_string()).as_number(), Err(CellError::Value));
        assert_eq!(CellValue::Text("inf".to_string()).as_number(), Err(CellError::Value));
        assert_eq!(CellValue::Text(" 1".to_string()).as_number(), Err(CellError::Value));
        assert_eq!(
            CellValue::Error(CellError::Arithmetic).as_number(),
            Err(CellError::Arithmetic)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(42.0).to_string(), "42");
        assert_eq!(CellValue::Number(42.5).to_string(), "42.5");
        assert_eq!(CellValue::Number(-0.25).to_string(), "-0.25");
        assert_eq!(CellValue::Text("hello".to_string()).to_string(), "hello");
        assert_eq!(CellValue::Error(CellError::Value).to_string(), "#VALUE!");
        assert_eq!(CellValue::Error(CellError::Arithmetic).to_string(), "#ARITHM!");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(35.0), "35");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(123_456.0), "123456");
        assert_eq!(format_number(1_234_567.0), "1.23457e+06");
        assert_eq!(format_number(999_999.5), "1e+06");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(-2.0 / 3.0), "-0.666667");
        assert_eq!(format_number(0.0001), "0.0001");
        assert_eq!(format_number(0.00001), "1e-05");
        assert_eq!(format_number(1.25e-7), "1.25e-07");
        assert_eq!(format_number(1e20), "1e+20");
        assert_eq!(format_number(f64::MAX), "1.79769e+308");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&CellValue::Number(1.5)).unwrap();
        assert_eq!(json, r#"{"type":"Number","value":1.5}"#);

        let back: CellValue = serde_json::from_str(r#"{"type":"Error","value":"Arithmetic"}"#).unwrap();
        assert_eq!(back, CellValue::Error(CellError::Arithmetic));
    }
}
