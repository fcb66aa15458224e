//! Numeric helpers shared by the parsers, the writers and coercion.
//!
//! Conformance notes for the text grammar (RFC 8259, strict):
//! - leading zeros are rejected: `01`, `-01`;
//! - a fraction and an exponent each need at least one digit: `1.`, `.5`,
//!   `1e`, `1e+` are rejected;
//! - a literal without `.` or exponent is an integer if it fits 64 bits
//!   (signed when it starts with `-`, unsigned otherwise), else a float;
//! - `-0` is the signed integer zero;
//! - a literal whose magnitude overflows `f64` (`1e400`, a 400-digit
//!   integer) is rejected, since it could not be written back.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    UInt(u64),
    Int(i64),
    Float(f64),
}

/// Why a lexeme is not a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Malformed {
    /// A proper prefix of a number, such as `-` or `1e`.
    Truncated,
    Invalid,
}

fn digits(lexeme: &[u8], from: usize) -> usize {
    from + lexeme[from.min(lexeme.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count()
}

/// Checks `lexeme` against the number grammar and converts it.
pub(crate) fn parse(lexeme: &[u8]) -> Result<Number, Malformed> {
    let missing = |at: usize| {
        if at == lexeme.len() {
            Malformed::Truncated
        } else {
            Malformed::Invalid
        }
    };

    let negative = lexeme.first() == Some(&b'-');
    let mut i = usize::from(negative);
    match lexeme.get(i) {
        None => return Err(Malformed::Truncated),
        Some(b'0') => {
            i += 1;
            if lexeme.get(i).is_some_and(u8::is_ascii_digit) {
                return Err(Malformed::Invalid);
            }
        }
        Some(b'1'..=b'9') => i = digits(lexeme, i),
        Some(_) => return Err(Malformed::Invalid),
    }

    let mut integral = true;
    if lexeme.get(i) == Some(&b'.') {
        integral = false;
        i += 1;
        let end = digits(lexeme, i);
        if end == i {
            return Err(missing(i));
        }
        i = end;
    }
    if matches!(lexeme.get(i), Some(b'e' | b'E')) {
        integral = false;
        i += 1;
        if matches!(lexeme.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let end = digits(lexeme, i);
        if end == i {
            return Err(missing(i));
        }
        i = end;
    }
    if i != lexeme.len() {
        return Err(Malformed::Invalid);
    }

    let text = core::str::from_utf8(lexeme).map_err(|_| Malformed::Invalid)?;
    if integral {
        if negative {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Number::Int(n));
            }
        } else if let Ok(n) = text.parse::<u64>() {
            return Ok(Number::UInt(n));
        }
    }
    match text.parse::<f64>() {
        Ok(f) if f.is_finite() => Ok(Number::Float(f)),
        _ => Err(Malformed::Invalid),
    }
}

/// Lenient parse used by string coercion: surrounding whitespace is ignored
/// and anything that is not a number yields `None`.
pub(crate) fn parse_text(text: &str) -> Option<Number> {
    parse(text.trim().as_bytes()).ok()
}

impl Number {
    /// Converts to an integer type, yielding `None` when the value does not
    /// fit. Floats are truncated toward zero.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn to_integer<T>(self) -> Option<T>
    where
        T: TryFrom<u64> + TryFrom<i64>,
    {
        match self {
            Number::UInt(n) => T::try_from(n).ok(),
            Number::Int(n) => T::try_from(n).ok(),
            Number::Float(f) if !f.is_finite() => None,
            Number::Float(f) => {
                let f = f.trunc();
                // 2^64 and -2^63 are exact in f64.
                if (0.0..18_446_744_073_709_551_616.0).contains(&f) {
                    T::try_from(f as u64).ok()
                } else if (-9_223_372_036_854_775_808.0..0.0).contains(&f) {
                    T::try_from(f as i64).ok()
                } else {
                    None
                }
            }
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Number::UInt(n) => n as f64,
            Number::Int(n) => n as f64,
            Number::Float(f) => f,
        }
    }
}

/// Writes a finite float.
///
/// Without a precision, the output is the shortest representation that
/// parses back to the same `f64`, and always reads back as a float (`1.0`,
/// never `1`). Very large and very small magnitudes use exponent notation.
pub(crate) fn write_float<W: fmt::Write>(
    out: &mut W,
    value: f64,
    precision: Option<u8>,
) -> fmt::Result {
    match precision {
        // Keep the fraction so the value still reads back as a float.
        Some(0) => return write!(out, "{value:.0}.0"),
        Some(precision) => return write!(out, "{value:.*}", usize::from(precision)),
        None => {}
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-5..1e16).contains(&magnitude) {
        write!(out, "{value:e}")
    } else if value.fract() == 0.0 {
        write!(out, "{value:.1}")
    } else {
        write!(out, "{value}")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]

    use alloc::string::String;

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("0", Number::UInt(0))]
    #[case("-0", Number::Int(0))]
    #[case("42", Number::UInt(42))]
    #[case("-42", Number::Int(-42))]
    #[case("18446744073709551615", Number::UInt(u64::MAX))]
    #[case("-9223372036854775808", Number::Int(i64::MIN))]
    #[case("18446744073709551616", Number::Float(18_446_744_073_709_551_616.0))]
    #[case("-9223372036854775809", Number::Float(-9_223_372_036_854_775_809.0))]
    #[case("1.5", Number::Float(1.5))]
    #[case("1e3", Number::Float(1000.0))]
    #[case("1E+3", Number::Float(1000.0))]
    #[case("-2.5e-3", Number::Float(-0.0025))]
    #[case("1e-400", Number::Float(0.0))]
    fn accepts(#[case] lexeme: &str, #[case] expected: Number) {
        assert_eq!(parse(lexeme.as_bytes()), Ok(expected));
    }

    #[rstest]
    #[case("-", Malformed::Truncated)]
    #[case("1.", Malformed::Truncated)]
    #[case("1e", Malformed::Truncated)]
    #[case("1e+", Malformed::Truncated)]
    #[case("01", Malformed::Invalid)]
    #[case("-01", Malformed::Invalid)]
    #[case(".5", Malformed::Invalid)]
    #[case("1.e3", Malformed::Invalid)]
    #[case("1e+-3", Malformed::Invalid)]
    #[case("+1", Malformed::Invalid)]
    #[case("1-2", Malformed::Invalid)]
    #[case("1e400", Malformed::Invalid)]
    #[case("-1e400", Malformed::Invalid)]
    fn rejects(#[case] lexeme: &str, #[case] expected: Malformed) {
        assert_eq!(parse(lexeme.as_bytes()), Err(expected));
    }

    #[rstest]
    #[case(1.0, "1.0")]
    #[case(-0.0, "-0.0")]
    #[case(0.1, "0.1")]
    #[case(123_456.789, "123456.789")]
    #[case(1e300, "1e300")]
    #[case(1.5e-7, "1.5e-7")]
    #[case(1e16, "1e16")]
    fn shortest_float(#[case] value: f64, #[case] expected: &str) {
        let mut out = String::new();
        write_float(&mut out, value, None).unwrap();
        assert_eq!(out, expected);
        assert_eq!(out.parse::<f64>().unwrap(), value);
    }

    #[quickcheck_macros::quickcheck]
    fn written_floats_parse_back(value: f64) -> quickcheck::TestResult {
        if !value.is_finite() {
            return quickcheck::TestResult::discard();
        }
        let mut out = String::new();
        write_float(&mut out, value, None).unwrap();
        let reparsed = match parse(out.as_bytes()) {
            Ok(Number::Float(f)) => f,
            _ => return quickcheck::TestResult::failed(),
        };
        quickcheck::TestResult::from_bool(reparsed == value)
    }

    #[test]
    fn fixed_precision_float() {
        let mut out = String::new();
        write_float(&mut out, 3.14159, Some(2)).unwrap();
        assert_eq!(out, "3.14");

        out.clear();
        write_float(&mut out, 2.75, Some(0)).unwrap();
        assert_eq!(out, "3.0");
    }

    #[test]
    fn integer_conversion_checks_range() {
        assert_eq!(Number::UInt(300).to_integer::<u8>(), None);
        assert_eq!(Number::UInt(200).to_integer::<u8>(), Some(200));
        assert_eq!(Number::Int(-1).to_integer::<u32>(), None);
        assert_eq!(Number::Float(-3.9).to_integer::<i8>(), Some(-3));
        assert_eq!(Number::Float(f64::NAN).to_integer::<i64>(), None);
        assert_eq!(Number::Float(1e20).to_integer::<u64>(), None);
    }

    #[test]
    fn lenient_text() {
        assert_eq!(parse_text(" 12 "), Some(Number::UInt(12)));
        assert_eq!(parse_text("twelve"), None);
    }
}
