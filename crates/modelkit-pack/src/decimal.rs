//! [`Decimal`] — an exact base-10 number kept in its textual form.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid decimal literal `{0}`")]
pub struct DecimalError(pub String);

/// An arbitrary-precision decimal number.
///
/// The value is stored as validated decimal text (`-12.50`, `3e-7`) so it
/// passes through every wire format without binary rounding. Two decimals
/// are equal when their canonical text is equal; `1.5` and `1.50` are
/// distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Decimal(String);

impl Decimal {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Nearest `f64`. Precision beyond 17 significant digits is lost.
    pub fn to_f64(&self) -> f64 {
        // Validated text always parses.
        self.0.parse().unwrap_or(f64::NAN)
    }

    /// Exact text of an integer too wide for [`From<i64>`].
    pub fn from_i128(value: i128) -> Self {
        Self(value.to_string())
    }

    /// Builds a decimal from a finite float using its shortest exact text.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Self(format!("{value}")))
    }
}

fn digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DecimalError(s.to_owned());
        let body = s.strip_prefix('+').unwrap_or(s);
        let unsigned = body.strip_prefix('-').unwrap_or(body);
        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(at) => (&unsigned[..at], Some(&unsigned[at + 1..])),
            None => (unsigned, None),
        };
        let valid_mantissa = match mantissa.split_once('.') {
            Some((int, frac)) => {
                (digits(int) && (frac.is_empty() || digits(frac))) || (int.is_empty() && digits(frac))
            }
            None => digits(mantissa),
        };
        if !valid_mantissa {
            return Err(err());
        }
        if let Some(exp) = exponent {
            let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            if !digits(exp) {
                return Err(err());
            }
        }
        Ok(Self(body.replace('E', "e")))
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_literals() {
        for lit in ["0", "-1", "3.14", "1.", ".5", "-0.001", "6.02e23", "1E-7", "2e+3"] {
            assert!(lit.parse::<Decimal>().is_ok(), "{lit}");
        }
        assert_eq!("+1.5".parse::<Decimal>().unwrap().as_str(), "1.5");
        assert_eq!("1E5".parse::<Decimal>().unwrap().as_str(), "1e5");
    }

    #[test]
    fn rejects_garbage() {
        for lit in ["", "-", ".", "1.2.3", "abc", "1e", "e5", "1_000", " 1"] {
            assert!(lit.parse::<Decimal>().is_err(), "{lit}");
        }
    }

    #[test]
    fn float_conversions() {
        assert_eq!(Decimal::from_f64(3.14).unwrap().as_str(), "3.14");
        assert!(Decimal::from_f64(f64::NAN).is_none());
        assert_eq!("0.25".parse::<Decimal>().unwrap().to_f64(), 0.25);
        assert_eq!(Decimal::from(-42).as_str(), "-42");
    }
}
