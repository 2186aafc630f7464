//! Scalar type inference with exact round-trip acceptance.
//!
//! A raw properties value becomes a typed YAML scalar only when printing the
//! typed value gives back the original text character for character.
//! Everything else stays a string, so `123.4E-12` is not silently rewritten
//! to `1.234E-10` and `007` does not lose its zeros.
//!
//! # Example
//!
//! ```
//! use propyaml::document::scalar::{infer, ScalarKind};
//!
//! assert_eq!(infer("8888").kind(), ScalarKind::Integer);
//! assert_eq!(infer("0.78").kind(), ScalarKind::Decimal);
//! assert_eq!(infer("true").kind(), ScalarKind::Boolean);
//! assert_eq!(infer("123.4E-12").kind(), ScalarKind::String);
//! ```

use super::node::Scalar;
use num_bigint::{BigInt, Sign};
use std::fmt;
use std::str::FromStr;

/// The canonical type a raw value was inferred as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Integer,
    Decimal,
    Boolean,
    String,
    Null,
}

/// Arbitrary precision decimal: `unscaled × 10^-scale`.
///
/// Parsing accepts `[+-]digits[.digits][(e|E)[+-]digits]` as long as the scale
/// fits in 32 bits; printing uses plain
/// notation when `scale >= 0` and the adjusted exponent is at least -6, and
/// scientific notation otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: BigInt,
    scale: i64,
}

/// Error returned when text is not a decimal literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDecimalError;

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid decimal literal")
    }
}

impl std::error::Error for ParseDecimalError {}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: i64) -> Self {
        Self { unscaled, scale }
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> i64 {
        self.scale
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
            None => (body, None),
        };

        let (int_part, frac_part) = match mantissa.find('.') {
            Some(pos) => (&mantissa[..pos], &mantissa[pos + 1..]),
            None => (mantissa, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if int_part.len() + frac_part.len() == 0 || !all_digits(int_part) || !all_digits(frac_part)
        {
            return Err(ParseDecimalError);
        }

        let exponent: i64 = match exponent {
            Some(exp) => {
                let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
                if digits.is_empty() || !all_digits(digits) {
                    return Err(ParseDecimalError);
                }
                exp.parse().map_err(|_| ParseDecimalError)?
            }
            None => 0,
        };

        let digits = format!("{}{}", int_part, frac_part);
        let magnitude = BigInt::from_str(&digits).map_err(|_| ParseDecimalError)?;
        let unscaled = if negative { -magnitude } else { magnitude };
        let scale = (frac_part.len() as i64)
            .checked_sub(exponent)
            .filter(|scale| i32::try_from(*scale).is_ok())
            .ok_or(ParseDecimalError)?;

        Ok(Decimal { unscaled, scale })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let coeff = self.unscaled.magnitude().to_string();
        if self.unscaled.sign() == Sign::Minus {
            f.write_str("-")?;
        }
        if self.scale == 0 {
            return f.write_str(&coeff);
        }

        let len = coeff.len() as i128;
        let scale = i128::from(self.scale);
        let adjusted = -scale + (len - 1);

        if scale >= 0 && adjusted >= -6 {
            let pad = scale - len;
            if pad >= 0 {
                write!(f, "0.{}{}", "0".repeat(pad as usize), coeff)
            } else {
                let split = (len - scale) as usize;
                write!(f, "{}.{}", &coeff[..split], &coeff[split..])
            }
        } else {
            f.write_str(&coeff[..1])?;
            if coeff.len() > 1 {
                write!(f, ".{}", &coeff[1..])?;
            }
            if adjusted != 0 {
                f.write_str("E")?;
                if adjusted > 0 {
                    f.write_str("+")?;
                }
                write!(f, "{}", adjusted)?;
            }
            Ok(())
        }
    }
}

/// Infers the canonical scalar for a raw properties value.
///
/// Tries, in order: integer, decimal, the exact literals `true`/`false`,
/// and finally falls back to a string. A candidate is accepted only when it
/// prints back to exactly `raw`.
pub fn infer(raw: &str) -> Scalar {
    if let Some(integer) = parse_integer(raw) {
        if integer.to_string() == raw {
            return Scalar::Integer(integer);
        }
    }
    if let Ok(decimal) = raw.parse::<Decimal>() {
        if decimal.to_string() == raw {
            return Scalar::Decimal(decimal);
        }
    }
    match raw {
        "true" => Scalar::Boolean(true),
        "false" => Scalar::Boolean(false),
        _ => Scalar::String(raw.to_string()),
    }
}

/// Parses `[+-]digits` into an integer.
fn parse_integer(raw: &str) -> Option<BigInt> {
    let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigInt::from_str(raw).ok()
}
