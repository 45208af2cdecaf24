//! Fixed-point salary amount
//!
//! Salaries carry exactly two fractional digits and are held as a signed
//! count of cents. On disk they use the 16-byte decimal layout of four
//! little-endian 32-bit words: lo, mid, hi (96-bit magnitude) and flags
//! (scale in bits 16..=23, sign in bit 31).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const SIGN_MASK: u32 = 0x8000_0000;
const SCALE_MASK: u32 = 0x00FF_0000;
const SCALE_SHIFT: u32 = 16;
const MAX_SCALE: u32 = 28;

/// Errors raised when parsing or decoding a salary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SalaryError {
    #[error("salary '{0}' is not a decimal number")]
    Invalid(String),

    #[error("salary '{0}' has more than two fractional digits")]
    TooPrecise(String),

    #[error("salary is out of range")]
    OutOfRange,

    #[error("decimal flags {0:#010x} have reserved bits set")]
    ReservedFlags(u32),

    #[error("decimal scale {0} exceeds 28")]
    ScaleTooLarge(u32),
}

/// A signed amount with two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Salary {
    cents: i64,
}

impl Salary {
    /// Number of fractional digits.
    pub const SCALE: u32 = 2;

    pub const ZERO: Salary = Salary { cents: 0 };

    pub const fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Whole currency units, saturating on overflow.
    pub const fn from_units(units: i64) -> Self {
        Self {
            cents: units.saturating_mul(100),
        }
    }

    pub const fn cents(&self) -> i64 {
        self.cents
    }

    /// Encodes as `[lo, mid, hi, flags]` with scale 2.
    pub fn to_decimal_words(&self) -> [u32; 4] {
        let magnitude = self.cents.unsigned_abs();
        let lo = magnitude as u32;
        let mid = (magnitude >> 32) as u32;
        let mut flags = Self::SCALE << SCALE_SHIFT;
        if self.cents < 0 {
            flags |= SIGN_MASK;
        }
        [lo, mid, 0, flags]
    }

    /// Decodes `[lo, mid, hi, flags]` of any scale, normalizing to cents.
    ///
    /// Fails if the value cannot be expressed in cents without rounding.
    pub fn from_decimal_words(words: [u32; 4]) -> Result<Self, SalaryError> {
        let [lo, mid, hi, flags] = words;

        if flags & !(SIGN_MASK | SCALE_MASK) != 0 {
            return Err(SalaryError::ReservedFlags(flags));
        }
        let scale = (flags & SCALE_MASK) >> SCALE_SHIFT;
        if scale > MAX_SCALE {
            return Err(SalaryError::ScaleTooLarge(scale));
        }

        let mantissa = (u128::from(hi) << 64) | (u128::from(mid) << 32) | u128::from(lo);
        let cents = if scale <= Self::SCALE {
            mantissa
                .checked_mul(10u128.pow(Self::SCALE - scale))
                .ok_or(SalaryError::OutOfRange)?
        } else {
            let divisor = 10u128.pow(scale - Self::SCALE);
            if mantissa % divisor != 0 {
                return Err(SalaryError::TooPrecise(format!(
                    "{}e-{}",
                    mantissa, scale
                )));
            }
            mantissa / divisor
        };

        let magnitude = i64::try_from(cents).map_err(|_| SalaryError::OutOfRange)?;
        let cents = if flags & SIGN_MASK != 0 {
            -magnitude
        } else {
            magnitude
        };
        Ok(Self { cents })
    }
}

impl fmt::Display for Salary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        let magnitude = self.cents.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, magnitude / 100, magnitude % 100)
    }
}

impl FromStr for Salary {
    type Err = SalaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || SalaryError::Invalid(text.to_string());

        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => {
                if fraction.is_empty() {
                    return Err(invalid());
                }
                (whole, fraction)
            }
            None => (unsigned, ""),
        };

        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        if fraction.len() > Self::SCALE as usize {
            return Err(SalaryError::TooPrecise(text.to_string()));
        }

        let units: i64 = whole.parse().map_err(|_| SalaryError::OutOfRange)?;
        let mut fractional: i64 = if fraction.is_empty() {
            0
        } else {
            fraction.parse().map_err(|_| invalid())?
        };
        if fraction.len() == 1 {
            fractional *= 10;
        }

        let magnitude = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fractional))
            .ok_or(SalaryError::OutOfRange)?;
        Ok(Self {
            cents: if negative { -magnitude } else { magnitude },
        })
    }
}

impl TryFrom<String> for Salary {
    type Error = SalaryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Salary> for String {
    fn from(value: Salary) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        assert_eq!("1500".parse::<Salary>().unwrap().to_string(), "1500.00");
        assert_eq!("1500.5".parse::<Salary>().unwrap().to_string(), "1500.50");
        assert_eq!("0.07".parse::<Salary>().unwrap().cents(), 7);
        assert_eq!("-3.25".parse::<Salary>().unwrap().cents(), -325);
        assert_eq!(" 42.10 ".parse::<Salary>().unwrap().cents(), 4210);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!("abc".parse::<Salary>(), Err(SalaryError::Invalid(_))));
        assert!(matches!("".parse::<Salary>(), Err(SalaryError::Invalid(_))));
        assert!(matches!("1.".parse::<Salary>(), Err(SalaryError::Invalid(_))));
        assert!(matches!(".5".parse::<Salary>(), Err(SalaryError::Invalid(_))));
        assert!(matches!("1.234".parse::<Salary>(), Err(SalaryError::TooPrecise(_))));
    }

    #[test]
    fn test_negative_display_below_one() {
        assert_eq!(Salary::from_cents(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_decimal_words_layout() {
        let words = Salary::from_cents(123_456).to_decimal_words();
        assert_eq!(words, [123_456, 0, 0, 2 << 16]);

        let words = Salary::from_cents(-1).to_decimal_words();
        assert_eq!(words, [1, 0, 0, (2 << 16) | SIGN_MASK]);
    }

    #[test]
    fn test_decimal_words_other_scales() {
        // 15 with scale 0
        assert_eq!(Salary::from_decimal_words([15, 0, 0, 0]).unwrap().cents(), 1500);
        // 1.500 with scale 3
        assert_eq!(
            Salary::from_decimal_words([1500, 0, 0, 3 << 16]).unwrap().cents(),
            150
        );
        // 1.505 cannot be held in cents
        assert!(matches!(
            Salary::from_decimal_words([1505, 0, 0, 3 << 16]),
            Err(SalaryError::TooPrecise(_))
        ));
    }

    #[test]
    fn test_decimal_words_reject_bad_flags() {
        assert!(matches!(
            Salary::from_decimal_words([1, 0, 0, 1]),
            Err(SalaryError::ReservedFlags(_))
        ));
        assert!(matches!(
            Salary::from_decimal_words([1, 0, 0, 29 << 16]),
            Err(SalaryError::ScaleTooLarge(29))
        ));
        assert!(matches!(
            Salary::from_decimal_words([0, 0, 1, 2 << 16]),
            Err(SalaryError::OutOfRange)
        ));
    }
}
