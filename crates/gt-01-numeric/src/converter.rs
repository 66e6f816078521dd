//! # Converter
//!
//! All arithmetic is done on decimal digit strings and `U256`; a value never
//! passes through `f64`.

use crate::errors::NumericError;
use shared_types::U256;

/// Default fixed-point scale: 1 coin = 10^18 base units.
pub const BASE_DECIMALS: u32 = 18;

/// `U256::MAX` has 78 decimal digits.
const MAX_U256_DIGITS: usize = 78;

/// Fixed-point converter for a given number of decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericConverter {
    decimals: u32,
}

impl Default for NumericConverter {
    fn default() -> Self {
        Self {
            decimals: BASE_DECIMALS,
        }
    }
}

impl NumericConverter {
    /// Converter with a custom scale.
    pub fn new(decimals: u32) -> Result<Self, NumericError> {
        if decimals as usize >= MAX_U256_DIGITS {
            return Err(NumericError::InvalidScale(decimals));
        }
        Ok(Self { decimals })
    }

    /// Number of fractional decimal digits one base unit represents.
    #[must_use]
    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Parse a decimal amount into base units.
    ///
    /// Accepts an optional leading `+`, an optional fractional part and an
    /// optional `e`/`E` exponent. Precision beyond the scale is truncated.
    pub fn to_base_units(&self, input: &str) -> Result<U256, NumericError> {
        let invalid = || NumericError::InvalidDecimal(input.to_string());
        let text = input.trim();

        let unsigned = match text.as_bytes().first() {
            Some(b'-') => return Err(NumericError::NegativeAmount(input.to_string())),
            Some(b'+') => &text[1..],
            Some(_) => text,
            None => return Err(invalid()),
        };

        let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
            Some(pos) => {
                let exp_text = &unsigned[pos + 1..];
                let exp: i64 = parse_exponent(exp_text).ok_or_else(invalid)?;
                (&unsigned[..pos], exp)
            }
            None => (unsigned, 0),
        };

        let mut parts = mantissa.split('.');
        let int_part = parts.next().unwrap_or_default();
        let frac_part = parts.next().unwrap_or_default();
        if parts.next().is_some() {
            return Err(invalid());
        }
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut digits: String = int_part.chars().chain(frac_part.chars()).collect();
        // Power of ten to apply to `digits` to land on base units.
        let shift = i128::from(exponent) - frac_part.len() as i128 + i128::from(self.decimals);

        if shift < 0 {
            let drop = usize::try_from(-shift).unwrap_or(usize::MAX);
            if drop >= digits.len() {
                return Ok(U256::zero());
            }
            digits.truncate(digits.len() - drop);
        }

        let significant = digits.trim_start_matches('0');
        if significant.is_empty() {
            return Ok(U256::zero());
        }

        let mut scaled = significant.to_string();
        if shift > 0 {
            let zeros = usize::try_from(shift).unwrap_or(usize::MAX);
            if zeros > MAX_U256_DIGITS || scaled.len() + zeros > MAX_U256_DIGITS {
                return Err(NumericError::Overflow(input.to_string()));
            }
            scaled.extend(std::iter::repeat('0').take(zeros));
        }

        U256::from_dec_str(&scaled).map_err(|_| NumericError::Overflow(input.to_string()))
    }

    /// Render base units as a decimal string.
    ///
    /// Trailing fractional zeros are removed; whole amounts have no point.
    #[must_use]
    pub fn to_decimal(&self, value: U256) -> String {
        let digits = value.to_string();
        let scale = self.decimals as usize;
        if scale == 0 {
            return digits;
        }

        let padded = if digits.len() <= scale {
            format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits)
        } else {
            digits
        };

        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        let frac = frac_part.trim_end_matches('0');
        if frac.is_empty() {
            int_part.to_string()
        } else {
            format!("{int_part}.{frac}")
        }
    }
}

fn parse_exponent(text: &str) -> Option<i64> {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let significant = digits.trim_start_matches('0');
    // Exponents this large only ever produce zero or overflow.
    let clamped = match significant.len() {
        0 => "0",
        1..=6 => significant,
        _ => "999999",
    };
    let magnitude: i64 = clamped.parse().ok()?;
    Some(if text.starts_with('-') { -magnitude } else { magnitude })
}

/// [`NumericConverter::to_base_units`] at the default scale.
pub fn to_base_units(input: &str) -> Result<U256, NumericError> {
    NumericConverter::default().to_base_units(input)
}

/// [`NumericConverter::to_decimal`] at the default scale.
#[must_use]
pub fn to_decimal(value: U256) -> String {
    NumericConverter::default().to_decimal(value)
}

/// Parse a non-negative integer that is already in base units.
pub fn parse_base_units(input: &str) -> Result<U256, NumericError> {
    let text = input.trim();
    let digits = text.strip_prefix('+').unwrap_or(text);
    if text.starts_with('-') {
        return Err(NumericError::NegativeAmount(input.to_string()));
    }
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NumericError::InvalidDecimal(input.to_string()));
    }
    U256::from_dec_str(digits).map_err(|_| NumericError::Overflow(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn units(s: &str) -> U256 {
        U256::from_dec_str(s).unwrap()
    }

    #[test]
    fn test_whole_and_fractional() {
        assert_eq!(to_base_units("1").unwrap(), units("1000000000000000000"));
        assert_eq!(to_base_units("0.5").unwrap(), units("500000000000000000"));
        assert_eq!(to_base_units(".5").unwrap(), units("500000000000000000"));
        assert_eq!(to_base_units("2.").unwrap(), units("2000000000000000000"));
        assert_eq!(to_base_units(" +50000 ").unwrap(), units("50000000000000000000000"));
        assert_eq!(to_base_units("0").unwrap(), U256::zero());
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(to_base_units("4.28E-05").unwrap(), units("42800000000000"));
        assert_eq!(to_base_units("1e3").unwrap(), units("1000000000000000000000"));
        assert_eq!(to_base_units("1.5e+2").unwrap(), units("150000000000000000000"));
        assert_eq!(to_base_units("1e-18").unwrap(), U256::one());
        assert_eq!(to_base_units("1e-19").unwrap(), U256::zero());
        // Leading zeros in the exponent do not change its value.
        assert_eq!(to_base_units("1e0000003").unwrap(), units("1000000000000000000000"));
        assert_eq!(to_base_units("5e-0000001").unwrap(), units("500000000000000000"));
        assert_eq!(to_base_units("2e0000000000").unwrap(), units("2000000000000000000"));
        assert!(matches!(to_base_units("1e0001000"), Err(NumericError::Overflow(_))));
    }

    #[test]
    fn test_full_precision_kept() {
        assert_eq!(
            to_base_units("123.456789123456789012").unwrap(),
            units("123456789123456789012")
        );
    }

    #[test]
    fn test_excess_precision_truncates() {
        // ...678|99 would round up to ...679; truncation keeps ...678
        assert_eq!(
            to_base_units("0.12345678901234567899").unwrap(),
            units("123456789012345678")
        );
        assert_eq!(to_base_units("0.0000000000000000009").unwrap(), U256::zero());
    }

    #[test]
    fn test_malformed_input() {
        for bad in ["", " ", "abc", "1.2.3", "1..2", ".", "1e", "1e5.5", "0x10", "1,5", "e5", "1 2"] {
            assert!(
                matches!(to_base_units(bad), Err(NumericError::InvalidDecimal(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_negative_rejected() {
        assert!(matches!(to_base_units("-1"), Err(NumericError::NegativeAmount(_))));
        assert!(matches!(parse_base_units("-1"), Err(NumericError::NegativeAmount(_))));
    }

    #[test]
    fn test_overflow() {
        assert!(matches!(to_base_units("1e80"), Err(NumericError::Overflow(_))));
        assert!(matches!(to_base_units("1e9999999999"), Err(NumericError::Overflow(_))));
        assert_eq!(to_base_units("0e9999999999").unwrap(), U256::zero());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(to_decimal(U256::zero()), "0");
        assert_eq!(to_decimal(U256::one()), "0.000000000000000001");
        assert_eq!(to_decimal(units("1000000000000000000")), "1");
        assert_eq!(to_decimal(units("1250000000000000000")), "1.25");
        assert_eq!(to_decimal(units("50000000000000000000000")), "50000");
    }

    #[test]
    fn test_custom_scale() {
        let gwei = NumericConverter::new(9).unwrap();
        assert_eq!(gwei.to_base_units("20").unwrap(), U256::from(20_000_000_000u64));
        assert_eq!(gwei.to_decimal(U256::from(1_500_000_000u64)), "1.5");
        assert!(NumericConverter::new(78).is_err());
    }

    #[test]
    fn test_parse_base_units() {
        assert_eq!(parse_base_units(" 125 ").unwrap(), U256::from(125u64));
        assert!(matches!(parse_base_units("1.5"), Err(NumericError::InvalidDecimal(_))));
        assert!(matches!(parse_base_units(""), Err(NumericError::InvalidDecimal(_))));
    }

    proptest! {
        #[test]
        fn prop_roundtrip(limbs in any::<[u64; 4]>()) {
            let n = U256(limbs);
            prop_assert_eq!(to_base_units(&to_decimal(n)).unwrap(), n);
        }

        #[test]
        fn prop_roundtrip_small(n in any::<u128>()) {
            let value = U256::from(n);
            prop_assert_eq!(to_base_units(&to_decimal(value)).unwrap(), value);
        }
    }
}
