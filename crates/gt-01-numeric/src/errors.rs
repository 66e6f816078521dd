//! # Error Types

use thiserror::Error;

/// Errors from amount conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    /// Input is not a decimal number (non-numeric, multiple points, bad exponent).
    #[error("invalid decimal: {0:?}")]
    InvalidDecimal(String),

    /// Amounts are non-negative.
    #[error("negative amount not allowed: {0:?}")]
    NegativeAmount(String),

    /// Scaled value does not fit in 256 bits.
    #[error("amount overflows 256 bits: {0:?}")]
    Overflow(String),

    /// Requested scale cannot be represented.
    #[error("unsupported number of decimals: {0}")]
    InvalidScale(u32),
}
