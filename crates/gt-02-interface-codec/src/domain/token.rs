//! # Tokens
//!
//! Typed argument and return values. Signed integers are stored as 256-bit
//! two's complement so that every integer width shares one representation.

use super::param_type::ParamType;
use crate::errors::CodecError;
use shared_types::{Address, U256};
use std::fmt;

/// A typed ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// `address`
    Address(Address),
    /// `bool`
    Bool(bool),
    /// `uint<M>`
    Uint(U256),
    /// `int<M>`, two's complement over 256 bits.
    Int(U256),
    /// `bytes<M>`
    FixedBytes(Vec<u8>),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
    /// `T[]`
    Array(Vec<Token>),
    /// `T[k]`
    FixedArray(Vec<Token>),
    /// `(T1,...)`
    Tuple(Vec<Token>),
}

impl Token {
    /// Unsigned integer token.
    pub fn uint(value: impl Into<U256>) -> Self {
        Self::Uint(value.into())
    }

    /// Signed integer token from a native value.
    #[must_use]
    pub fn int(value: i128) -> Self {
        let magnitude = U256::from(value.unsigned_abs());
        if value < 0 {
            Self::Int(twos_complement(magnitude))
        } else {
            Self::Int(magnitude)
        }
    }

    /// Native value of an `Int` token, if it fits.
    #[must_use]
    pub fn as_i128(&self) -> Option<i128> {
        let Self::Int(raw) = self else { return None };
        if raw.bit(255) {
            let magnitude = twos_complement(*raw);
            if magnitude > U256::from(i128::MAX as u128) + U256::one() {
                return None;
            }
            // magnitude <= 2^127 here, so the negation cannot overflow
            Some((magnitude.low_u128() as i128).wrapping_neg())
        } else if raw.bits() <= 127 {
            Some(raw.low_u128() as i128)
        } else {
            None
        }
    }

    /// The wrapped address, if this is an `Address` token.
    #[must_use]
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Self::Address(address) => Some(*address),
            _ => None,
        }
    }

    /// The wrapped integer, if this is a `Uint` token.
    #[must_use]
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// The wrapped boolean, if this is a `Bool` token.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The wrapped string, if this is a `String` token.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Check that this token is representable as `ty`.
    ///
    /// `param` names the argument in the error.
    pub fn type_check(&self, ty: &ParamType, param: &str) -> Result<(), CodecError> {
        let fail = |reason: String| Err(CodecError::mismatch(param, ty, reason));
        match (ty, self) {
            (ParamType::Address, Self::Address(_))
            | (ParamType::Bool, Self::Bool(_))
            | (ParamType::Bytes, Self::Bytes(_))
            | (ParamType::String, Self::String(_)) => Ok(()),
            (ParamType::Uint(bits), Self::Uint(value)) => {
                if value.bits() > *bits {
                    return fail(format!("value needs {} bits", value.bits()));
                }
                Ok(())
            }
            (ParamType::Int(bits), Self::Int(value)) => {
                if !int_fits(*value, *bits) {
                    return fail("value out of range".into());
                }
                Ok(())
            }
            (ParamType::FixedBytes(len), Self::FixedBytes(bytes)) => {
                if bytes.len() != *len {
                    return fail(format!("expected {len} bytes, got {}", bytes.len()));
                }
                Ok(())
            }
            (ParamType::Array(inner), Self::Array(items)) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| item.type_check(inner, &format!("{param}[{i}]"))),
            (ParamType::FixedArray(inner, len), Self::FixedArray(items)) => {
                if items.len() != *len {
                    return fail(format!("expected {len} elements, got {}", items.len()));
                }
                items
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, item)| item.type_check(inner, &format!("{param}[{i}]")))
            }
            (ParamType::Tuple(members), Self::Tuple(items)) => {
                if items.len() != members.len() {
                    return fail(format!(
                        "expected {} members, got {}",
                        members.len(),
                        items.len()
                    ));
                }
                members
                    .iter()
                    .zip(items)
                    .enumerate()
                    .try_for_each(|(i, (member, item))| {
                        item.type_check(member, &format!("{param}.{i}"))
                    })
            }
            (_, other) => fail(format!("got {}", other.kind())),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Address(_) => "address",
            Self::Bool(_) => "bool",
            Self::Uint(_) => "unsigned integer",
            Self::Int(_) => "signed integer",
            Self::FixedBytes(_) => "fixed bytes",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::FixedArray(_) => "fixed array",
            Self::Tuple(_) => "tuple",
        }
    }
}

/// Two's-complement negation over 256 bits.
pub(crate) fn twos_complement(value: U256) -> U256 {
    (!value).overflowing_add(U256::one()).0
}

/// Whether a two's-complement 256-bit value fits in `bits` signed bits.
pub(crate) fn int_fits(value: U256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    if value.bit(255) {
        // Negative: every bit from `bits - 1` upwards must be set.
        twos_complement(value) <= U256::one() << (bits - 1)
    } else {
        value.bits() < bits
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, open: &str, close: &str, items: &[Token]) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    f.write_str(close)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address(address) => write!(f, "{address}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Int(value) if value.bit(255) => write!(f, "-{}", twos_complement(*value)),
            Self::Int(value) => write!(f, "{value}"),
            Self::FixedBytes(bytes) | Self::Bytes(bytes) => write!(f, "0x{}", hex::encode(bytes)),
            Self::String(text) => f.write_str(text),
            Self::Array(items) | Self::FixedArray(items) => write_list(f, "[", "]", items),
            Self::Tuple(items) => write_list(f, "(", ")", items),
        }
    }
}
