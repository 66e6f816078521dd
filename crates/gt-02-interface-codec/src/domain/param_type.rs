//! # Parameter Types
//!
//! The subset of the Solidity ABI type grammar the toolkit encodes:
//! elementary types, dynamic/fixed arrays and tuples.

use crate::errors::CodecError;
use std::fmt;
use std::str::FromStr;

/// ABI word size in bytes.
pub const WORD: usize = 32;

/// A declared parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// 20-byte account address.
    Address,
    /// Boolean.
    Bool,
    /// Unsigned integer of the given bit width.
    Uint(usize),
    /// Two's-complement signed integer of the given bit width.
    Int(usize),
    /// Fixed-size byte string (`bytes1`..`bytes32`).
    FixedBytes(usize),
    /// Dynamic byte string.
    Bytes,
    /// Dynamic UTF-8 string.
    String,
    /// Dynamic-length array `T[]`.
    Array(Box<ParamType>),
    /// Fixed-length array `T[k]`.
    FixedArray(Box<ParamType>, usize),
    /// Tuple `(T1,T2,...)`.
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Whether values of this type live in the tail section.
    #[must_use]
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Bytes | Self::String | Self::Array(_) => true,
            Self::FixedArray(inner, _) => inner.is_dynamic(),
            Self::Tuple(members) => members.iter().any(Self::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head section.
    #[must_use]
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD;
        }
        match self {
            Self::FixedArray(inner, len) => inner.head_size() * len,
            Self::Tuple(members) => members.iter().map(Self::head_size).sum(),
            _ => WORD,
        }
    }

    /// Canonical type string used in method signatures.
    #[must_use]
    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address => f.write_str("address"),
            Self::Bool => f.write_str("bool"),
            Self::Uint(bits) => write!(f, "uint{bits}"),
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::FixedBytes(len) => write!(f, "bytes{len}"),
            Self::Bytes => f.write_str("bytes"),
            Self::String => f.write_str("string"),
            Self::Array(inner) => write!(f, "{inner}[]"),
            Self::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            Self::Tuple(members) => {
                f.write_str("(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl FromStr for ParamType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let invalid = || CodecError::InvalidType(s.to_string());

        // Array suffixes bind last: `uint256[2][]` is an array of `uint256[2]`.
        if let Some(body) = text.strip_suffix(']') {
            let open = body.rfind('[').ok_or_else(invalid)?;
            let inner: ParamType = body[..open].parse().map_err(|_| invalid())?;
            let len_text = &body[open + 1..];
            return if len_text.is_empty() {
                Ok(Self::Array(Box::new(inner)))
            } else {
                let len: usize = len_text.parse().map_err(|_| invalid())?;
                if len == 0 {
                    return Err(invalid());
                }
                Ok(Self::FixedArray(Box::new(inner), len))
            };
        }

        if let Some(body) = text.strip_prefix('(') {
            let body = body.strip_suffix(')').ok_or_else(invalid)?;
            if body.trim().is_empty() {
                return Err(invalid());
            }
            let members = split_top_level(body, ',')
                .ok_or_else(invalid)?
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<ParamType>, _>>()
                .map_err(|_| invalid())?;
            return Ok(Self::Tuple(members));
        }

        match text {
            "address" => return Ok(Self::Address),
            "bool" => return Ok(Self::Bool),
            "bytes" => return Ok(Self::Bytes),
            "string" => return Ok(Self::String),
            "uint" => return Ok(Self::Uint(256)),
            "int" => return Ok(Self::Int(256)),
            "byte" => return Ok(Self::FixedBytes(1)),
            _ => {}
        }

        let sized = |prefix: &str| -> Option<usize> { text.strip_prefix(prefix)?.parse().ok() };
        if let Some(bits) = sized("uint") {
            return valid_bits(bits).map(Self::Uint).ok_or_else(invalid);
        }
        if let Some(bits) = sized("int") {
            return valid_bits(bits).map(Self::Int).ok_or_else(invalid);
        }
        if let Some(len) = sized("bytes") {
            return (1..=32)
                .contains(&len)
                .then_some(Self::FixedBytes(len))
                .ok_or_else(invalid);
        }
        Err(invalid())
    }
}

fn valid_bits(bits: usize) -> Option<usize> {
    (bits > 0 && bits <= 256 && bits % 8 == 0).then_some(bits)
}

/// Split `text` on `separator` where it is not nested inside brackets,
/// parentheses or double quotes. Returns `None` on unbalanced nesting.
pub(crate) fn split_top_level(text: &str, separator: char) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            '(' | '[' if !in_quotes => depth += 1,
            ')' | ']' if !in_quotes => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            c if c == separator && depth == 0 && !in_quotes => {
                parts.push(text[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 || in_quotes {
        return None;
    }
    parts.push(text[start..].trim());
    Some(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elementary() {
        assert_eq!("address".parse::<ParamType>().unwrap(), ParamType::Address);
        assert_eq!("uint".parse::<ParamType>().unwrap(), ParamType::Uint(256));
        assert_eq!("uint8".parse::<ParamType>().unwrap(), ParamType::Uint(8));
        assert_eq!("int128".parse::<ParamType>().unwrap(), ParamType::Int(128));
        assert_eq!("bytes32".parse::<ParamType>().unwrap(), ParamType::FixedBytes(32));
        assert_eq!("bytes".parse::<ParamType>().unwrap(), ParamType::Bytes);
    }

    #[test]
    fn test_parse_nested() {
        let ty: ParamType = "(address,uint256[])[2]".parse().unwrap();
        assert_eq!(
            ty,
            ParamType::FixedArray(
                Box::new(ParamType::Tuple(vec![
                    ParamType::Address,
                    ParamType::Array(Box::new(ParamType::Uint(256))),
                ])),
                2
            )
        );
        assert_eq!(ty.canonical(), "(address,uint256[])[2]");
    }

    #[test]
    fn test_reject_invalid() {
        for bad in ["uint7", "uint264", "int0", "bytes33", "bytes0", "float", "uint256[", "(uint256", "address[x]", "uint256[0]", "()"] {
            assert!(bad.parse::<ParamType>().is_err(), "accepted {bad}");
        }
    }

    #[test]
    fn test_dynamic_and_head_size() {
        let ty: ParamType = "uint256[3]".parse().unwrap();
        assert!(!ty.is_dynamic());
        assert_eq!(ty.head_size(), 96);

        let ty: ParamType = "string[3]".parse().unwrap();
        assert!(ty.is_dynamic());
        assert_eq!(ty.head_size(), 32);

        let ty: ParamType = "(address,bool)".parse().unwrap();
        assert_eq!(ty.head_size(), 64);
    }

    #[test]
    fn test_split_top_level() {
        assert_eq!(
            split_top_level("1,[2,3],(4,\"a,b\")", ',').unwrap(),
            vec!["1", "[2,3]", "(4,\"a,b\")"]
        );
        assert!(split_top_level("[1,2", ',').is_none());
    }
}
