//! # ABI Wire Format
//!
//! Head/tail encoding of token sequences. Static values are written inline
//! in the head; dynamic values leave a 32-byte offset in the head and put
//! their payload in the tail, offsets counted from the start of the
//! enclosing tuple.

use super::param_type::{ParamType, WORD};
use super::token::Token;
use crate::errors::CodecError;
use shared_types::{Address, U256};

/// Encode `tokens` as a tuple of `types`. Tokens must already be type-checked.
pub fn encode_params(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, CodecError> {
    if types.len() != tokens.len() {
        return Err(CodecError::mismatch(
            "values",
            ParamType::Tuple(types.to_vec()),
            format!("expected {} members, got {}", types.len(), tokens.len()),
        ));
    }
    let head_len: usize = types.iter().map(ParamType::head_size).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (ty, token) in types.iter().zip(tokens) {
        let encoded = encode_single(ty, token)?;
        if ty.is_dynamic() {
            head.extend_from_slice(&word_from_usize(head_len + tail.len()));
            tail.extend(encoded);
        } else {
            head.extend(encoded);
        }
    }
    head.extend(tail);
    Ok(head)
}

fn encode_single(ty: &ParamType, token: &Token) -> Result<Vec<u8>, CodecError> {
    let out = match (ty, token) {
        (ParamType::Address, Token::Address(address)) => {
            let mut word = [0u8; WORD];
            word[12..].copy_from_slice(address.as_bytes());
            word.to_vec()
        }
        (ParamType::Bool, Token::Bool(value)) => word_from_u256(U256::from(u8::from(*value))).to_vec(),
        (ParamType::Uint(_), Token::Uint(value)) | (ParamType::Int(_), Token::Int(value)) => {
            word_from_u256(*value).to_vec()
        }
        (ParamType::FixedBytes(_), Token::FixedBytes(bytes)) => pad_right(bytes),
        (ParamType::Bytes, Token::Bytes(bytes)) => {
            let mut out = word_from_usize(bytes.len()).to_vec();
            out.extend(pad_right(bytes));
            out
        }
        (ParamType::String, Token::String(text)) => {
            let mut out = word_from_usize(text.len()).to_vec();
            out.extend(pad_right(text.as_bytes()));
            out
        }
        (ParamType::Array(inner), Token::Array(items)) => {
            let types = vec![(**inner).clone(); items.len()];
            let mut out = word_from_usize(items.len()).to_vec();
            out.extend(encode_params(&types, items)?);
            out
        }
        (ParamType::FixedArray(inner, _), Token::FixedArray(items)) => {
            let types = vec![(**inner).clone(); items.len()];
            encode_params(&types, items)?
        }
        (ParamType::Tuple(members), Token::Tuple(items)) => encode_params(members, items)?,
        (ty, token) => {
            return Err(CodecError::mismatch("value", ty, format!("cannot encode {token:?}")));
        }
    };
    Ok(out)
}

/// Decode a tuple of `types` from `data`.
///
/// Trailing bytes after the last referenced payload are ignored.
pub fn decode_params(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, CodecError> {
    let min_len: usize = types.iter().map(ParamType::head_size).sum();
    if data.len() < min_len {
        return Err(CodecError::UnderflowingOutput {
            expected: min_len,
            actual: data.len(),
        });
    }
    decode_tuple(types, data, 0)
}

fn decode_tuple(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>, CodecError> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut cursor = base;
    for ty in types {
        if ty.is_dynamic() {
            let offset = read_usize(data, cursor)?;
            let at = base
                .checked_add(offset)
                .ok_or_else(|| CodecError::InvalidOutput("offset overflow".into()))?;
            tokens.push(decode_single(ty, data, at)?);
            cursor += WORD;
        } else {
            tokens.push(decode_single(ty, data, cursor)?);
            cursor += ty.head_size();
        }
    }
    Ok(tokens)
}

fn decode_single(ty: &ParamType, data: &[u8], at: usize) -> Result<Token, CodecError> {
    match ty {
        ParamType::Address => {
            let word = read_word(data, at)?;
            Ok(Token::Address(Address::from_slice(&word[12..]).unwrap_or(Address::ZERO)))
        }
        ParamType::Bool => match U256::from_big_endian(read_word(data, at)?) {
            v if v.is_zero() => Ok(Token::Bool(false)),
            v if v == U256::one() => Ok(Token::Bool(true)),
            v => Err(CodecError::InvalidOutput(format!("bool word {v}"))),
        },
        ParamType::Uint(bits) => {
            let value = U256::from_big_endian(read_word(data, at)?);
            if value.bits() > *bits {
                return Err(CodecError::InvalidOutput(format!("{value} exceeds uint{bits}")));
            }
            Ok(Token::Uint(value))
        }
        ParamType::Int(_) => Ok(Token::Int(U256::from_big_endian(read_word(data, at)?))),
        ParamType::FixedBytes(len) => Ok(Token::FixedBytes(read_word(data, at)?[..*len].to_vec())),
        ParamType::Bytes => Ok(Token::Bytes(read_dynamic_bytes(data, at)?.to_vec())),
        ParamType::String => {
            let bytes = read_dynamic_bytes(data, at)?;
            String::from_utf8(bytes.to_vec())
                .map(Token::String)
                .map_err(|_| CodecError::InvalidOutput("string is not utf-8".into()))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, at)?;
            let start = at + WORD;
            // Every element occupies at least its head in the payload.
            let element = inner.head_size().max(1);
            if len > data.len().saturating_sub(start) / element {
                return Err(CodecError::UnderflowingOutput {
                    expected: start.saturating_add(len.saturating_mul(element)),
                    actual: data.len(),
                });
            }
            let types = vec![(**inner).clone(); len];
            decode_tuple(&types, data, start).map(Token::Array)
        }
        ParamType::FixedArray(inner, len) => {
            let types = vec![(**inner).clone(); *len];
            decode_tuple(&types, data, at).map(Token::FixedArray)
        }
        ParamType::Tuple(members) => decode_tuple(members, data, at).map(Token::Tuple),
    }
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], CodecError> {
    let end = at.checked_add(WORD).filter(|end| *end <= data.len());
    match end {
        Some(end) => Ok(&data[at..end]),
        None => Err(CodecError::UnderflowingOutput {
            expected: at.saturating_add(WORD),
            actual: data.len(),
        }),
    }
}

fn read_usize(data: &[u8], at: usize) -> Result<usize, CodecError> {
    let value = U256::from_big_endian(read_word(data, at)?);
    if value > U256::from(data.len()) {
        return Err(CodecError::InvalidOutput(format!("offset or length {value} out of range")));
    }
    Ok(value.as_usize())
}

fn read_dynamic_bytes(data: &[u8], at: usize) -> Result<&[u8], CodecError> {
    let len = read_usize(data, at)?;
    let start = at + WORD;
    let end = start.checked_add(len).filter(|end| *end <= data.len());
    match end {
        Some(end) => Ok(&data[start..end]),
        None => Err(CodecError::UnderflowingOutput {
            expected: start.saturating_add(len),
            actual: data.len(),
        }),
    }
}

fn word_from_u256(value: U256) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    value.to_big_endian(&mut word);
    word
}

fn word_from_usize(value: usize) -> [u8; WORD] {
    word_from_u256(U256::from(value))
}

fn pad_right(bytes: &[u8]) -> Vec<u8> {
    let padded_len = bytes.len().div_ceil(WORD) * WORD;
    let mut out = bytes.to_vec();
    out.resize(padded_len, 0);
    out
}
