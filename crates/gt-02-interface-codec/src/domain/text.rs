//! # Text Arguments
//!
//! Converts command-line text into tokens of a declared type.
//!
//! | Type | Accepted text |
//! |------|---------------|
//! | `address` | 40 hex digits, `0x` optional |
//! | `bool` | `true` / `false` |
//! | `uint<M>` | decimal or `0x` hex |
//! | `int<M>` | decimal with optional `-` |
//! | `bytes<M>`, `bytes` | `0x` hex |
//! | `string` | verbatim, surrounding double quotes stripped |
//! | `T[]`, `T[k]` | `[a,b,...]` |
//! | tuples | `(a,b,...)` |

use super::interface::MethodDescriptor;
use super::param_type::{split_top_level, ParamType};
use super::token::{twos_complement, Token};
use crate::errors::CodecError;
use shared_types::{Address, U256};

/// Parse one argument of type `ty`.
pub fn parse_token(ty: &ParamType, text: &str, param: &str) -> Result<Token, CodecError> {
    let text = text.trim();
    let fail = |reason: &str| CodecError::mismatch(param, ty, format!("{reason}: {text:?}"));

    let token = match ty {
        ParamType::Address => Token::Address(
            text.parse::<Address>()
                .map_err(|e| fail(&e.to_string()))?,
        ),
        ParamType::Bool => match text {
            "true" => Token::Bool(true),
            "false" => Token::Bool(false),
            _ => return Err(fail("expected true or false")),
        },
        ParamType::Uint(_) => Token::Uint(parse_uint(text).ok_or_else(|| fail("not an unsigned integer"))?),
        ParamType::Int(_) => {
            let (negative, digits) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text),
            };
            let magnitude = parse_uint(digits).ok_or_else(|| fail("not an integer"))?;
            if magnitude > U256::one() << 255 || (!negative && magnitude.bit(255)) {
                return Err(fail("out of range"));
            }
            Token::Int(if negative {
                twos_complement(magnitude)
            } else {
                magnitude
            })
        }
        ParamType::FixedBytes(_) => Token::FixedBytes(parse_hex(text).ok_or_else(|| fail("not hex"))?),
        ParamType::Bytes => Token::Bytes(parse_hex(text).ok_or_else(|| fail("not hex"))?),
        ParamType::String => {
            let unquoted = text
                .strip_prefix('"')
                .and_then(|t| t.strip_suffix('"'))
                .unwrap_or(text);
            Token::String(unquoted.to_string())
        }
        ParamType::Array(inner) => Token::Array(parse_list(inner, text, param)?),
        ParamType::FixedArray(inner, _) => Token::FixedArray(parse_list(inner, text, param)?),
        ParamType::Tuple(members) => {
            let parts = list_items(text, '(', ')').ok_or_else(|| fail("not a tuple"))?;
            if parts.len() != members.len() {
                return Err(fail("wrong number of tuple members"));
            }
            Token::Tuple(
                members
                    .iter()
                    .zip(parts)
                    .enumerate()
                    .map(|(i, (member, part))| parse_token(member, part, &format!("{param}.{i}")))
                    .collect::<Result<_, _>>()?,
            )
        }
    };
    token.type_check(ty, param)?;
    Ok(token)
}

/// Parse every argument of `method` from text, checking arity first.
pub fn parse_args<S: AsRef<str>>(method: &MethodDescriptor, args: &[S]) -> Result<Vec<Token>, CodecError> {
    if args.len() != method.inputs().len() {
        return Err(CodecError::ArityMismatch {
            method: method.name().to_string(),
            expected: method.inputs().len(),
            actual: args.len(),
        });
    }
    method
        .inputs()
        .iter()
        .zip(args)
        .map(|(param, text)| parse_token(&param.kind, text.as_ref(), &param.name))
        .collect()
}

fn parse_uint(text: &str) -> Option<U256> {
    if let Some(digits) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        if digits.is_empty() || digits.len() > 64 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        return U256::from_str_radix(digits, 16).ok();
    }
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    U256::from_dec_str(text).ok()
}

fn parse_hex(text: &str) -> Option<Vec<u8>> {
    hex::decode(text.strip_prefix("0x").unwrap_or(text)).ok()
}

fn list_items(text: &str, open: char, close: char) -> Option<Vec<&str>> {
    let body = text.strip_prefix(open)?.strip_suffix(close)?;
    if body.trim().is_empty() {
        return Some(Vec::new());
    }
    split_top_level(body, ',')
}

fn parse_list(inner: &ParamType, text: &str, param: &str) -> Result<Vec<Token>, CodecError> {
    let items = list_items(text, '[', ']')
        .ok_or_else(|| CodecError::mismatch(param, inner, "unbalanced list"))?;
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| parse_token(inner, item, &format!("{param}[{i}]")))
        .collect()
}
