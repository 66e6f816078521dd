//! # Revert Reasons
//!
//! Contracts revert with `Error(string)` for `require`/`revert` messages
//! and `Panic(uint256)` for failed assertions and arithmetic faults.

use super::abi::decode_params;
use super::param_type::ParamType;
use super::token::Token;

/// Selector of `Error(string)`.
pub const ERROR_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// Selector of `Panic(uint256)`.
pub const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Human-readable reason for revert data.
///
/// Returns `None` for empty data. Unrecognised payloads are rendered as hex.
#[must_use]
pub fn decode_revert_reason(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    if data.len() >= 4 {
        let (selector, body) = data.split_at(4);
        if selector == ERROR_SELECTOR {
            if let Ok(mut tokens) = decode_params(&[ParamType::String], body) {
                if let Some(Token::String(message)) = tokens.pop() {
                    return Some(message);
                }
            }
        } else if selector == PANIC_SELECTOR {
            if let Ok(mut tokens) = decode_params(&[ParamType::Uint(256)], body) {
                if let Some(Token::Uint(code)) = tokens.pop() {
                    let code = code.low_u64();
                    return Some(format!("panic 0x{code:02x}: {}", panic_description(code)));
                }
            }
        }
    }
    Some(format!("0x{}", hex::encode(data)))
}

fn panic_description(code: u64) -> &'static str {
    match code {
        0x01 => "assertion failed",
        0x11 => "arithmetic overflow or underflow",
        0x12 => "division or modulo by zero",
        0x21 => "invalid enum value",
        0x22 => "invalid storage byte array",
        0x31 => "pop on empty array",
        0x32 => "array index out of bounds",
        0x41 => "out of memory",
        0x51 => "call to uninitialized function",
        _ => "unknown panic code",
    }
}
