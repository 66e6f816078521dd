//! # Domain Layer (Inner Hexagon)
//!
//! Types, the ABI wire format and interface descriptions.
//! NO I/O, NO async.

pub mod abi;
pub mod interface;
pub mod param_type;
pub mod revert;
pub mod target;
pub mod text;
pub mod token;

pub use abi::{decode_params, encode_params};
pub use interface::*;
pub use param_type::*;
pub use revert::*;
pub use target::*;
pub use text::*;
pub use token::Token;
