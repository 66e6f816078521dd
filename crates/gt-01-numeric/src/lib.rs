//! # GT-01 Numeric - Decimal / Base-Unit Conversion
//!
//! Converts human-readable decimal amounts to fixed-point base-unit integers
//! (scale 10^18 by default) and back.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | No binary floating point at any stage | digit-string arithmetic in `converter.rs` |
//! | Excess fractional precision is truncated, never rounded | `NumericConverter::to_base_units` |
//! | `to_base_units(to_decimal(n)) == n` | `NumericConverter::to_decimal` prints every significant digit |
//!
//! ## Usage Example
//!
//! ```
//! use gt_01_numeric::{to_base_units, to_decimal};
//!
//! let wei = to_base_units("4.28E-05").unwrap();
//! assert_eq!(wei.to_string(), "42800000000000");
//! assert_eq!(to_decimal(wei), "0.0000428");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod converter;
pub mod errors;

pub use converter::{
    parse_base_units, to_base_units, to_decimal, NumericConverter, BASE_DECIMALS,
};
pub use errors::NumericError;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
