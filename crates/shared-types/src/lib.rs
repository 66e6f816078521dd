//! # Shared Types Crate
//!
//! Chain primitives, transaction envelopes and the outbound `Transport` port
//! shared by every Gov-Toolkit crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses a crate boundary is
//!   defined here.
//! - **Exact Amounts**: all on-chain amounts are `U256` base units; nothing
//!   in this workspace carries money in floating point.
//! - **Opaque Transport**: the toolkit never assumes a wire protocol beyond
//!   the operations of [`Transport`].

pub mod entities;
pub mod errors;
pub mod transport;

pub use entities::*;
pub use errors::*;
pub use transport::*;
