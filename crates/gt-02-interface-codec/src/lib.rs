//! # GT-02 Interface Codec - Interface-Driven Call Encoding
//!
//! Encodes contract calls against a declarative interface description and
//! decodes the returned bytes into typed values, using the Ethereum ABI
//! wire format.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Method names are unique within a description | `InterfaceDescription::new` (`DuplicateMethod`) |
//! | Selector depends only on name + canonical input types | `MethodDescriptor::new` computes it once |
//! | Arguments are checked against declared types before encoding | `MethodDescriptor::check_args` |
//! | Short output never decodes | `decode_params` (`UnderflowingOutput`) |
//! | `decode(encode(args)) == args` | property test in `service.rs` |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | ParamType / Token | `domain/param_type.rs`, `domain/token.rs` | Type grammar and typed values |
//! | Wire format | `domain/abi.rs` | Head/tail encoding |
//! | Descriptions | `domain/interface.rs` | Method arena + name index |
//! | Targets | `domain/target.rs` | `CallTarget`, `ContractRegistry` |
//! | Catalog | `adapters/catalog.rs` | Bundled and on-disk interfaces |
//! | Codec | `service.rs` | `InterfaceCodec::encode` / `decode` |
//!
//! ## Usage Example
//!
//! ```
//! use gt_02_interface_codec::prelude::*;
//!
//! let catalog = InterfaceCatalog::bundled().unwrap();
//! let locked_gold = catalog.get(LOCKED_GOLD).unwrap();
//!
//! let call = InterfaceCodec::encode(&locked_gold, "setUnlockingPeriod", &[Token::uint(259_200u64)]).unwrap();
//! assert_eq!(call.as_bytes().len(), 4 + 32);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod service;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::adapters::catalog::{
        InterfaceCatalog, BLOCKCHAIN_PARAMETERS, ELECTION, EPOCH_REWARDS, GOVERNANCE,
        LOCKED_GOLD, PROXY, VALIDATORS,
    };
    pub use crate::adapters::json::parse_interface;
    pub use crate::domain::interface::{
        selector_of, Decoded, EncodedCall, InterfaceDescription, MethodDescriptor, Param,
    };
    pub use crate::domain::param_type::ParamType;
    pub use crate::domain::revert::decode_revert_reason;
    pub use crate::domain::target::{CallTarget, ContractRegistry};
    pub use crate::domain::text::{parse_args, parse_token};
    pub use crate::domain::token::Token;
    pub use crate::errors::CodecError;
    pub use crate::service::InterfaceCodec;
}

pub use prelude::*;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
