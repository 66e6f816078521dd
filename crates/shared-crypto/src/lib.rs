//! # Shared Crypto - Transaction Signing
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Recoverable transaction signatures, address derivation |
//! | `credential` | - | Opaque signer handed to the contract invoker |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - Key material is zeroized on drop and never leaves [`LocalKeyCredential`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod credential;
pub mod ecdsa;
pub mod errors;

// Re-exports
pub use credential::{Credential, LocalKeyCredential};
pub use ecdsa::{public_key_to_address, recover_address, RecoverableSignature, Secp256k1KeyPair};
pub use errors::CryptoError;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
