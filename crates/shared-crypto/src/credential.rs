//! # Credentials
//!
//! The invoker never sees key material: it hands a transaction digest to a
//! [`Credential`] and gets a recoverable signature back.

use crate::ecdsa::{RecoverableSignature, Secp256k1KeyPair};
use crate::CryptoError;
use shared_types::Address;
use std::fmt;

/// Opaque signer for transaction envelopes.
pub trait Credential: Send + Sync {
    /// Address whose transactions this credential signs.
    fn address(&self) -> Address;

    /// Sign a 32-byte envelope digest.
    fn sign_prehash(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, CryptoError>;
}

/// Credential backed by an in-process secp256k1 private key.
pub struct LocalKeyCredential {
    keypair: Secp256k1KeyPair,
    address: Address,
}

impl LocalKeyCredential {
    /// Wrap an existing keypair.
    pub fn new(keypair: Secp256k1KeyPair) -> Self {
        let address = keypair.address();
        Self { keypair, address }
    }

    /// Parse a hex-encoded private key.
    pub fn from_hex(secret: &str) -> Result<Self, CryptoError> {
        Secp256k1KeyPair::from_hex(secret).map(Self::new)
    }
}

impl Credential for LocalKeyCredential {
    fn address(&self) -> Address {
        self.address
    }

    fn sign_prehash(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, CryptoError> {
        self.keypair.sign_prehash(digest)
    }
}

// Never print the key.
impl fmt::Debug for LocalKeyCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeyCredential")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
