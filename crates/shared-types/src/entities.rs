//! # Core Domain Entities
//!
//! Chain primitives and transaction envelopes.
//!
//! ## Clusters
//!
//! - **Primitives**: `Address`, `TxHash`, `BlockHeight`, `U256`
//! - **Envelopes**: `UnsignedTransaction`, `SignedTransaction`
//! - **Lifecycle**: `TransactionHandle`, `Receipt`

use crate::errors::ParseError;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;

// Re-export U256 from primitive-types for use across all crates
pub use primitive_types::U256;

/// Block number on the target chain.
pub type BlockHeight = u64;

/// Keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

fn decode_fixed_hex<const N: usize>(s: &str) -> Result<[u8; N], ParseError> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.len() != N * 2 {
        return Err(ParseError::InvalidLength {
            expected: N * 2,
            actual: digits.len(),
        });
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out).map_err(|_| ParseError::InvalidHex(s.to_string()))?;
    Ok(out)
}

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account or contract address.
///
/// Parses from 40 hex digits with an optional `0x` prefix. Case is not
/// validated on input; `Display` renders the EIP-55 checksum form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Builds an address whose last bytes hold `value` (e.g. `0xce10`).
    #[must_use]
    pub fn from_low_u64(value: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// EIP-55 mixed-case checksum encoding, `0x`-prefixed.
    #[must_use]
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, ch) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if ch.is_ascii_alphabetic() && nibble >= 8 {
                out.push(ch.to_ascii_uppercase());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed_hex::<20>(s).map(Self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 20] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// =============================================================================
// TRANSACTION HASH (32 bytes)
// =============================================================================

/// Keccak-256 hash of a signed transaction envelope.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TxHash(pub [u8; 32]);

impl TxHash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hashes raw envelope bytes.
    #[must_use]
    pub fn of(raw: &[u8]) -> Self {
        Self(keccak256(raw))
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for TxHash {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed_hex::<32>(s).map(Self)
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<[u8; 32]> for TxHash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for TxHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TxHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// =============================================================================
// TRANSACTION ENVELOPES
// =============================================================================

/// A legacy (EIP-155) transaction before signing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Sender's transaction count at submission time.
    pub nonce: u64,
    /// Price per unit of gas, in base units.
    pub gas_price: U256,
    /// Maximum gas the transaction may consume.
    pub gas_limit: u64,
    /// Destination; `None` only for contract creation.
    pub to: Option<Address>,
    /// Base units transferred with the call.
    pub value: U256,
    /// ABI-encoded call data (empty for plain transfers).
    pub data: Vec<u8>,
    /// Replay-protection chain id.
    pub chain_id: u64,
}

impl UnsignedTransaction {
    /// Upper bound on what the sender pays: `value + gas_limit * gas_price`.
    ///
    /// Returns `None` on overflow.
    #[must_use]
    pub fn max_cost(&self) -> Option<U256> {
        self.gas_price
            .checked_mul(U256::from(self.gas_limit))
            .and_then(|fee| fee.checked_add(self.value))
    }
}

/// A signed envelope ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    /// The signed payload.
    pub unsigned: UnsignedTransaction,
    /// Address of the signing key.
    pub sender: Address,
    /// EIP-155 `v` (`recovery_id + 35 + 2 * chain_id`).
    pub v: u64,
    /// Signature `r`.
    pub r: [u8; 32],
    /// Signature `s` (low-S normalised).
    pub s: [u8; 32],
    /// RLP encoding of the signed envelope.
    pub raw: Vec<u8>,
    /// `keccak256(raw)`.
    pub hash: TxHash,
}

// =============================================================================
// TRANSACTION LIFECYCLE
// =============================================================================

/// Identifier for a broadcast transaction.
///
/// Carries the sender and nonce so the confirmer can tell a dropped
/// transaction (nonce superseded) from one that is merely slow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionHandle {
    /// Transaction hash returned by the transport.
    pub hash: TxHash,
    /// Sending address.
    pub sender: Address,
    /// Nonce the envelope was signed with.
    pub nonce: u64,
}

impl fmt::Display for TransactionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (nonce {})", self.hash, self.nonce)
    }
}

/// Execution status reported in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    /// Execution succeeded (status code 1).
    Success,
    /// Execution reverted (status code 0).
    Failure,
}

/// Transport-reported record of a transaction's execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Success or failure.
    pub status: ReceiptStatus,
    /// Block the transaction was included in.
    pub block_height: BlockHeight,
    /// Gas consumed by execution.
    pub gas_used: u64,
    /// Revert reason, when the node exposes it.
    pub revert_reason: Option<String>,
}

impl Receipt {
    /// Receipt for a successful execution.
    #[must_use]
    pub fn success(block_height: BlockHeight, gas_used: u64) -> Self {
        Self {
            status: ReceiptStatus::Success,
            block_height,
            gas_used,
            revert_reason: None,
        }
    }

    /// Receipt for a reverted execution.
    #[must_use]
    pub fn failure(block_height: BlockHeight, gas_used: u64, reason: Option<String>) -> Self {
        Self {
            status: ReceiptStatus::Failure,
            block_height,
            gas_used,
            revert_reason: reason,
        }
    }
}
