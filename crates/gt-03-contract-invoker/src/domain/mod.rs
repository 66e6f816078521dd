//! Pure submission logic: envelope encoding and nonce bookkeeping.

pub mod envelope;
pub mod nonce;

pub use envelope::{encode_signed, sign_transaction, signing_hash, signing_payload};
pub use nonce::{NonceLease, NonceManager};
