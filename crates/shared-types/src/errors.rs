//! # Error Types
//!
//! Defines error types used across crates.

use thiserror::Error;

/// Errors raised while parsing hex-encoded primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Input has the wrong number of hex digits.
    #[error("expected {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Input contains a non-hex character.
    #[error("invalid hex character in {0:?}")]
    InvalidHex(String),
}

/// Errors reported by a [`crate::Transport`] implementation.
///
/// `Rejected` is reserved for the node refusing a broadcast (nonce too low,
/// insufficient funds, underpriced replacement) and `Reverted` for a read
/// call whose execution reverted; callers classify both into chain
/// rejections. Every other variant is a transport-level failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the node.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The node did not answer in time.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// The node answered with something we could not interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The node returned a JSON-RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The node refused a broadcast.
    #[error("rejected by node: {0}")]
    Rejected(String),

    /// A read call executed and reverted; carries the decoded reason.
    #[error("execution reverted: {0}")]
    Reverted(String),
}

impl TransportError {
    /// Returns true if retrying the same request later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}
