//! Invoker error types.

use gt_02_interface_codec::CodecError;
use shared_crypto::CryptoError;
use shared_types::{Address, TransportError, U256};
use thiserror::Error;

/// The chain (or the node on its behalf) refused the request.
///
/// Never retried with identical arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainRejection {
    /// Execution reverted.
    #[error("execution reverted: {reason}")]
    Reverted {
        /// Decoded revert reason, or the node's message.
        reason: String,
    },

    /// The nonce was already used by another transaction from `sender`.
    #[error("nonce {nonce} too low for {sender}")]
    NonceTooLow {
        /// Sending address.
        sender: Address,
        /// Nonce that was rejected.
        nonce: u64,
    },

    /// `sender` cannot cover `value + gas * price`.
    #[error("insufficient balance for {sender}: need {required}, have {available}")]
    InsufficientBalance {
        /// Sending address.
        sender: Address,
        /// Upper bound on the transaction cost.
        required: U256,
        /// Current balance.
        available: U256,
    },

    /// Any other refusal reported by the node at broadcast.
    #[error("rejected by node: {0}")]
    Refused(String),
}

impl ChainRejection {
    /// Classify a broadcast refusal from the node.
    pub fn from_node(sender: Address, nonce: u64, message: String) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("nonce too low") || lower.contains("replacement transaction underpriced") {
            Self::NonceTooLow { sender, nonce }
        } else if lower.contains("revert") {
            Self::Reverted { reason: message }
        } else {
            Self::Refused(message)
        }
    }
}

/// Errors from [`crate::ContractInvoker`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokerError {
    /// Encoding the call or decoding its output failed.
    #[error("encoding error: {0}")]
    Encoding(#[from] CodecError),

    /// The transport failed; the outcome of the request is unknown.
    #[error("transport error: {0}")]
    Transport(TransportError),

    /// The chain refused the request.
    #[error(transparent)]
    Rejected(#[from] ChainRejection),

    /// The credential could not sign.
    #[error("signing failed: {0}")]
    Signing(#[from] CryptoError),

    /// The credential does not control the declared sender.
    #[error("credential signs for {actual}, not {expected}")]
    CredentialMismatch {
        /// Declared sender.
        expected: Address,
        /// Address of the supplied credential.
        actual: Address,
    },

    /// `value + gas * price` does not fit in 256 bits.
    #[error("transaction cost overflows")]
    CostOverflow,
}

impl InvokerError {
    /// Whether retrying later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_transient())
    }

    /// Whether this is a nonce conflict; resubmitting picks a fresh nonce.
    pub fn is_nonce_conflict(&self) -> bool {
        matches!(self, Self::Rejected(ChainRejection::NonceTooLow { .. }))
    }
}

impl From<TransportError> for InvokerError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Reverted(reason) => Self::Rejected(ChainRejection::Reverted { reason }),
            other => Self::Transport(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_node_refusals() {
        let sender = Address::from_low_u64(1);
        assert_eq!(
            ChainRejection::from_node(sender, 3, "nonce too low: next nonce 4, tx nonce 3".into()),
            ChainRejection::NonceTooLow { sender, nonce: 3 }
        );
        assert_eq!(
            ChainRejection::from_node(sender, 3, "replacement transaction underpriced".into()),
            ChainRejection::NonceTooLow { sender, nonce: 3 }
        );
        assert!(matches!(
            ChainRejection::from_node(sender, 3, "insufficient funds for gas * price + value".into()),
            ChainRejection::Refused(_)
        ));
    }

    #[test]
    fn test_reverted_read_becomes_rejection() {
        let err: InvokerError = TransportError::Reverted("not a validator".into()).into();
        assert_eq!(
            err,
            InvokerError::Rejected(ChainRejection::Reverted { reason: "not a validator".into() })
        );
        assert!(!err.is_transient());

        let err: InvokerError = TransportError::Timeout(500).into();
        assert!(err.is_transient());
    }
}
