//! Terminal outcomes and polling options.

use serde::{Deserialize, Serialize};
use shared_types::{BlockHeight, Receipt, ReceiptStatus};
use std::fmt;
use std::time::Duration;

/// Where a submitted transaction ended up.
///
/// `TimedOut` is not a chain-level verdict: the transaction may still be
/// included later and must be rechecked, never treated as failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransactionOutcome {
    /// Included with a success status.
    Confirmed {
        /// Inclusion height.
        block_height: BlockHeight,
        /// Gas consumed.
        gas_used: u64,
    },
    /// Included with a failure status.
    Reverted {
        /// Revert reason, when the transport could retrieve it.
        reason: Option<String>,
    },
    /// Unknown to the node and its nonce was taken by another transaction.
    Dropped,
    /// No verdict within the wait budget, or polling was cancelled.
    TimedOut,
}

impl TransactionOutcome {
    /// Outcome for an observed receipt.
    pub fn from_receipt(receipt: Receipt) -> Self {
        match receipt.status {
            ReceiptStatus::Success => Self::Confirmed {
                block_height: receipt.block_height,
                gas_used: receipt.gas_used,
            },
            ReceiptStatus::Failure => Self::Reverted {
                reason: receipt.revert_reason,
            },
        }
    }

    /// Included successfully.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }

    /// Whether the transaction may still land on chain.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl fmt::Display for TransactionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed {
                block_height,
                gas_used,
            } => write!(f, "confirmed at block {block_height} (gas {gas_used})"),
            Self::Reverted { reason: Some(reason) } => write!(f, "reverted: {reason}"),
            Self::Reverted { reason: None } => f.write_str("reverted"),
            Self::Dropped => f.write_str("dropped"),
            Self::TimedOut => f.write_str("timed out"),
        }
    }
}

/// Polling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfirmationOptions {
    /// Delay between receipt polls.
    pub poll_interval_ms: u64,
    /// Give up (with `TimedOut`) after this long.
    pub max_wait_ms: u64,
    /// Transport failures tolerated in a row before the error surfaces.
    pub max_consecutive_errors: u32,
}

impl Default for ConfirmationOptions {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            max_wait_ms: 120_000,
            max_consecutive_errors: 3,
        }
    }
}

impl ConfirmationOptions {
    /// Poll interval as a duration.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Wait budget as a duration.
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}
