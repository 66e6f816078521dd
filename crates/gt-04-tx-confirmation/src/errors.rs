//! Confirmation error types.

use shared_types::{TransportError, TxHash};
use thiserror::Error;

/// Polling could not reach a verdict.
///
/// Only transport failures end up here; every chain-level result is a
/// [`crate::TransactionOutcome`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmationError {
    /// Too many consecutive polls failed.
    #[error("polling {hash} failed {attempts} times in a row: {source}")]
    Transport {
        /// Transaction being polled.
        hash: TxHash,
        /// Consecutive failures observed.
        attempts: u32,
        /// Last failure.
        #[source]
        source: TransportError,
    },

    /// A zero poll interval would spin.
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}
