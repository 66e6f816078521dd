//! Errors that stop a batch before its first transfer.
//!
//! Once transfers start, failures are recorded per line in the report
//! instead.

use gt_03_contract_invoker::InvokerError;
use shared_types::{Address, U256};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// The credential does not sign for the paying account.
    #[error("credential signs for {actual}, batch pays from {expected}")]
    CredentialMismatch { expected: Address, actual: Address },

    /// Amounts listed for one destination do not fit in 256 bits.
    #[error("amounts for {destination} overflow")]
    AmountOverflow { destination: Address },

    /// The plan total does not fit in 256 bits.
    #[error("plan total overflows")]
    TotalOverflow,

    /// The paying account holds less than the plan total.
    #[error("{sender} holds {available}, plan needs {required}")]
    InsufficientFunds {
        sender: Address,
        required: U256,
        available: U256,
    },

    /// The balance check itself failed.
    #[error("balance check for {sender} failed: {source}")]
    BalanceUnavailable {
        sender: Address,
        #[source]
        source: InvokerError,
    },
}
