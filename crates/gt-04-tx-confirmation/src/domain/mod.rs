//! Confirmation domain types.

pub mod outcome;

pub use outcome::{ConfirmationOptions, TransactionOutcome};
