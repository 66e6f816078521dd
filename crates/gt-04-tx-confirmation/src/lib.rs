//! # GT-04 Transaction Confirmation
//!
//! Polls a submitted transaction until it is confirmed, reverted or
//! dropped, or until the wait budget runs out.
//!
//! ## State Machine
//!
//! | From | Observation | To |
//! |------|-------------|----|
//! | Pending | receipt with success status | `Confirmed(height, gas)` |
//! | Pending | receipt with failure status | `Reverted(reason?)` |
//! | Pending | hash unknown and sender's confirmed nonce moved past ours | `Dropped` |
//! | Pending | wait budget spent, or cancel signal | `TimedOut` |
//!
//! All four are terminal. `TimedOut` means "unknown, recheck later".

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod errors;
pub mod service;

pub use domain::{ConfirmationOptions, TransactionOutcome};
pub use errors::ConfirmationError;
pub use service::TransactionConfirmer;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
