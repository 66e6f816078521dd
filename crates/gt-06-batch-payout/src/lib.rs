//! # Batch Payout
//!
//! Turns an aggregated ledger into a [`PayoutPlan`] and pays it with
//! paced, individually confirmed transfers.
//!
//! ## Rules
//!
//! | Rule | Effect |
//! |------|--------|
//! | Zero amount | `Skipped`, nothing broadcast |
//! | Excluded address | `Skipped`, nothing broadcast |
//! | Submit error | `SubmitFailed`, run continues |
//! | No verdict in time | `TimedOut`, listed by `in_doubt`, not rerun |
//! | Stop requested | remaining entries `NotAttempted` |
//!
//! Transfers already confirmed in an earlier run are dropped from a plan
//! with [`PayoutPlan::without`].

pub mod config;
pub mod domain;
pub mod errors;
pub mod service;

pub use config::BatchConfig;
pub use domain::{PayoutEntry, PayoutLine, PayoutPlan, PayoutReport, PayoutStatus};
pub use errors::BatchError;
pub use service::BatchPayoutDriver;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
