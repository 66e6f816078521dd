//! # GT-05 Ledger
//!
//! Parses delimited payout ledgers, sums them exactly per destination and
//! cross-checks independent ledgers against each other.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Magnitudes are non-negative and exact | `U256` base units; decimals via `gt-01-numeric` |
//! | Aggregation conserves the total | checked adds into a `BTreeMap`, `total()` tracked alongside |
//! | Order of records never matters | addition is commutative, keys are sorted |
//! | A bad row fails the whole file | `parse_ledger` returns on the first error |
//! | Mismatches are findings, not errors | `reconcile` returns `Vec<Discrepancy>` |
//!
//! ## Usage Example
//!
//! ```
//! use gt_05_ledger::{aggregate, parse_ledger, LedgerLayout};
//! use std::collections::HashSet;
//!
//! let text = "address,name,reward\n\
//!             0x44b39830a0215a0904137c4474927dcfd049acbb,a,100\n\
//!             0x44b39830a0215a0904137c4474927dcfd049acbb,a,25\n";
//! let records = parse_ledger(text, &LedgerLayout::VALIDATOR_PAYOUT).unwrap();
//! let ledger = aggregate(&records, &HashSet::new()).unwrap();
//! assert_eq!(ledger.total(), shared_types::U256::from(125u64));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod errors;

pub use adapters::load_ledger;
pub use domain::*;
pub use errors::LedgerParseError;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
