//! # Gov-Toolkit Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── integration/          # Cross-crate flows against InMemoryTransport
//! │   ├── governance_flow.rs  # read, submit, confirm through the catalog
//! │   ├── nonce_race.rs       # two invokers, one sender
//! │   └── payout_flow.rs      # ledger files to settled payouts
//! └── support.rs            # shared fixtures
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gt-tests
//! cargo test -p gt-tests integration::payout_flow
//! cargo bench -p gt-tests
//! ```

pub mod integration;
#[cfg(test)]
pub mod support;
