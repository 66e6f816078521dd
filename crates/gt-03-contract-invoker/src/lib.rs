//! # GT-03 Contract Invoker
//!
//! Executes read-only contract calls (latest or pinned to a height) and
//! builds, signs and broadcasts state-changing transactions.
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | Reads never produce a transaction | `ContractInvoker::call` only uses `Transport::read_call` |
//! | One nonce per accepted transaction per sender | `NonceManager` lease held across broadcast |
//! | Nonce conflict resyncs from the node | `NonceLease::invalidate` on `NonceTooLow` |
//! | No broadcast the sender cannot pay for | balance check against `value + gas * price` |
//! | No silent retries | every failure is returned to the caller |
//!
//! ## Usage Example
//!
//! ```no_run
//! use gt_02_interface_codec::{InterfaceCatalog, ContractRegistry, Token, ELECTION};
//! use gt_03_contract_invoker::{ContractInvoker, InvokerConfig};
//! use shared_types::Transport;
//! use std::sync::Arc;
//!
//! # async fn example(transport: Arc<dyn Transport>, registry: ContractRegistry) -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = InterfaceCatalog::bundled()?;
//! let election = catalog.target(&registry, ELECTION)?;
//! let invoker = ContractInvoker::new(transport, InvokerConfig::default());
//! let limits = invoker.call(&election, "electableValidators", &[], None).await?;
//! println!("{limits}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod domain;
pub mod errors;
pub mod service;

pub use config::InvokerConfig;
pub use domain::{sign_transaction, signing_hash, NonceManager};
pub use errors::{ChainRejection, InvokerError};
pub use service::{ContractInvoker, InvokerStats};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
