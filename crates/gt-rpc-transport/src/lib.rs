//! # Transport Adapters
//!
//! Implementations of the [`shared_types::Transport`] port.
//!
//! - [`JsonRpcTransport`]: a node reached over HTTP JSON-RPC.
//! - [`InMemoryTransport`]: a scriptable node living in-process, used by
//!   tests and `--dry-run`.

pub mod in_memory;
pub mod json_rpc;

pub use in_memory::{InMemoryTransport, RecordedCall, ScriptedOutcome, CALL_GAS, TRANSFER_GAS};
pub use json_rpc::JsonRpcTransport;
