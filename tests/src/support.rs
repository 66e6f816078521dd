//! Fixtures shared by the integration flows.

use gt_rpc_transport::InMemoryTransport;
use shared_crypto::{Credential, LocalKeyCredential};
use shared_types::U256;
use std::sync::Arc;

/// Key of the funded test account.
pub const OPERATOR_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

/// Chain id of the simulated node.
pub const CHAIN_ID: u64 = 44787;

/// `n` whole coins in base units.
pub fn coins(n: u64) -> U256 {
    U256::exp10(18) * U256::from(n)
}

/// Operator credential.
pub fn operator() -> LocalKeyCredential {
    LocalKeyCredential::from_hex(OPERATOR_KEY).expect("valid test key")
}

/// Simulated node with the operator holding `balance`.
pub fn funded_node(balance: U256) -> Arc<InMemoryTransport> {
    let node = Arc::new(InMemoryTransport::new(CHAIN_ID));
    node.set_balance(operator().address(), balance);
    node
}

/// Big-endian 32-byte word holding `value`.
pub fn word(value: u64) -> Vec<u8> {
    let mut out = vec![0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}
