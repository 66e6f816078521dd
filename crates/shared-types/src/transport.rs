//! # Transport Port (Outbound)
//!
//! The only way the toolkit talks to a node. Implementations live in
//! `gt-rpc-transport` (JSON-RPC over HTTP, scriptable in-memory double).
//!
//! The first five operations are the core contract: read calls (optionally
//! pinned to a height), simulated calls as a sender, broadcast, receipt
//! lookup and balance lookup. The remaining queries feed envelope
//! construction (nonce, gas, chain id) and the dropped-transaction rule.

use crate::entities::{Address, BlockHeight, Receipt, SignedTransaction, TxHash, U256};
use crate::errors::TransportError;
use async_trait::async_trait;

/// Parameters for a gas estimate.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallRequest {
    /// Simulated sender.
    pub from: Option<Address>,
    /// Destination.
    pub to: Option<Address>,
    /// Attached value in base units.
    pub value: U256,
    /// Call data.
    pub data: Vec<u8>,
}

/// Interface to a chain node.
///
/// Implementations must be shareable across tasks; a single transport may
/// back several invokers at once.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a read-only call against `to`.
    ///
    /// `at_height = None` means latest known state.
    async fn read_call(
        &self,
        to: Address,
        data: &[u8],
        at_height: Option<BlockHeight>,
    ) -> Result<Vec<u8>, TransportError>;

    /// Execute a read-only call simulated as `from`.
    async fn read_call_as(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, TransportError>;

    /// Broadcast a signed envelope. Returns as soon as the node accepts it.
    async fn broadcast(&self, tx: &SignedTransaction) -> Result<TxHash, TransportError>;

    /// Receipt for `hash`, or `None` while it is not yet included.
    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, TransportError>;

    /// Balance of `address` in base units.
    async fn balance_at(
        &self,
        address: Address,
        at_height: Option<BlockHeight>,
    ) -> Result<U256, TransportError>;

    /// Transaction count of `address` including pending transactions.
    async fn pending_nonce(&self, address: Address) -> Result<u64, TransportError>;

    /// Transaction count of `address` at the latest block.
    async fn confirmed_nonce(&self, address: Address) -> Result<u64, TransportError>;

    /// Suggested gas price in base units.
    async fn gas_price(&self) -> Result<U256, TransportError>;

    /// Chain id used for replay protection.
    async fn chain_id(&self) -> Result<u64, TransportError>;

    /// Gas the node expects `request` to consume.
    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, TransportError>;

    /// Whether the node still knows about `hash` (pending or included).
    async fn transaction_known(&self, hash: TxHash) -> Result<bool, TransportError>;
}
