//! # In-Memory Transport
//!
//! A scriptable single-process node for tests and dry runs. It enforces
//! the two rules a real node applies at broadcast (exact next nonce, and
//! enough balance for `value + gas * price`) and lets tests script what
//! happens to each accepted transaction.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    Address, BlockHeight, CallRequest, Receipt, SignedTransaction, Transport, TransportError,
    TxHash, U256,
};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Gas charged for a plain value transfer.
pub const TRANSFER_GAS: u64 = 21_000;

/// Gas the default estimate reports for calls with data.
pub const CALL_GAS: u64 = 60_000;

/// What happens to the next accepted broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// Mined successfully; the receipt shows up after `after_polls` misses.
    Confirm { after_polls: u32 },
    /// Mined with failure status and the given reason.
    Revert(String),
    /// Replaced by another transaction from the same sender.
    Drop,
    /// Stays in the pool forever.
    Pending,
    /// The node refuses the broadcast.
    Reject(TransportError),
}

impl ScriptedOutcome {
    /// Mined on the first receipt poll.
    pub const CONFIRM: Self = Self::Confirm { after_polls: 0 };
}

/// A read request seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Simulated sender, for `read_call_as`.
    pub from: Option<Address>,
    /// Called contract.
    pub to: Address,
    /// Call data.
    pub data: Vec<u8>,
    /// Requested height; `None` for latest.
    pub at_height: Option<BlockHeight>,
}

#[derive(Debug, Clone)]
enum StubResponse {
    Return(Vec<u8>),
    Revert(String),
}

#[derive(Debug)]
struct PoolEntry {
    outcome: ScriptedOutcome,
    polls: u32,
    receipt: Option<Receipt>,
}

#[derive(Debug)]
struct NodeState {
    chain_id: u64,
    gas_price: U256,
    height: BlockHeight,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    stubs: HashMap<(Address, [u8; 4]), StubResponse>,
    height_stubs: HashMap<(Address, [u8; 4], BlockHeight), StubResponse>,
    script: VecDeque<ScriptedOutcome>,
    default_outcome: ScriptedOutcome,
    pool: HashMap<TxHash, PoolEntry>,
    receipt_errors: VecDeque<TransportError>,
    stall_receipts: bool,
    estimate: Option<u64>,
    broadcasts: Vec<SignedTransaction>,
    calls: Vec<RecordedCall>,
}

/// Scriptable in-memory node.
#[derive(Debug)]
pub struct InMemoryTransport {
    state: Mutex<NodeState>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new(1337)
    }
}

impl InMemoryTransport {
    /// Empty node for `chain_id`, 1 gwei gas price, everything confirms.
    #[must_use]
    pub fn new(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(NodeState {
                chain_id,
                gas_price: U256::from(1_000_000_000u64),
                height: 1,
                balances: HashMap::new(),
                nonces: HashMap::new(),
                stubs: HashMap::new(),
                height_stubs: HashMap::new(),
                script: VecDeque::new(),
                default_outcome: ScriptedOutcome::CONFIRM,
                pool: HashMap::new(),
                receipt_errors: VecDeque::new(),
                stall_receipts: false,
                estimate: None,
                broadcasts: Vec::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Set the balance of `address`.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().balances.insert(address, balance);
    }

    /// Set the next expected nonce of `address`.
    pub fn set_nonce(&self, address: Address, nonce: u64) {
        self.state.lock().nonces.insert(address, nonce);
    }

    /// Set the suggested gas price.
    pub fn set_gas_price(&self, price: U256) {
        self.state.lock().gas_price = price;
    }

    /// Make every gas estimate return `gas`.
    pub fn set_gas_estimate(&self, gas: u64) {
        self.state.lock().estimate = Some(gas);
    }

    /// Advance the chain head by `blocks`.
    pub fn mine(&self, blocks: u64) {
        self.state.lock().height += blocks;
    }

    /// Return `output` for calls to `to` whose selector is `selector`.
    pub fn stub_call(&self, to: Address, selector: [u8; 4], output: Vec<u8>) {
        self.state
            .lock()
            .stubs
            .insert((to, selector), StubResponse::Return(output));
    }

    /// Like [`Self::stub_call`] but only for reads pinned to `height`.
    pub fn stub_call_at(&self, to: Address, selector: [u8; 4], height: BlockHeight, output: Vec<u8>) {
        self.state
            .lock()
            .height_stubs
            .insert((to, selector, height), StubResponse::Return(output));
    }

    /// Make calls to `to` with `selector` revert with `reason`.
    pub fn stub_revert(&self, to: Address, selector: [u8; 4], reason: impl Into<String>) {
        self.state
            .lock()
            .stubs
            .insert((to, selector), StubResponse::Revert(reason.into()));
    }

    /// Queue outcomes for the next accepted broadcasts, in order.
    pub fn script(&self, outcomes: impl IntoIterator<Item = ScriptedOutcome>) {
        self.state.lock().script.extend(outcomes);
    }

    /// Outcome for broadcasts once the script is exhausted.
    pub fn set_default_outcome(&self, outcome: ScriptedOutcome) {
        self.state.lock().default_outcome = outcome;
    }

    /// Fail the next receipt polls with `error`, `count` times.
    pub fn fail_receipts(&self, count: usize, error: TransportError) {
        let mut state = self.state.lock();
        state
            .receipt_errors
            .extend(std::iter::repeat(error).take(count));
    }

    /// While set, receipt polls never answer, like a node that stopped
    /// responding without closing the connection.
    pub fn stall_receipts(&self, stalled: bool) {
        self.state.lock().stall_receipts = stalled;
    }

    /// Every transaction accepted so far.
    pub fn broadcasts(&self) -> Vec<SignedTransaction> {
        self.state.lock().broadcasts.clone()
    }

    /// Every read request seen so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }

    /// Current balance of `address`.
    pub fn balance(&self, address: Address) -> U256 {
        self.state
            .lock()
            .balances
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    fn answer(
        &self,
        from: Option<Address>,
        to: Address,
        data: &[u8],
        at_height: Option<BlockHeight>,
    ) -> Result<Vec<u8>, TransportError> {
        let mut state = self.state.lock();
        state.calls.push(RecordedCall {
            from,
            to,
            data: data.to_vec(),
            at_height,
        });
        let Some(selector) = data.get(..4).and_then(|s| <[u8; 4]>::try_from(s).ok()) else {
            return Ok(Vec::new());
        };
        let stub = at_height
            .and_then(|h| state.height_stubs.get(&(to, selector, h)))
            .or_else(|| state.stubs.get(&(to, selector)));
        match stub {
            Some(StubResponse::Return(output)) => Ok(output.clone()),
            Some(StubResponse::Revert(reason)) => Err(TransportError::Reverted(reason.clone())),
            // Calling a selector the contract does not know.
            None => Err(TransportError::Reverted("execution reverted".into())),
        }
    }
}

impl NodeState {
    fn next_nonce(&self, address: &Address) -> u64 {
        self.nonces.get(address).copied().unwrap_or(0)
    }

    fn balance(&self, address: &Address) -> U256 {
        self.balances.get(address).copied().unwrap_or_default()
    }

    fn gas_for(tx: &SignedTransaction) -> u64 {
        let wanted = if tx.unsigned.data.is_empty() {
            TRANSFER_GAS
        } else {
            CALL_GAS
        };
        wanted.min(tx.unsigned.gas_limit)
    }

    /// Apply a mined transaction: charge the fee, move the value.
    fn settle(&mut self, tx: &SignedTransaction, success: bool) -> Receipt {
        self.height += 1;
        let gas_used = Self::gas_for(tx);
        let fee = tx.unsigned.gas_price.saturating_mul(U256::from(gas_used));
        let mut debit = fee;
        if success {
            debit = debit.saturating_add(tx.unsigned.value);
            if let Some(to) = tx.unsigned.to {
                let credited = self.balance(&to).saturating_add(tx.unsigned.value);
                self.balances.insert(to, credited);
            }
        }
        let remaining = self.balance(&tx.sender).saturating_sub(debit);
        self.balances.insert(tx.sender, remaining);
        if success {
            Receipt::success(self.height, gas_used)
        } else {
            Receipt::failure(self.height, gas_used, None)
        }
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn read_call(
        &self,
        to: Address,
        data: &[u8],
        at_height: Option<BlockHeight>,
    ) -> Result<Vec<u8>, TransportError> {
        self.answer(None, to, data, at_height)
    }

    async fn read_call_as(
        &self,
        from: Address,
        to: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, TransportError> {
        self.answer(Some(from), to, data, None)
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> Result<TxHash, TransportError> {
        let mut state = self.state.lock();
        let expected = state.next_nonce(&tx.sender);
        if tx.unsigned.nonce < expected {
            return Err(TransportError::Rejected(format!(
                "nonce too low: address {}, tx: {} state: {expected}",
                tx.sender, tx.unsigned.nonce
            )));
        }
        if tx.unsigned.nonce > expected {
            return Err(TransportError::Rejected(format!(
                "nonce too high: address {}, tx: {} state: {expected}",
                tx.sender, tx.unsigned.nonce
            )));
        }
        if tx.unsigned.chain_id != state.chain_id {
            return Err(TransportError::Rejected(format!(
                "invalid chain id: have {}, want {}",
                tx.unsigned.chain_id, state.chain_id
            )));
        }
        let cost = tx.unsigned.max_cost().unwrap_or(U256::MAX);
        if state.balance(&tx.sender) < cost {
            return Err(TransportError::Rejected(
                "insufficient funds for gas * price + value".into(),
            ));
        }

        let outcome = state
            .script
            .pop_front()
            .unwrap_or_else(|| state.default_outcome.clone());
        if let ScriptedOutcome::Reject(error) = outcome {
            return Err(error);
        }

        state.nonces.insert(tx.sender, expected + 1);
        state.broadcasts.push(tx.clone());
        let receipt = match &outcome {
            ScriptedOutcome::Confirm { .. } => Some(state.settle(tx, true)),
            ScriptedOutcome::Revert(reason) => {
                let mut receipt = state.settle(tx, false);
                receipt.revert_reason = Some(reason.clone());
                Some(receipt)
            }
            _ => None,
        };
        debug!(hash = %tx.hash, nonce = tx.unsigned.nonce, ?outcome, "Accepted transaction");
        state.pool.insert(
            tx.hash,
            PoolEntry {
                outcome,
                polls: 0,
                receipt,
            },
        );
        Ok(tx.hash)
    }

    async fn receipt(&self, hash: TxHash) -> Result<Option<Receipt>, TransportError> {
        if self.state.lock().stall_receipts {
            return std::future::pending().await;
        }
        let mut state = self.state.lock();
        if let Some(error) = state.receipt_errors.pop_front() {
            return Err(error);
        }
        let Some(entry) = state.pool.get_mut(&hash) else {
            return Ok(None);
        };
        entry.polls += 1;
        match entry.outcome {
            ScriptedOutcome::Confirm { after_polls } if entry.polls <= after_polls => Ok(None),
            _ => Ok(entry.receipt.clone()),
        }
    }

    async fn balance_at(
        &self,
        address: Address,
        _at_height: Option<BlockHeight>,
    ) -> Result<U256, TransportError> {
        Ok(self.balance(address))
    }

    async fn pending_nonce(&self, address: Address) -> Result<u64, TransportError> {
        Ok(self.state.lock().next_nonce(&address))
    }

    async fn confirmed_nonce(&self, address: Address) -> Result<u64, TransportError> {
        let state = self.state.lock();
        let next = state.next_nonce(&address);
        // Transactions still sitting in the pool are not yet confirmed.
        let pooled = state
            .broadcasts
            .iter()
            .filter(|tx| tx.sender == address)
            .filter(|tx| {
                state
                    .pool
                    .get(&tx.hash)
                    .is_some_and(|entry| entry.outcome == ScriptedOutcome::Pending)
            })
            .count() as u64;
        Ok(next.saturating_sub(pooled))
    }

    async fn gas_price(&self) -> Result<U256, TransportError> {
        Ok(self.state.lock().gas_price)
    }

    async fn chain_id(&self) -> Result<u64, TransportError> {
        Ok(self.state.lock().chain_id)
    }

    async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, TransportError> {
        let state = self.state.lock();
        Ok(state.estimate.unwrap_or(if request.data.is_empty() {
            TRANSFER_GAS
        } else {
            CALL_GAS
        }))
    }

    async fn transaction_known(&self, hash: TxHash) -> Result<bool, TransportError> {
        let state = self.state.lock();
        Ok(state
            .pool
            .get(&hash)
            .is_some_and(|entry| entry.outcome != ScriptedOutcome::Drop))
    }
}
